//! Namespace blocks and the `use` imports declared inside them. Namespace
//! blocks partition a file; name resolution is only valid against the block
//! containing the queried position.

use super::tokens::{TokenKind, Tokens};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NamespaceAnalysis {
	/// Without leading separator; empty for the global namespace.
	pub(crate) full_name: String,
	pub(crate) scope_start: usize,
	pub(crate) scope_end: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ImportKind {
	Class,
	Function,
	Constant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImportAnalysis {
	/// Without leading separator.
	pub(crate) full_name: String,
	/// Last segment, or the `as` alias when present.
	pub(crate) short_name: String,
	pub(crate) kind: ImportKind,
}

/// All namespace blocks of the file; a single global block spanning the whole
/// sequence when the file declares none.
pub(crate) fn namespaces(tokens: &Tokens) -> Vec<NamespaceAnalysis> {
	let mut out = Vec::new();
	let mut i = 0;

	while i < tokens.len() {
		if tokens[i].kind != TokenKind::Namespace {
			i += 1;

			continue;
		}

		let mut name = String::new();
		let mut cursor = i + 1;

		while cursor < tokens.len() {
			match tokens[cursor].kind {
				TokenKind::Identifier | TokenKind::NsSeparator => name.push_str(&tokens[cursor].text),
				TokenKind::Whitespace | TokenKind::Comment => {},
				_ => break,
			}

			cursor += 1;
		}

		if cursor >= tokens.len() {
			break;
		}

		let (scope_start, scope_end) = if tokens[cursor].kind == TokenKind::BraceOpen {
			let end = match tokens.find_block_end(cursor) {
				Ok(end) => end,
				Err(_) => tokens.len() - 1,
			};

			(cursor, end)
		} else {
			// `namespace Foo;` runs to the next declaration or end of file.
			let end = tokens
				.next_of_kind(cursor, &[TokenKind::Namespace])
				.map_or(tokens.len() - 1, |next| next - 1);

			(i, end)
		};

		out.push(NamespaceAnalysis { full_name: name, scope_start, scope_end });

		i = scope_end + 1;
	}

	if out.is_empty() {
		out.push(NamespaceAnalysis {
			full_name: String::new(),
			scope_start: 0,
			scope_end: tokens.len().saturating_sub(1),
		});
	}

	out
}

/// The innermost namespace block containing `index`; the global namespace
/// when `index` precedes every declared block.
pub(crate) fn namespace_at(tokens: &Tokens, index: usize) -> NamespaceAnalysis {
	namespaces(tokens)
		.into_iter()
		.find(|ns| ns.scope_start <= index && index <= ns.scope_end)
		.unwrap_or(NamespaceAnalysis {
			full_name: String::new(),
			scope_start: 0,
			scope_end: tokens.len().saturating_sub(1),
		})
}

/// Import declarations within one namespace block. Trait uses inside class
/// bodies and closure `use (...)` bindings are not imports and are skipped by
/// tracking the brace depth relative to the block.
pub(crate) fn imports_in(tokens: &Tokens, namespace: &NamespaceAnalysis) -> Vec<ImportAnalysis> {
	let mut out = Vec::new();
	let mut depth = 0_i32;
	let base_depth = i32::from(tokens[namespace.scope_start].kind == TokenKind::BraceOpen);
	let mut i = namespace.scope_start;

	while i <= namespace.scope_end && i < tokens.len() {
		match tokens[i].kind {
			TokenKind::BraceOpen => depth += 1,
			TokenKind::BraceClose => depth -= 1,
			TokenKind::Use if depth == base_depth => {
				if let Some((imports, end)) = parse_use(tokens, i) {
					out.extend(imports);

					i = end;
				}
			},
			_ => {},
		}

		i += 1;
	}

	out
}

/// Parses one `use ...;` declaration starting at the `use` keyword. Returns
/// the imports and the index of the terminating `;`, or `None` when the
/// keyword is a closure `use (...)`.
fn parse_use(tokens: &Tokens, use_index: usize) -> Option<(Vec<ImportAnalysis>, usize)> {
	let mut cursor = tokens.next_meaningful(use_index)?;
	let kind = match tokens[cursor].kind {
		TokenKind::ParenOpen => return None,
		TokenKind::Function => {
			cursor = tokens.next_meaningful(cursor)?;

			ImportKind::Function
		},
		TokenKind::Const => {
			cursor = tokens.next_meaningful(cursor)?;

			ImportKind::Constant
		},
		_ => ImportKind::Class,
	};
	let end = tokens.next_of_kind(use_index, &[TokenKind::Semicolon])?;
	let mut imports = Vec::new();
	let mut base = String::new();
	let mut current = String::new();
	let mut alias: Option<String> = None;
	let mut in_alias = false;
	let mut in_group = false;

	for i in cursor..end {
		let token = &tokens[i];

		match token.kind {
			TokenKind::Identifier | TokenKind::NsSeparator => {
				if in_alias {
					alias = Some(token.text.clone());
				} else {
					current.push_str(&token.text);
				}
			},
			TokenKind::As => in_alias = true,
			TokenKind::BraceOpen => {
				base = current.clone();
				current.clear();
				in_group = true;
			},
			TokenKind::Comma => {
				push_import(&mut imports, &base, &current, alias.take(), kind);
				current.clear();
				in_alias = false;
			},
			TokenKind::BraceClose => {
				push_import(&mut imports, &base, &current, alias.take(), kind);
				current.clear();
				in_alias = false;
				in_group = false;
			},
			_ => {},
		}
	}

	if !current.is_empty() || alias.is_some() {
		let base = if in_group { base.as_str() } else { "" };

		push_import(&mut imports, base, &current, alias.take(), kind);
	}

	Some((imports, end))
}

fn push_import(
	imports: &mut Vec<ImportAnalysis>,
	base: &str,
	name: &str,
	alias: Option<String>,
	kind: ImportKind,
) {
	let name = name.trim_matches('\\');

	if name.is_empty() {
		return;
	}

	let full_name =
		if base.is_empty() { name.to_owned() } else { format!("{}\\{name}", base.trim_matches('\\')) };
	let short_name =
		alias.unwrap_or_else(|| full_name.rsplit('\\').next().unwrap_or_default().to_owned());

	imports.push(ImportAnalysis { full_name, short_name, kind });
}
