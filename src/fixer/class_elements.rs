//! Class body member enumeration from the flat token sequence: each member's
//! textual extent, kind, name and modifiers, recovered without a parse tree.

use super::tokens::{TokenKind, Tokens};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ElementKind {
	UseTrait,
	Case,
	Constant,
	Property,
	Method,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Visibility {
	Public,
	Protected,
	Private,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClassElement {
	pub(crate) start: usize,
	pub(crate) end: usize,
	pub(crate) visibility: Visibility,
	pub(crate) is_abstract: bool,
	pub(crate) is_static: bool,
	pub(crate) is_readonly: bool,
	pub(crate) kind: ElementKind,
	pub(crate) name: Option<String>,
}

/// Enumerates the direct members of the class body opened at
/// `class_open_brace`. Members are contiguous and non-overlapping: each
/// member's extent starts right after the previous member's end, so leading
/// whitespace and modifiers belong to the member they precede. A member's end
/// is extended past trailing same-line whitespace and comments, but never
/// past a trailing blank line.
pub(crate) fn class_elements(tokens: &Tokens, class_open_brace: usize) -> Vec<ClassElement> {
	let mut elements = Vec::new();
	let mut start = class_open_brace + 1;

	'member: loop {
		let mut visibility = Visibility::Public;
		let mut is_abstract = false;
		let mut is_static = false;
		let mut is_readonly = false;
		let mut i = start;

		loop {
			let Some(token) = tokens.get(i) else {
				return elements;
			};

			match token.kind {
				// Class body end.
				TokenKind::BraceClose => return elements,
				TokenKind::Abstract => is_abstract = true,
				TokenKind::Static => is_static = true,
				TokenKind::Readonly => is_readonly = true,
				TokenKind::Protected => visibility = Visibility::Protected,
				TokenKind::Private => visibility = Visibility::Private,
				TokenKind::Use
				| TokenKind::Case
				| TokenKind::Const
				| TokenKind::Variable
				| TokenKind::Function => {
					let kind = element_kind(token.kind);
					let name = element_name(tokens, i, kind);
					let end = find_element_end(tokens, i);

					elements.push(ClassElement {
						start,
						end,
						visibility,
						is_abstract,
						is_static,
						is_readonly,
						kind,
						name,
					});

					start = end + 1;

					continue 'member;
				},
				_ => {},
			}

			i += 1;
		}
	}
}

fn element_kind(kind: TokenKind) -> ElementKind {
	match kind {
		TokenKind::Use => ElementKind::UseTrait,
		TokenKind::Case => ElementKind::Case,
		TokenKind::Const => ElementKind::Constant,
		TokenKind::Variable => ElementKind::Property,
		_ => ElementKind::Method,
	}
}

fn element_name(tokens: &Tokens, introducer: usize, kind: ElementKind) -> Option<String> {
	if kind == ElementKind::Property {
		return Some(tokens[introducer].text.clone());
	}

	let mut name_index = tokens.next_meaningful(introducer)?;

	// Return-by-reference methods: `function &foo()`.
	if tokens[name_index].kind == TokenKind::Ampersand {
		name_index = tokens.next_meaningful(name_index)?;
	}

	Some(tokens[name_index].text.clone())
}

/// The member's last token index: its closing `}` or terminating `;`,
/// extended over a trailing same-line whitespace/comment run.
fn find_element_end(tokens: &Tokens, introducer: usize) -> usize {
	let mut end = match tokens.next_of_kind(introducer, &[TokenKind::BraceOpen, TokenKind::Semicolon])
	{
		Some(index) => index,
		None => return tokens.len() - 1,
	};

	if tokens[end].kind == TokenKind::BraceOpen {
		end = match tokens.find_block_end(end) {
			Ok(close) => close,
			Err(_) => return tokens.len() - 1,
		};
	}

	let mut cursor = end + 1;

	while cursor < tokens.len()
		&& (tokens[cursor].is_inline_whitespace() || tokens[cursor].is_comment())
	{
		cursor += 1;
	}

	cursor -= 1;

	if tokens[cursor].is_whitespace() { cursor.saturating_sub(1) } else { cursor }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixer::lexer;

	fn elements_of(source: &str) -> (Tokens, Vec<ClassElement>) {
		let tokens = lexer::tokenize(source);
		let open = tokens.next_of_kind(0, &[TokenKind::BraceOpen]).expect("class body");
		let elements = class_elements(&tokens, open);

		(tokens, elements)
	}

	fn range_text(tokens: &Tokens, element: &ClassElement) -> String {
		(element.start..=element.end).map(|i| tokens[i].text.as_str()).collect()
	}

	#[test]
	fn classifies_member_kinds_and_names() {
		let (_, elements) = elements_of(
			"<?php\nclass A {\n\tuse SomeTrait;\n\tconst FOO = 1;\n\tpublic $bar = 2;\n\tpublic function baz() {}\n}\n",
		);

		assert_eq!(
			elements.iter().map(|e| e.kind).collect::<Vec<_>>(),
			[ElementKind::UseTrait, ElementKind::Constant, ElementKind::Property, ElementKind::Method],
		);
		assert_eq!(
			elements.iter().map(|e| e.name.as_deref()).collect::<Vec<_>>(),
			[Some("SomeTrait"), Some("FOO"), Some("$bar"), Some("baz")],
		);
	}

	#[test]
	fn records_modifiers() {
		let (_, elements) = elements_of(
			"<?php\nabstract class A {\n\tprivate static $cache;\n\tabstract protected function run();\n\tpublic readonly int $id;\n}\n",
		);

		assert_eq!(elements[0].visibility, Visibility::Private);
		assert!(elements[0].is_static);
		assert!(elements[1].is_abstract);
		assert_eq!(elements[1].visibility, Visibility::Protected);
		assert!(elements[2].is_readonly);
		assert_eq!(elements[2].visibility, Visibility::Public);
	}

	#[test]
	fn members_are_contiguous_over_the_body() {
		let (tokens, elements) = elements_of(
			"<?php\nclass A {\n\n\tpublic function a() {\n\t\tif (true) {}\n\t}\n\n\tpublic function b() {}\n\n}\n",
		);
		let open = tokens.next_of_kind(0, &[TokenKind::BraceOpen]).expect("open");

		assert_eq!(elements.len(), 2);
		assert_eq!(elements[0].start, open + 1);
		assert_eq!(elements[1].start, elements[0].end + 1);
	}

	#[test]
	fn member_end_extends_over_same_line_comment() {
		let (tokens, elements) =
			elements_of("<?php\nclass A {\n\tpublic $a = 1; // keep\n\tpublic $b = 2;\n}\n");

		assert_eq!(elements.len(), 2);
		assert!(range_text(&tokens, &elements[0]).ends_with("// keep"));
	}

	#[test]
	fn method_bodies_with_nested_braces_end_at_their_own_close() {
		let (tokens, elements) = elements_of(
			"<?php\nclass A {\n\tpublic function a() {\n\t\tforeach ([] as $x) { echo $x; }\n\t}\n\tpublic function b() {}\n}\n",
		);

		assert_eq!(elements.len(), 2);
		assert!(range_text(&tokens, &elements[0]).contains("foreach"));
		assert!(!range_text(&tokens, &elements[0]).contains("function b"));
	}
}
