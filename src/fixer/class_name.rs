//! Class-name resolution: turns a name reference in the token sequence into a
//! fully-qualified name using the enclosing namespace block and its imports.

use super::{
	namespaces::{self, ImportKind},
	tokens::{TokenKind, Tokens},
};
use crate::prelude::*;

/// Resolves the class-name reference starting at `class_name_start` to a
/// fully-qualified name with a leading separator. Resolution rules follow
/// PHP's: an already-qualified name is returned unchanged; otherwise the
/// first segment is matched against the block's imports before falling back
/// to the enclosing namespace prefix.
pub(crate) fn resolve_fqn(tokens: &Tokens, class_name_start: usize) -> Result<String> {
	let first = &tokens[class_name_start];

	if !matches!(first.kind, TokenKind::Identifier | TokenKind::NsSeparator) {
		return Err(eyre::eyre!(
			"No name or namespace separator at index {class_name_start}, got {:?}.",
			first.kind
		));
	}

	let relative = read_class_name(tokens, class_name_start);

	if relative.starts_with('\\') {
		return Ok(relative);
	}

	let namespace = namespaces::namespace_at(tokens, class_name_start);
	let first_segment = relative.split('\\').next().unwrap_or_default();
	let rest = relative.split_once('\\').map(|(_, rest)| rest);

	for import in namespaces::imports_in(tokens, &namespace) {
		if import.kind != ImportKind::Class || import.short_name != first_segment {
			continue;
		}

		return Ok(match rest {
			Some(rest) => format!("\\{}\\{rest}", import.full_name),
			None => format!("\\{}", import.full_name),
		});
	}

	if namespace.full_name.is_empty() {
		Ok(format!("\\{relative}"))
	} else {
		Ok(format!("\\{}\\{relative}", namespace.full_name))
	}
}

fn read_class_name(tokens: &Tokens, class_name_start: usize) -> String {
	let mut name = String::new();
	let mut index = class_name_start;

	while index < tokens.len() {
		let token = &tokens[index];

		match token.kind {
			TokenKind::Identifier | TokenKind::NsSeparator => name.push_str(&token.text),
			TokenKind::Whitespace => {},
			_ => break,
		}

		index += 1;
	}

	name
}
