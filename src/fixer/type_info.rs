//! Static type information: who extends whom and which methods each type
//! declares. Built by scanning the token sequences of the run's input files,
//! replacing runtime reflection with a symbol table so no code is ever
//! loaded.

use std::collections::HashMap;

use super::{
	class_elements::{self, ElementKind},
	class_name,
	namespaces::{self},
	tokens::{TokenKind, Tokens},
};

/// Closed capability over the type hierarchy. Names are fully qualified with
/// a leading separator. Unknown names answer with `None`/empty, which callers
/// treat as an unresolvable reference and skip.
pub(crate) trait TypeInfoProvider: Send + Sync {
	fn knows(&self, name: &str) -> bool;
	fn parent(&self, name: &str) -> Option<String>;
	fn interfaces(&self, name: &str) -> Vec<String>;
	/// Method short names in declaration order.
	fn declared_method_names(&self, name: &str) -> Vec<String>;
}

#[derive(Clone, Debug, Default)]
struct TypeEntry {
	parent: Option<String>,
	interfaces: Vec<String>,
	methods: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct SourceTypeInfo {
	types: HashMap<String, TypeEntry>,
}
impl SourceTypeInfo {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Registers every class-like declaration found in one file's token
	/// sequence. Extension names that fail to resolve are skipped; the rest
	/// of the declaration is still recorded.
	pub(crate) fn scan(&mut self, tokens: &Tokens) {
		let mut i = 0;

		while i < tokens.len() {
			if !tokens[i].is_classy() || is_class_name_constant(tokens, i) {
				i += 1;

				continue;
			}

			let Some(name_index) = tokens.next_meaningful(i) else {
				break;
			};

			// Anonymous classes declare nothing nameable.
			if tokens[name_index].kind != TokenKind::Identifier {
				i += 1;

				continue;
			}

			let namespace = namespaces::namespace_at(tokens, i);
			let fqn = if namespace.full_name.is_empty() {
				format!("\\{}", tokens[name_index].text)
			} else {
				format!("\\{}\\{}", namespace.full_name, tokens[name_index].text)
			};
			let extends = extension_names(tokens, i, TokenKind::Extends);
			let implements = extension_names(tokens, i, TokenKind::Implements);
			let (parent, interfaces) = match tokens[i].kind {
				// An interface's `extends` list is its interface set.
				TokenKind::Interface => (None, extends),
				TokenKind::Class => (extends.into_iter().next(), implements),
				_ => (None, implements),
			};
			let Some(body_open) = tokens.next_of_kind(i, &[TokenKind::BraceOpen]) else {
				break;
			};
			let methods = class_elements::class_elements(tokens, body_open)
				.into_iter()
				.filter(|element| element.kind == ElementKind::Method)
				.filter_map(|element| element.name)
				.collect();

			self.types.insert(fqn, TypeEntry { parent, interfaces, methods });

			i = tokens.find_block_end(body_open).map_or(tokens.len(), |end| end + 1);
		}
	}
}
impl TypeInfoProvider for SourceTypeInfo {
	fn knows(&self, name: &str) -> bool {
		self.types.contains_key(name)
	}

	fn parent(&self, name: &str) -> Option<String> {
		self.types.get(name)?.parent.clone()
	}

	fn interfaces(&self, name: &str) -> Vec<String> {
		self.types.get(name).map(|entry| entry.interfaces.clone()).unwrap_or_default()
	}

	fn declared_method_names(&self, name: &str) -> Vec<String> {
		self.types.get(name).map(|entry| entry.methods.clone()).unwrap_or_default()
	}
}

/// `Foo::class` produces a `class` keyword token that opens no body.
pub(crate) fn is_class_name_constant(tokens: &Tokens, index: usize) -> bool {
	tokens[index].kind == TokenKind::Class
		&& tokens
			.prev_meaningful(index)
			.is_some_and(|prev| tokens[prev].kind == TokenKind::DoubleColon)
}

/// Resolved names of one extension list (`extends` or `implements`) of the
/// class-like declaration at `class_index`. Unresolvable names are dropped.
fn extension_names(tokens: &Tokens, class_index: usize, list_kind: TokenKind) -> Vec<String> {
	let Some(list_index) = tokens.next_of_kind(class_index, &[list_kind, TokenKind::BraceOpen])
	else {
		return Vec::new();
	};

	if tokens[list_index].kind != list_kind {
		return Vec::new();
	}

	let mut names = Vec::new();
	let Some(mut name_start) = tokens.next_meaningful(list_index) else {
		return Vec::new();
	};

	loop {
		let Some(delimiter) =
			tokens.next_of_kind(name_start, &[TokenKind::Comma, TokenKind::BraceOpen])
		else {
			break;
		};

		if let Ok(name) = class_name::resolve_fqn(tokens, name_start) {
			names.push(name);
		}
		if tokens[delimiter].kind != TokenKind::Comma {
			break;
		}

		let Some(next) = tokens.next_meaningful(delimiter) else {
			break;
		};

		name_start = next;
	}

	names
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixer::lexer;

	fn scanned(source: &str) -> SourceTypeInfo {
		let mut info = SourceTypeInfo::new();

		info.scan(&lexer::tokenize(source));

		info
	}

	#[test]
	fn records_parent_and_interfaces_with_resolution() {
		let info = scanned(
			"<?php\nnamespace App;\nuse Lib\\Contract;\nclass Foo extends Base implements Contract, \\Other\\Api {\n\tpublic function run() {}\n}\n",
		);

		assert!(info.knows("\\App\\Foo"));
		assert_eq!(info.parent("\\App\\Foo").as_deref(), Some("\\App\\Base"));
		assert_eq!(info.interfaces("\\App\\Foo"), ["\\Lib\\Contract", "\\Other\\Api"]);
		assert_eq!(info.declared_method_names("\\App\\Foo"), ["run"]);
	}

	#[test]
	fn interface_extends_list_is_its_interface_set() {
		let info = scanned("<?php\ninterface A extends B, C {\n\tpublic function x();\n}\n");

		assert_eq!(info.parent("\\A"), None);
		assert_eq!(info.interfaces("\\A"), ["\\B", "\\C"]);
	}

	#[test]
	fn methods_keep_declaration_order() {
		let info = scanned(
			"<?php\nclass A {\n\tconst X = 1;\n\tpublic function b() {}\n\tpublic function a() {}\n}\n",
		);

		assert_eq!(info.declared_method_names("\\A"), ["b", "a"]);
	}

	#[test]
	fn class_name_constants_are_not_declarations() {
		let info = scanned("<?php\n$x = Foo::class;\nclass Bar {}\n");

		assert!(!info.knows("\\Foo"));
		assert!(info.knows("\\Bar"));
	}

	#[test]
	fn unknown_names_answer_empty() {
		let info = scanned("<?php class A {}");

		assert!(!info.knows("\\Missing"));
		assert_eq!(info.parent("\\Missing"), None);
		assert!(info.interfaces("\\Missing").is_empty());
		assert!(info.declared_method_names("\\Missing").is_empty());
	}
}
