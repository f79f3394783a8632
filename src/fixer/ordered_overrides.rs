//! Reorders overridden and implemented methods to match the order their
//! ancestors first declared them, routing around every other member.

use std::{collections::HashMap, path::Path};

use super::{
	Fixer, FixerDefinition,
	class_elements::{self, ClassElement, ElementKind},
	class_name,
	shared::FixContext,
	tokens::{Token, TokenKind, Tokens},
	type_info::{self, TypeInfoProvider},
};
use crate::prelude::*;

pub(crate) struct OrderedOverridesFixer;
impl Fixer for OrderedOverridesFixer {
	fn name(&self) -> &'static str {
		"ordered_overrides"
	}

	fn definition(&self) -> FixerDefinition {
		FixerDefinition {
			summary: "Overridden and implemented methods must be sorted in the same order as they are defined in parent classes.",
			sample: "<?php\nclass Foo implements Serializable {\n\n    public function unserialize($data) {}\n\n    public function serialize() {}\n\n}\n",
		}
	}

	/// Must run before any alphabetical member sorting.
	fn priority(&self) -> i32 {
		75
	}

	fn is_candidate(&self, tokens: &Tokens) -> bool {
		tokens.is_any_kind_found(&[TokenKind::Class, TokenKind::Interface])
	}

	fn apply(&self, _path: &Path, tokens: &mut Tokens, ctx: &FixContext) -> Result<()> {
		let mut i = 1;

		while i < tokens.len() {
			if !matches!(tokens[i].kind, TokenKind::Class | TokenKind::Interface)
				|| type_info::is_class_name_constant(tokens, i)
			{
				i += 1;

				continue;
			}

			let extends = class_extensions(tokens, i, TokenKind::Extends)?;
			let implements = class_extensions(tokens, i, TokenKind::Implements)?;
			let extensions = [extends, implements].concat();

			if extensions.is_empty() {
				i += 1;

				continue;
			}

			let methods_order = ancestor_method_order(ctx.type_info, &extensions);

			if methods_order.is_empty() {
				i += 1;

				continue;
			}

			// Highest priority goes to the first-encountered (most-base)
			// method name.
			let count = methods_order.len();
			let methods_priority = methods_order
				.into_iter()
				.enumerate()
				.map(|(index, name)| (name, count - 1 - index))
				.collect::<HashMap<_, _>>();
			let Some(class_body_start) = tokens.next_of_kind(i, &[TokenKind::BraceOpen]) else {
				break;
			};
			let class_body_end = tokens.find_block_end(class_body_start)?;
			let unsorted = class_elements::class_elements(tokens, class_body_start);
			let sorted = sort_elements(&unsorted, &methods_priority);

			if sorted != unsorted && !unsorted.is_empty() {
				let start = unsorted[0].start;
				let end = unsorted[unsorted.len() - 1].end;
				let replacement = sorted
					.iter()
					.flat_map(|element| {
						(element.start..=element.end).map(|k| tokens[k].clone())
					})
					.collect::<Vec<Token>>();

				tokens.override_range(start, end, replacement);
			}

			i = class_body_end + 1;
		}

		Ok(())
	}
}

/// Resolved names of one `extends`/`implements` list. An absent list is
/// empty; a malformed one is a structural error.
fn class_extensions(tokens: &Tokens, class_index: usize, list_kind: TokenKind) -> Result<Vec<String>> {
	let Some(list_index) = tokens.next_of_kind(class_index, &[list_kind, TokenKind::BraceOpen])
	else {
		return Ok(Vec::new());
	};

	if tokens[list_index].kind != list_kind {
		return Ok(Vec::new());
	}

	let mut names = Vec::new();
	let mut name_start = tokens
		.next_meaningful(list_index)
		.ok_or_else(|| eyre::eyre!("Dangling `{list_kind:?}` at index {list_index}."))?;

	loop {
		let delimiter = tokens
			.next_of_kind(name_start, &[TokenKind::Comma, TokenKind::BraceOpen])
			.ok_or_else(|| eyre::eyre!("Unterminated extension list at index {name_start}."))?;

		names.push(class_name::resolve_fqn(tokens, name_start)?);

		if tokens[delimiter].kind != TokenKind::Comma {
			break;
		}

		name_start = tokens
			.next_meaningful(delimiter)
			.ok_or_else(|| eyre::eyre!("Unterminated extension list at index {delimiter}."))?;
	}

	Ok(names)
}

/// Ancestor method names in encounter order: the farthest ancestor's methods
/// come first, duplicates suppressed at first sight. Unresolvable ancestors
/// contribute nothing.
fn ancestor_method_order(provider: &dyn TypeInfoProvider, extensions: &[String]) -> Vec<String> {
	let mut order = Vec::new();

	for extension in extensions {
		let mut chain = Vec::new();

		collect_ancestors(provider, extension, &mut chain);

		// The walk pushes nearest-first; encounter order wants the farthest
		// ancestor first.
		for ancestor in chain.iter().rev() {
			for method in provider.declared_method_names(ancestor) {
				if !order.contains(&method) {
					order.push(method);
				}
			}
		}
	}

	order
}

fn collect_ancestors(provider: &dyn TypeInfoProvider, name: &str, out: &mut Vec<String>) {
	if !provider.knows(name) || out.iter().any(|seen| seen == name) {
		return;
	}

	out.push(name.to_owned());

	if let Some(parent) = provider.parent(name) {
		collect_ancestors(provider, &parent, out);
	}

	for interface in provider.interfaces(name).iter().rev() {
		collect_ancestors(provider, interface, out);
	}
}

/// Stable, anchor-aware reorder: method members whose names carry a priority
/// are permuted into descending-priority order within the slots they already
/// occupy; everything else stays exactly where it is.
fn sort_elements(
	elements: &[ClassElement],
	methods_priority: &HashMap<String, usize>,
) -> Vec<ClassElement> {
	let mapped_slots = elements
		.iter()
		.enumerate()
		.filter(|(_, element)| {
			element.kind == ElementKind::Method
				&& element.name.as_deref().is_some_and(|name| methods_priority.contains_key(name))
		})
		.map(|(slot, _)| slot)
		.collect::<Vec<_>>();
	let mut mapped = mapped_slots.iter().map(|&slot| elements[slot].clone()).collect::<Vec<_>>();

	mapped.sort_by_key(|element| {
		std::cmp::Reverse(
			element.name.as_deref().and_then(|name| methods_priority.get(name).copied()),
		)
	});

	let mut sorted = elements.to_vec();

	for (slot, element) in mapped_slots.into_iter().zip(mapped) {
		sorted[slot] = element;
	}

	sorted
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixer::{
		lexer,
		shared::WhitespacesConfig,
		type_info::SourceTypeInfo,
	};

	fn fix(source: &str) -> String {
		let mut info = SourceTypeInfo::new();

		info.scan(&lexer::tokenize(source));

		let whitespaces = WhitespacesConfig::default();
		let ctx = FixContext { whitespaces: &whitespaces, type_info: &info };
		let mut tokens = lexer::tokenize(source);

		OrderedOverridesFixer.apply(Path::new("test.php"), &mut tokens, &ctx).expect("apply");

		tokens.to_source()
	}

	#[test]
	fn reorders_implemented_methods_into_interface_order() {
		let source = "<?php\ninterface I {\n\tpublic function foo();\n\tpublic function bar();\n}\nclass A implements I {\n\tpublic function bar() {}\n\tpublic function foo() {}\n}\n";
		let fixed = fix(source);
		let foo = fixed.rfind("function foo").expect("foo");
		let bar = fixed.rfind("function bar").expect("bar");

		assert!(foo < bar);
	}

	#[test]
	fn unmapped_members_are_anchors() {
		let source = "<?php\ninterface I {\n\tpublic function foo();\n\tpublic function bar();\n}\nclass A implements I {\n\tpublic function bar() {}\n\tpublic const GAP = 1;\n\tpublic function helper() {}\n\tpublic function foo() {}\n}\n";
		let fixed = fix(source);
		let foo = fixed.rfind("function foo").expect("foo");
		let gap = fixed.rfind("const GAP").expect("gap");
		let helper = fixed.rfind("function helper").expect("helper");
		let bar = fixed.rfind("function bar").expect("bar");

		// Mapped methods swap; the constant and the helper keep their slots.
		assert!(foo < gap);
		assert!(gap < helper);
		assert!(helper < bar);
	}

	#[test]
	fn superclass_chain_orders_before_interfaces() {
		let source = "<?php\nclass Base {\n\tpublic function first() {}\n\tpublic function second() {}\n}\nclass Mid extends Base {\n\tpublic function third() {}\n}\nclass A extends Mid {\n\tpublic function third() {}\n\tpublic function second() {}\n\tpublic function first() {}\n}\n";
		let fixed = fix(source);
		let class_a = fixed.rfind("class A").expect("class A");
		let tail = &fixed[class_a..];
		let first = tail.find("function first").expect("first");
		let second = tail.find("function second").expect("second");
		let third = tail.find("function third").expect("third");

		assert!(first < second);
		assert!(second < third);
	}

	#[test]
	fn class_without_matching_ancestor_methods_is_unchanged() {
		let source = "<?php\ninterface I {\n\tpublic function foo();\n}\nclass A implements I {\n\tpublic function b() {}\n\tpublic function a() {}\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn unresolvable_ancestors_make_the_fixer_a_no_op() {
		let source =
			"<?php\nclass A extends \\Vendor\\Unknown {\n\tpublic function b() {}\n\tpublic function a() {}\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn reordering_is_idempotent() {
		let source = "<?php\ninterface I {\n\tpublic function foo();\n\tpublic function bar();\n}\nclass A implements I {\n\tpublic function bar() {}\n\tpublic function foo() {}\n}\n";
		let once = fix(source);
		let twice = fix(&once);

		assert_eq!(once, twice);
	}
}
