//! Replaces Yii2 `BaseObject::className()` calls with the native `::class`
//! constant.

use std::path::Path;

use super::{
	Fixer, FixerDefinition,
	shared::FixContext,
	tokens::{Token, TokenKind, Tokens},
};
use crate::prelude::*;

pub(crate) struct RemoveClassNameMethodUsagesFixer;
impl Fixer for RemoveClassNameMethodUsagesFixer {
	fn name(&self) -> &'static str {
		"remove_class_name_method_usages"
	}

	fn definition(&self) -> FixerDefinition {
		FixerDefinition {
			summary: "Converts Yii2 `BaseObject::className()` method usage into `::class` keyword.",
			sample: "<?php\nuse Foo\\Bar\\Baz;\n\n$className = Baz::className();\n",
		}
	}

	/// Wrong on classes that override `className()` with custom behavior.
	fn is_risky(&self) -> bool {
		true
	}

	fn is_candidate(&self, tokens: &Tokens) -> bool {
		tokens.is_kind_found(TokenKind::Identifier)
	}

	fn apply(&self, _path: &Path, tokens: &mut Tokens, _ctx: &FixContext) -> Result<()> {
		if tokens.len() < 4 {
			return Ok(());
		}

		// Token removal shifts trailing indices, hence the backward scan.
		for index in (1..tokens.len() - 3).rev() {
			let Some((open_paren, close_paren)) = replace_candidate(tokens, index) else {
				continue;
			};

			tokens.clear_and_merge_whitespace(close_paren);
			tokens.clear_and_merge_whitespace(open_paren);
			tokens.set(index, Token::new(TokenKind::Class, "class"));
		}

		Ok(())
	}
}

/// The parentheses of a `::className()` call at `index`, or `None` when the
/// shape does not match.
fn replace_candidate(tokens: &Tokens, index: usize) -> Option<(usize, usize)> {
	if tokens[index].kind != TokenKind::Identifier || tokens[index].text != "className" {
		return None;
	}

	let open_paren = tokens.next_meaningful(index)?;

	if tokens[open_paren].kind != TokenKind::ParenOpen {
		return None;
	}

	let close_paren = tokens.next_meaningful(open_paren)?;

	if tokens[close_paren].kind != TokenKind::ParenClose {
		return None;
	}

	let double_colon = tokens.prev_meaningful(index)?;

	if tokens[double_colon].kind != TokenKind::DoubleColon {
		return None;
	}

	Some((open_paren, close_paren))
}
