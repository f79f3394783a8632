//! Placement of the condition-closing parenthesis of multiline `if`
//! statements: on its own line, or glued to the last condition line.

use std::path::Path;

use serde_json::Value;

use super::{
	Fixer, FixerDefinition,
	shared::FixContext,
	tokens::{TokenKind, Tokens},
};
use crate::prelude::*;

pub(crate) struct MultilineIfStatementBracesFixer {
	keep_on_own_line: bool,
}
impl MultilineIfStatementBracesFixer {
	pub(crate) fn new() -> Self {
		Self { keep_on_own_line: true }
	}
}
impl Fixer for MultilineIfStatementBracesFixer {
	fn name(&self) -> &'static str {
		"multiline_if_statement_braces"
	}

	fn definition(&self) -> FixerDefinition {
		FixerDefinition {
			summary: "Ensures that multiline if statement body curly brace placed on the right line.",
			sample: "<?php\nif ($condition1 == true\n && $condition2 === false) {}\n",
		}
	}

	fn is_candidate(&self, tokens: &Tokens) -> bool {
		tokens.is_kind_found(TokenKind::If)
	}

	fn configure(&mut self, options: &Value) -> Result<()> {
		for (key, value) in
			options.as_object().ok_or_else(|| eyre::eyre!("Expected an options object."))?
		{
			match key.as_str() {
				"keep_on_own_line" => {
					self.keep_on_own_line = value.as_bool().ok_or_else(|| {
						eyre::eyre!("Option `keep_on_own_line` must be a boolean.")
					})?;
				},
				_ => return Err(eyre::eyre!("Unknown option `{key}`.")),
			}
		}

		Ok(())
	}

	fn apply(&self, _path: &Path, tokens: &mut Tokens, ctx: &FixContext) -> Result<()> {
		let eol = &ctx.whitespaces.line_ending;
		let if_indices =
			(0..tokens.len()).filter(|&i| tokens[i].kind == TokenKind::If).collect::<Vec<_>>();

		// Inserting before a closing parenthesis shifts everything behind it,
		// so nested conditions are fixed inside out.
		for i in if_indices.into_iter().rev() {
			let Some(open_paren) = tokens.next_of_kind(i, &[TokenKind::ParenOpen]) else {
				continue;
			};

			if !tokens.is_block_multiline(open_paren)? {
				continue;
			}

			let closing_paren = tokens.find_block_end(open_paren)?;

			if self.keep_on_own_line {
				let before_closing = &tokens[closing_paren - 1];

				if !before_closing.is_whitespace() || !before_closing.text.contains(eol.as_str())
				{
					let indent = tokens.detect_indent(i);

					tokens.ensure_whitespace_at(closing_paren, 0, &format!("{eol}{indent}"));
				}
			} else {
				tokens.remove_leading_whitespace(closing_paren);
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixer::{lexer, shared::WhitespacesConfig, type_info::SourceTypeInfo};

	fn fix_with(fixer: &MultilineIfStatementBracesFixer, source: &str) -> String {
		let info = SourceTypeInfo::new();
		let whitespaces = WhitespacesConfig::default();
		let ctx = FixContext { whitespaces: &whitespaces, type_info: &info };
		let mut tokens = lexer::tokenize(source);

		fixer.apply(Path::new("test.php"), &mut tokens, &ctx).expect("apply");

		tokens.to_source()
	}

	fn fix(source: &str) -> String {
		fix_with(&MultilineIfStatementBracesFixer::new(), source)
	}

	#[test]
	fn moves_the_closing_parenthesis_to_its_own_line() {
		let source = "<?php\nif ($condition1 == true\n && $condition2 === false) {}\n";

		assert_eq!(
			fix(source),
			"<?php\nif ($condition1 == true\n && $condition2 === false\n) {}\n",
		);
	}

	#[test]
	fn keeps_the_enclosing_indentation() {
		let source =
			"<?php\nfunction a() {\n    if ($condition1\n     && $condition2) {}\n}\n";

		assert_eq!(
			fix(source),
			"<?php\nfunction a() {\n    if ($condition1\n     && $condition2\n    ) {}\n}\n",
		);
	}

	#[test]
	fn parenthesis_already_on_its_own_line_is_unchanged() {
		let source = "<?php\nif ($condition1\n && $condition2\n) {}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn single_line_conditions_are_ignored() {
		let source = "<?php\nif ($condition1 && $condition2) {}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn disabled_option_glues_the_parenthesis_back() {
		let mut fixer = MultilineIfStatementBracesFixer::new();

		fixer.configure(&serde_json::json!({ "keep_on_own_line": false })).expect("configure");

		let source = "<?php\nif ($condition1\n && $condition2\n) {}\n";

		assert_eq!(fix_with(&fixer, source), "<?php\nif ($condition1\n && $condition2) {}\n");
	}
}
