//! Guarantees an empty line in front of `return` statements that follow
//! other statements on the same nesting level.

use std::path::Path;

use super::{
	Fixer, FixerDefinition,
	shared::FixContext,
	tokens::{Token, TokenKind, Tokens},
};
use crate::prelude::*;

pub(crate) struct BlankLineBeforeReturnFixer;
impl Fixer for BlankLineBeforeReturnFixer {
	fn name(&self) -> &'static str {
		"blank_line_before_return"
	}

	fn definition(&self) -> FixerDefinition {
		FixerDefinition {
			summary: "An empty line feed should precede a return statement.",
			sample: "<?php\nfunction a()\n{\n    echo 1;\n    echo 2;\n    return 1;\n}\n",
		}
	}

	/// Must run after useless-return removal and brace normalization.
	fn priority(&self) -> i32 {
		-26
	}

	fn is_candidate(&self, tokens: &Tokens) -> bool {
		tokens.is_kind_found(TokenKind::Return)
	}

	fn apply(&self, _path: &Path, tokens: &mut Tokens, ctx: &FixContext) -> Result<()> {
		let eol = &ctx.whitespaces.line_ending;
		let mut index = 0;

		while index < tokens.len() {
			if tokens[index].kind != TokenKind::Return {
				index += 1;

				continue;
			}

			// A `return` that opens its block needs no separator.
			let preceded_by_statement = tokens.prev_non_whitespace(index).is_some_and(|prev| {
				matches!(tokens[prev].kind, TokenKind::Semicolon | TokenKind::BraceClose)
			});

			if !preceded_by_statement {
				index += 1;

				continue;
			}

			let prev_index = index - 1;

			if tokens[prev_index].is_whitespace() {
				let content = tokens[prev_index].text.clone();
				let count_parts = content.matches('\n').count();

				if count_parts == 0 {
					let trimmed = content.trim_end_matches([' ', '\t']);

					tokens.set(prev_index, Token::whitespace(format!("{trimmed}{eol}{eol}")));
				} else if count_parts == 1
					&& blank_line_is_missing(tokens, prev_index, count_parts)
				{
					tokens.set(prev_index, Token::whitespace(format!("{eol}{content}")));
				}
			} else {
				tokens.insert_at(index, Token::whitespace(format!("{eol}{eol}")));

				index += 1;
			}

			index += 1;
		}

		Ok(())
	}
}

/// Walks backwards from the single-newline whitespace in front of `return`,
/// counting line breaks until the enclosing block opens. Comment-only lines
/// above the `return` count as the separator.
fn blank_line_is_missing(tokens: &Tokens, prev_index: usize, seen_parts: usize) -> bool {
	let mut count_parts = seen_parts;
	let mut backward_index = prev_index;

	while count_parts < 3 {
		if backward_index == 0 {
			break;
		}

		backward_index -= 1;

		let backward_token = &tokens[backward_index];

		if backward_token.kind == TokenKind::BraceOpen {
			break;
		}

		if backward_token.is_whitespace() {
			count_parts += backward_token.text.matches('\n').count();
		}
	}

	count_parts != 2
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixer::{lexer, shared::WhitespacesConfig, type_info::SourceTypeInfo};

	fn fix(source: &str) -> String {
		let info = SourceTypeInfo::new();
		let whitespaces = WhitespacesConfig::default();
		let ctx = FixContext { whitespaces: &whitespaces, type_info: &info };
		let mut tokens = lexer::tokenize(source);

		BlankLineBeforeReturnFixer.apply(Path::new("test.php"), &mut tokens, &ctx).expect("apply");

		tokens.to_source()
	}

	#[test]
	fn inserts_a_blank_line_after_preceding_statements() {
		let source = "<?php\nfunction a()\n{\n    echo 1;\n    echo 2;\n    return 1;\n}\n";

		assert_eq!(
			fix(source),
			"<?php\nfunction a()\n{\n    echo 1;\n    echo 2;\n\n    return 1;\n}\n",
		);
	}

	#[test]
	fn single_preceding_statement_needs_no_separation() {
		let source = "<?php\nfunction a()\n{\n    echo 1;\n    return 1;\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn return_opening_its_block_is_left_alone() {
		let source = "<?php\nfunction a()\n{\n    return 1;\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn existing_blank_line_is_kept() {
		let source = "<?php\nfunction a()\n{\n    echo 1;\n\n    return 1;\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn same_line_return_moves_to_its_own_paragraph() {
		let source = "<?php\n$a = $a; return $a;\n";

		assert_eq!(fix(source), "<?php\n$a = $a;\n\nreturn $a;\n");
	}

	#[test]
	fn comment_line_directly_above_counts_as_the_block_opening() {
		let source = "<?php\nfunction a()\n{\n    // comment\n    return 1;\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn string_interpolation_braces_do_not_stop_the_backward_scan() {
		let source =
			"<?php\nif ($condition) {\n    $a = \"Interpolation {$var}.\";\n    return true;\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn return_after_block_needs_the_blank_line_too() {
		let source = "<?php\nfunction a()\n{\n    if (true) {\n        echo 1;\n    }\n    return 1;\n}\n";

		assert_eq!(
			fix(source),
			"<?php\nfunction a()\n{\n    if (true) {\n        echo 1;\n    }\n\n    return 1;\n}\n",
		);
	}
}
