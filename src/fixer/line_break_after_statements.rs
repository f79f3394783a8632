//! One blank line below every control structure, unless the structure is the
//! last statement of its block.

use std::path::Path;

use super::{
	Fixer, FixerDefinition,
	shared::{self, FixContext},
	statements,
	tokens::{Token, TokenKind, Tokens},
};
use crate::prelude::*;

pub(crate) struct LineBreakAfterStatementsFixer;
impl Fixer for LineBreakAfterStatementsFixer {
	fn name(&self) -> &'static str {
		"line_break_after_statements"
	}

	fn definition(&self) -> FixerDefinition {
		FixerDefinition {
			summary: "Ensures that there is one blank line above the control statements.",
			sample: "<?php\nif (true) {\n    // ...\n}\n$a = \"next statement\";\n",
		}
	}

	/// Best run after brace normalization.
	fn priority(&self) -> i32 {
		-26
	}

	fn is_candidate(&self, tokens: &Tokens) -> bool {
		tokens.is_any_kind_found(&statements::STATEMENT_KINDS)
	}

	fn apply(&self, _path: &Path, tokens: &mut Tokens, ctx: &FixContext) -> Result<()> {
		let mut index = 0;

		while index < tokens.len() {
			if !statements::STATEMENT_KINDS.contains(&tokens[index].kind) {
				index += 1;

				continue;
			}

			let statement_end = statements::find_statement_end(tokens, index)?;
			let Some(next_statement) = tokens.next_meaningful(statement_end) else {
				break;
			};

			// The last statement of a block hugs the closing brace.
			let count_lines = usize::from(tokens[next_statement].kind != TokenKind::BraceClose);

			fix_blank_lines(tokens, statement_end + 1, count_lines, ctx);

			index += 1;
		}

		Ok(())
	}
}

fn fix_blank_lines(tokens: &mut Tokens, index: usize, count_lines: usize, ctx: &FixContext) {
	let eol = &ctx.whitespaces.line_ending;

	if tokens[index].is_whitespace() {
		if let Some(content) = shared::blank_lines_content(&tokens[index].text, count_lines, eol) {
			tokens.set(index, Token::whitespace(content));
		}
	} else {
		tokens.insert_at(index, Token::whitespace(eol.repeat(count_lines + 1)));
	}
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

		LineBreakAfterStatementsFixer
			.apply(Path::new("test.php"), &mut tokens, &ctx)
			.expect("apply");

		tokens.to_source()
	}

	#[test]
	fn separates_a_control_structure_from_the_next_statement() {
		let source = "<?php\nif (true) {\n    echo 1;\n}\n$a = 1;\n";

		assert_eq!(fix(source), "<?php\nif (true) {\n    echo 1;\n}\n\n$a = 1;\n");
	}

	#[test]
	fn last_statement_of_a_block_hugs_the_closing_brace() {
		let source = "<?php\nfunction a() {\n    if (true) {\n        echo 1;\n    }\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn extra_blank_lines_before_the_closing_brace_are_dropped() {
		let source = "<?php\nfunction a() {\n    if (true) {\n        echo 1;\n    }\n\n}\n";

		assert_eq!(fix(source), "<?php\nfunction a() {\n    if (true) {\n        echo 1;\n    }\n}\n");
	}

	#[test]
	fn else_chains_count_as_one_statement() {
		let source = "<?php\nif (true) {\n    echo 1;\n} else {\n    echo 2;\n}\n$a = 1;\n";

		assert_eq!(
			fix(source),
			"<?php\nif (true) {\n    echo 1;\n} else {\n    echo 2;\n}\n\n$a = 1;\n",
		);
	}

	#[test]
	fn do_while_separates_after_the_trailing_semicolon() {
		let source = "<?php\ndo {\n    echo 1;\n} while (true);\n$a = 1;\n";

		assert_eq!(fix(source), "<?php\ndo {\n    echo 1;\n} while (true);\n\n$a = 1;\n");
	}

	#[test]
	fn try_catch_finally_is_a_single_unit() {
		let source =
			"<?php\ntry {\n    echo 1;\n} catch (Throwable $e) {\n} finally {\n    echo 2;\n}\n$a = 1;\n";

		assert_eq!(
			fix(source),
			"<?php\ntry {\n    echo 1;\n} catch (Throwable $e) {\n} finally {\n    echo 2;\n}\n\n$a = 1;\n",
		);
	}

	#[test]
	fn already_separated_statements_are_unchanged() {
		let source = "<?php\nforeach ([1, 2] as $v) {\n    echo $v;\n}\n\n$a = 1;\n";

		assert_eq!(fix(source), source);
	}
}
