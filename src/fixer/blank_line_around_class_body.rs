//! Blank-line padding just inside class-like bodies: after the opening brace
//! and before the closing one.

use std::path::Path;

use serde_json::Value;

use super::{
	Fixer, FixerDefinition,
	shared::{self, FixContext},
	tokens::{TokenKind, Tokens},
};
use crate::prelude::*;

pub(crate) struct BlankLineAroundClassBodyFixer {
	blank_lines_count: usize,
	apply_to_anonymous_classes: bool,
}
impl BlankLineAroundClassBodyFixer {
	pub(crate) fn new() -> Self {
		Self { blank_lines_count: 1, apply_to_anonymous_classes: true }
	}
}
impl Fixer for BlankLineAroundClassBodyFixer {
	fn name(&self) -> &'static str {
		"blank_line_around_class_body"
	}

	fn definition(&self) -> FixerDefinition {
		FixerDefinition {
			summary: "Ensure that class body contains one blank line after class definition and before its end.",
			sample: "<?php\nclass Sample\n{\n    protected function foo()\n    {\n    }\n}\n",
		}
	}

	/// Must run after blank-line collapsing and brace-position fixers, which
	/// would otherwise undo the padding.
	fn priority(&self) -> i32 {
		-21
	}

	fn is_candidate(&self, tokens: &Tokens) -> bool {
		tokens.is_any_kind_found(&[
			TokenKind::Class,
			TokenKind::Interface,
			TokenKind::Trait,
			TokenKind::Enum,
		])
	}

	fn configure(&mut self, options: &Value) -> Result<()> {
		for (key, value) in
			options.as_object().ok_or_else(|| eyre::eyre!("Expected an options object."))?
		{
			match key.as_str() {
				"blank_lines_count" => {
					self.blank_lines_count = value
						.as_u64()
						.ok_or_else(|| {
							eyre::eyre!("Option `blank_lines_count` must be a non-negative integer.")
						})? as usize;
				},
				"apply_to_anonymous_classes" => {
					self.apply_to_anonymous_classes = value.as_bool().ok_or_else(|| {
						eyre::eyre!("Option `apply_to_anonymous_classes` must be a boolean.")
					})?;
				},
				_ => return Err(eyre::eyre!("Unknown option `{key}`.")),
			}
		}

		Ok(())
	}

	fn apply(&self, _path: &Path, tokens: &mut Tokens, ctx: &FixContext) -> Result<()> {
		// Only existing whitespace tokens get rewritten, so a forward scan
		// never invalidates upcoming indices.
		for i in 0..tokens.len() {
			if !tokens[i].is_classy() {
				continue;
			}

			let mut count_lines = self.blank_lines_count;

			if !self.apply_to_anonymous_classes && is_anonymous_class(tokens, i) {
				count_lines = 0;
			}

			let Some(start_brace) = tokens.next_of_kind(i, &[TokenKind::BraceOpen]) else {
				continue;
			};

			if tokens[start_brace + 1].is_whitespace() {
				let first_statement = tokens.next_meaningful(start_brace);

				// Trait imports stay right below the opening brace.
				if first_statement.is_none_or(|k| tokens[k].kind != TokenKind::Use) {
					ensure_blank_lines(tokens, start_brace + 1, count_lines, ctx);
				}
			}

			let end_brace = tokens.find_block_end(start_brace)?;

			if tokens[end_brace - 1].is_whitespace() {
				ensure_blank_lines(tokens, end_brace - 1, count_lines, ctx);
			}
		}

		Ok(())
	}
}

fn is_anonymous_class(tokens: &Tokens, index: usize) -> bool {
	tokens[index].kind == TokenKind::Class
		&& tokens.prev_meaningful(index).is_some_and(|prev| tokens[prev].kind == TokenKind::New)
}

fn ensure_blank_lines(tokens: &mut Tokens, index: usize, count_lines: usize, ctx: &FixContext) {
	if let Some(content) =
		shared::blank_lines_content(&tokens[index].text, count_lines, &ctx.whitespaces.line_ending)
	{
		tokens.ensure_whitespace_at(index, 0, &content);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixer::{lexer, shared::WhitespacesConfig, type_info::SourceTypeInfo};

	fn fix_with(fixer: &BlankLineAroundClassBodyFixer, source: &str) -> String {
		let info = SourceTypeInfo::new();
		let whitespaces = WhitespacesConfig::default();
		let ctx = FixContext { whitespaces: &whitespaces, type_info: &info };
		let mut tokens = lexer::tokenize(source);

		fixer.apply(Path::new("test.php"), &mut tokens, &ctx).expect("apply");

		tokens.to_source()
	}

	fn fix(source: &str) -> String {
		fix_with(&BlankLineAroundClassBodyFixer::new(), source)
	}

	#[test]
	fn pads_both_ends_of_the_class_body() {
		let source = "<?php\nclass Sample\n{\n    public function foo()\n    {\n    }\n}\n";

		assert_eq!(
			fix(source),
			"<?php\nclass Sample\n{\n\n    public function foo()\n    {\n    }\n\n}\n",
		);
	}

	#[test]
	fn already_padded_body_is_unchanged() {
		let source = "<?php\nclass Sample\n{\n\n    public function foo() {}\n\n}\n";

		assert_eq!(fix(source), source);
	}

	#[test]
	fn trait_imports_stay_below_the_opening_brace() {
		let source = "<?php\nclass Sample\n{\n    use SomeTrait;\n}\n";

		assert_eq!(fix(source), "<?php\nclass Sample\n{\n    use SomeTrait;\n\n}\n");
	}

	#[test]
	fn anonymous_classes_can_be_excluded() {
		let mut fixer = BlankLineAroundClassBodyFixer::new();

		fixer
			.configure(&serde_json::json!({ "apply_to_anonymous_classes": false }))
			.expect("configure");

		let source = "<?php\n$a = new class {\n\n    public function foo() {}\n\n};\n";

		assert_eq!(
			fix_with(&fixer, source),
			"<?php\n$a = new class {\n    public function foo() {}\n};\n",
		);
	}

	#[test]
	fn blank_lines_count_is_configurable() {
		let mut fixer = BlankLineAroundClassBodyFixer::new();

		fixer.configure(&serde_json::json!({ "blank_lines_count": 2 })).expect("configure");

		let source = "<?php\nclass Sample\n{\n    public function foo() {}\n}\n";

		assert_eq!(
			fix_with(&fixer, source),
			"<?php\nclass Sample\n{\n\n\n    public function foo() {}\n\n\n}\n",
		);
	}

	#[test]
	fn single_line_body_gets_split_by_the_padding() {
		let source = "<?php\nclass Sample { public function foo() {} }\n";

		assert_eq!(fix(source), "<?php\nclass Sample {\n\n public function foo() {}\n\n }\n");
	}

	#[test]
	fn empty_body_without_inner_whitespace_is_unchanged() {
		let source = "<?php\nclass Sample {}\n";

		assert_eq!(fix(source), source);
	}
}
