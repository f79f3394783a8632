//! Column alignment for multiline function parameter lists: variable names
//! (and optionally default values) line up across arguments.

use std::path::Path;

use serde_json::Value;

use super::{
	Fixer, FixerDefinition,
	functions::{self, ArgumentAnalysis},
	shared::FixContext,
	tokens::{TokenKind, Tokens},
};
use crate::prelude::*;

/// Length of the computed pieces of one parameter declaration, measured in
/// characters. `type_length` covers the type plus any `readonly` and
/// promotion modifiers with their separating whitespace, so alignment holds
/// for promoted constructor properties too.
#[derive(Clone, Copy, Debug)]
struct DeclarationAnalysis {
	type_length: usize,
	name_length: usize,
	name_index: usize,
	is_variadic: bool,
}

pub(crate) struct AlignMultilineParametersFixer {
	/// `Some(true)` aligns names into a column, `Some(false)` collapses the
	/// gap to a single space, `None` leaves names alone.
	variables: Option<bool>,
	/// Same tri-state for the whitespace before `=` of default values.
	defaults: Option<bool>,
}
impl AlignMultilineParametersFixer {
	pub(crate) fn new() -> Self {
		Self { variables: Some(true), defaults: None }
	}
}
impl Fixer for AlignMultilineParametersFixer {
	fn name(&self) -> &'static str {
		"align_multiline_parameters"
	}

	fn definition(&self) -> FixerDefinition {
		FixerDefinition {
			summary: "Aligns parameters in multiline function declaration.",
			sample: "<?php\nfunction test(\n    string $a,\n    int $b = 0\n): void {};\n",
		}
	}

	/// Must run after indentation and type-spacing normalization.
	fn priority(&self) -> i32 {
		-10
	}

	fn is_candidate(&self, tokens: &Tokens) -> bool {
		tokens.is_any_kind_found(&[TokenKind::Function, TokenKind::Fn])
	}

	fn configure(&mut self, options: &Value) -> Result<()> {
		for (key, value) in
			options.as_object().ok_or_else(|| eyre::eyre!("Expected an options object."))?
		{
			let parsed = match value {
				Value::Null => None,
				Value::Bool(flag) => Some(*flag),
				_ => return Err(eyre::eyre!("Option `{key}` must be a boolean or null.")),
			};

			match key.as_str() {
				"variables" => self.variables = parsed,
				"defaults" => self.defaults = parsed,
				_ => return Err(eyre::eyre!("Unknown option `{key}`.")),
			}
		}

		Ok(())
	}

	fn apply(&self, _path: &Path, tokens: &mut Tokens, ctx: &FixContext) -> Result<()> {
		if self.variables.is_none() && self.defaults.is_none() {
			return Ok(());
		}

		let function_indices = (0..tokens.len())
			.filter(|&i| matches!(tokens[i].kind, TokenKind::Function | TokenKind::Fn))
			.collect::<Vec<_>>();

		// Insertions shift every later index, so functions are handled back
		// to front, and arguments within each function likewise.
		for i in function_indices.into_iter().rev() {
			let Some(open_paren) = tokens.next_of_kind(i, &[TokenKind::ParenOpen]) else {
				continue;
			};

			if !tokens.is_block_multiline(open_paren)? {
				continue;
			}

			let arguments = functions::function_arguments(tokens, i)?;

			if arguments.is_empty() {
				continue;
			}

			let mut longest_type = 0;
			let mut longest_variable_name = 0;
			let mut has_at_least_one_typed_argument = false;
			let mut analysed_arguments = Vec::with_capacity(arguments.len());

			for argument in &arguments {
				let analysis = declaration_analysis(tokens, argument);

				if analysis.type_length > 0 {
					has_at_least_one_typed_argument = true;
				}
				if analysis.type_length > longest_type {
					longest_type = analysis.type_length;
				}
				if analysis.name_length > longest_variable_name {
					longest_variable_name = analysis.name_length;
				}
				if analysis.is_variadic {
					// Alignment targets the `$` symbol, so the type column
					// must be wide enough to absorb the `...` prefix.
					let longest_type_delta = longest_type - analysis.type_length;

					if longest_type == analysis.type_length {
						longest_type += 3;
					} else if longest_type_delta < 3 {
						longest_type +=
							3 - longest_type_delta - usize::from(analysis.type_length == 0);
					}
				}

				analysed_arguments.push(analysis);
			}

			let args_indent = format!("{}{}", tokens.detect_indent(i), ctx.whitespaces.indent);

			for argument in analysed_arguments.into_iter().rev() {
				if let Some(align_defaults) = self.defaults {
					// A type-default like `0` for `int` still tokenizes as a
					// plain `=`, so the equals sign is the reliable signal.
					let is_defaulted = tokens
						.next_meaningful(argument.name_index)
						.is_some_and(|next| tokens[next].kind == TokenKind::Equals);

					if is_defaulted {
						let content = if align_defaults {
							" ".repeat(longest_variable_name - argument.name_length + 1)
						} else {
							" ".to_owned()
						};

						tokens.ensure_whitespace_at(argument.name_index + 1, 0, &content);
					}
				}

				if let Some(align_variables) = self.variables {
					let whitespace_index = if argument.is_variadic {
						tokens
							.prev_meaningful(argument.name_index)
							.map_or(argument.name_index, |ellipsis| ellipsis)
							.saturating_sub(1)
					} else {
						argument.name_index - 1
					};
					let content = if align_variables {
						let mut align_length =
							longest_type - argument.type_length
								+ usize::from(has_at_least_one_typed_argument);

						if argument.is_variadic {
							align_length -= 3;
						}

						let appendix = " ".repeat(align_length);

						if argument.type_length > 0 {
							appendix
						} else {
							format!("{}{args_indent}{appendix}", ctx.whitespaces.line_ending)
						}
					} else if argument.type_length > 0 {
						" ".to_owned()
					} else {
						format!("{}{args_indent}", ctx.whitespaces.line_ending)
					};

					tokens.ensure_whitespace_at(whitespace_index, 1, &content);
				}
			}
		}

		Ok(())
	}
}

fn declaration_analysis(tokens: &Tokens, argument: &ArgumentAnalysis) -> DeclarationAnalysis {
	let name_index = argument.name_index;
	let mut search_index = name_index;
	let mut include_next_whitespace = false;
	let mut type_length = 0;
	let mut is_variadic = false;

	if let Some(prev) = tokens.prev_meaningful(search_index)
		&& tokens[prev].kind == TokenKind::Ellipsis
	{
		is_variadic = true;
		search_index = prev;
	}
	if let Some((start, end)) = argument.type_range {
		search_index = start;
		include_next_whitespace = true;
		type_length = (start..=end).map(|k| tokens[k].text.chars().count()).sum();
	}
	if let Some(prev) = tokens.prev_meaningful(search_index)
		&& tokens[prev].kind == TokenKind::Readonly
	{
		// A promoted property can't be `readonly` without a type, so the
		// separator between `readonly` and the type is always whitespace.
		type_length += tokens[prev].text.chars().count()
			+ tokens[search_index - 1].text.chars().count();
		search_index = prev;
		include_next_whitespace = true;
	}
	if let Some(prev) = tokens.prev_meaningful(search_index)
		&& matches!(
			tokens[prev].kind,
			TokenKind::Public | TokenKind::Protected | TokenKind::Private
		) {
		let mut promotion_length = tokens[prev].text.chars().count();

		if include_next_whitespace && tokens[prev + 1].is_whitespace() {
			promotion_length += tokens[prev + 1].text.chars().count();
		}

		type_length += promotion_length;
	}

	DeclarationAnalysis {
		type_length,
		name_length: tokens[name_index].text.chars().count(),
		name_index,
		is_variadic,
	}
}
