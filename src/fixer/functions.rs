//! Parameter-list analysis for function and arrow-function declarations:
//! per-argument name position and type span, recovered by balanced-bracket
//! splitting of the declaration's parentheses.

use super::tokens::{TokenKind, Tokens};
use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ArgumentAnalysis {
	/// Index of the parameter's variable token.
	pub(crate) name_index: usize,
	/// Inclusive token range of the type declaration, when present. Promotion
	/// modifiers (`public`/`protected`/`private`/`readonly`) are not part of
	/// the type span.
	pub(crate) type_range: Option<(usize, usize)>,
}

/// The declared parameters of the function whose keyword sits at
/// `function_index`, in declaration order.
pub(crate) fn function_arguments(
	tokens: &Tokens,
	function_index: usize,
) -> Result<Vec<ArgumentAnalysis>> {
	let open = tokens
		.next_of_kind(function_index, &[TokenKind::ParenOpen])
		.ok_or_else(|| eyre::eyre!("Function at index {function_index} has no parameter list."))?;
	let close = tokens.find_block_end(open)?;
	let mut arguments = Vec::new();
	let mut segment_start = open + 1;
	let mut depth = 0_usize;

	for i in open + 1..=close {
		match tokens[i].kind {
			TokenKind::ParenOpen | TokenKind::BracketOpen | TokenKind::BraceOpen => depth += 1,
			TokenKind::ParenClose | TokenKind::BracketClose | TokenKind::BraceClose
				if i < close =>
			{
				depth -= 1;
			},
			TokenKind::Comma if depth == 0 => {
				arguments.extend(analyze_segment(tokens, segment_start, i - 1));

				segment_start = i + 1;
			},
			_ => {},
		}
	}

	arguments.extend(analyze_segment(tokens, segment_start, close.saturating_sub(1)));

	Ok(arguments)
}

fn analyze_segment(tokens: &Tokens, start: usize, end: usize) -> Option<ArgumentAnalysis> {
	if start > end {
		return None;
	}

	let name_index =
		(start..=end).find(|&i| tokens[i].kind == TokenKind::Variable)?;

	// Skip leading promotion modifiers; what remains before the name (minus a
	// by-reference `&` and a variadic `...`) is the type span.
	let Some(mut type_start) = (start..name_index).find(|&i| tokens[i].is_meaningful()) else {
		return Some(ArgumentAnalysis { name_index, type_range: None });
	};

	while matches!(
		tokens[type_start].kind,
		TokenKind::Public | TokenKind::Protected | TokenKind::Private | TokenKind::Readonly
	) {
		type_start = tokens.next_meaningful(type_start)?;

		if type_start >= name_index {
			return Some(ArgumentAnalysis { name_index, type_range: None });
		}
	}

	let mut boundary = name_index;

	if let Some(prev) = tokens.prev_meaningful(boundary)
		&& prev >= start
		&& tokens[prev].kind == TokenKind::Ellipsis
	{
		boundary = prev;
	}
	if let Some(prev) = tokens.prev_meaningful(boundary)
		&& prev >= start
		&& tokens[prev].kind == TokenKind::Ampersand
	{
		boundary = prev;
	}

	let type_range = tokens
		.prev_meaningful(boundary)
		.filter(|&i| i >= type_start)
		.map(|type_end| (type_start, type_end));

	Some(ArgumentAnalysis { name_index, type_range })
}
