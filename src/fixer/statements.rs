//! Compound-statement extents: where an `if`/`for`/`foreach`/`while`/
//! `switch`/`try` construct ends, chained clauses included.

use super::tokens::{TokenKind, Tokens};
use crate::prelude::*;

/// Control keywords that open a compound statement. `do` is absent: its
/// `while (...);` tail is what terminates the loop, so processing the `while`
/// keyword covers `do {} while ();` as well.
pub(crate) const STATEMENT_KINDS: [TokenKind; 6] = [
	TokenKind::If,
	TokenKind::Switch,
	TokenKind::For,
	TokenKind::Foreach,
	TokenKind::While,
	TokenKind::Try,
];

/// The index where the compound statement opened by the keyword at
/// `keyword_index` ends, chaining through `elseif`/`else`/`else if` and
/// `catch`/`finally` cascades to the end of the last clause.
pub(crate) fn find_statement_end(tokens: &Tokens, keyword_index: usize) -> Result<usize> {
	let next = tokens
		.next_meaningful(keyword_index)
		.ok_or_else(|| eyre::eyre!("Dangling control keyword at index {keyword_index}."))?;
	let possible_open_brace = if tokens[next].kind == TokenKind::ParenOpen {
		let condition_end = tokens.find_block_end(next)?;

		tokens
			.next_non_whitespace(condition_end)
			.ok_or_else(|| eyre::eyre!("Unterminated statement at index {keyword_index}."))?
	} else {
		next
	};

	// `do {} while (...);` closes at its semicolon.
	if tokens[keyword_index].kind == TokenKind::While
		&& tokens[possible_open_brace].kind == TokenKind::Semicolon
	{
		return Ok(possible_open_brace);
	}

	let block_end = if tokens[possible_open_brace].kind == TokenKind::BraceOpen {
		tokens.find_block_end(possible_open_brace)?
	} else {
		// Brace-less single-statement form.
		tokens
			.next_of_kind(possible_open_brace, &[TokenKind::Semicolon])
			.ok_or_else(|| eyre::eyre!("Unterminated statement at index {keyword_index}."))?
	};
	let Some(next_statement) = tokens.next_meaningful(block_end) else {
		return Ok(block_end);
	};

	match tokens[next_statement].kind {
		TokenKind::ElseIf => find_statement_end(tokens, next_statement),
		TokenKind::Else => {
			let after_else = tokens
				.next_meaningful(next_statement)
				.ok_or_else(|| eyre::eyre!("Dangling `else` at index {next_statement}."))?;

			if tokens[after_else].kind == TokenKind::If {
				find_statement_end(tokens, after_else)
			} else {
				find_statement_end(tokens, next_statement)
			}
		},
		TokenKind::Catch | TokenKind::Finally => find_statement_end(tokens, next_statement),
		_ => Ok(block_end),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixer::lexer;

	fn end_of_first(source: &str, kind: TokenKind) -> (Tokens, usize) {
		let tokens = lexer::tokenize(source);
		let keyword = tokens.next_of_kind(0, &[kind]).expect("keyword");
		let end = find_statement_end(&tokens, keyword).expect("statement end");

		(tokens, end)
	}

	#[test]
	fn plain_block_ends_at_its_close() {
		let (tokens, end) = end_of_first("<?php if ($a) { echo 1; } echo 2;", TokenKind::If);

		assert_eq!(tokens[end].kind, TokenKind::BraceClose);
		assert!(tokens.to_source()[..source_offset(&tokens, end + 1)].ends_with("}"));
	}

	#[test]
	fn cascade_ends_at_the_final_clause() {
		let (tokens, end) = end_of_first(
			"<?php if ($a) { echo 1; } elseif ($b) { echo 2; } else { echo 3; } echo 4;",
			TokenKind::If,
		);
		let last_close = (0..tokens.len())
			.filter(|&i| tokens[i].kind == TokenKind::BraceClose)
			.next_back()
			.expect("last close");

		assert_eq!(end, last_close);
	}

	#[test]
	fn else_if_split_keywords_chain() {
		let (tokens, end) = end_of_first(
			"<?php if ($a) { echo 1; } else if ($b) { echo 2; } echo 3;",
			TokenKind::If,
		);
		let last_close = (0..tokens.len())
			.filter(|&i| tokens[i].kind == TokenKind::BraceClose)
			.next_back()
			.expect("last close");

		assert_eq!(end, last_close);
	}

	#[test]
	fn try_chains_catch_and_finally() {
		let (tokens, end) = end_of_first(
			"<?php try { a(); } catch (\\Throwable $e) { b(); } finally { c(); } d();",
			TokenKind::Try,
		);
		let last_close = (0..tokens.len())
			.filter(|&i| tokens[i].kind == TokenKind::BraceClose)
			.next_back()
			.expect("last close");

		assert_eq!(end, last_close);
	}

	#[test]
	fn do_while_ends_at_its_semicolon() {
		let (tokens, end) = end_of_first("<?php do { a(); } while ($b); c();", TokenKind::While);

		assert_eq!(tokens[end].kind, TokenKind::Semicolon);
	}

	#[test]
	fn braceless_form_ends_at_the_terminator() {
		let (tokens, end) = end_of_first("<?php foreach ($xs as $x) echo $x; echo 2;", TokenKind::Foreach);

		assert_eq!(tokens[end].kind, TokenKind::Semicolon);
		assert!(tokens.next_of_kind(end, &[TokenKind::Semicolon]).is_some());
	}

	fn source_offset(tokens: &Tokens, token_count: usize) -> usize {
		(0..token_count).map(|i| tokens[i].text.len()).sum()
	}
}
