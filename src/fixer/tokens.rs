use std::ops::Index;

use crate::prelude::*;

/// Lexical classification of one token. Whitespace and comments are ordinary
/// tokens, not trivia: every byte of the source lives in exactly one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TokenKind {
	OpenTag,
	CloseTag,
	InlineHtml,
	Whitespace,
	Comment,
	Identifier,
	Variable,
	Number,
	Str,
	// Keywords.
	Abstract,
	As,
	Case,
	Catch,
	Class,
	Const,
	Do,
	Else,
	ElseIf,
	Enum,
	Extends,
	Final,
	Finally,
	Fn,
	For,
	Foreach,
	Function,
	If,
	Implements,
	Interface,
	Namespace,
	New,
	Private,
	Protected,
	Public,
	Readonly,
	Return,
	Static,
	Switch,
	Trait,
	Try,
	Use,
	While,
	// Punctuation and operators.
	BraceOpen,
	BraceClose,
	ParenOpen,
	ParenClose,
	BracketOpen,
	BracketClose,
	Semicolon,
	Comma,
	Equals,
	Colon,
	Question,
	DoubleColon,
	Arrow,
	DoubleArrow,
	Ellipsis,
	NsSeparator,
	Ampersand,
	Op,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
	pub(crate) kind: TokenKind,
	pub(crate) text: String,
}
impl Token {
	pub(crate) fn new(kind: TokenKind, text: impl Into<String>) -> Self {
		Self { kind, text: text.into() }
	}

	pub(crate) fn whitespace(text: impl Into<String>) -> Self {
		Self::new(TokenKind::Whitespace, text)
	}

	pub(crate) fn is_whitespace(&self) -> bool {
		self.kind == TokenKind::Whitespace
	}

	/// Whitespace that stays on its line: spaces and tabs only.
	pub(crate) fn is_inline_whitespace(&self) -> bool {
		self.is_whitespace() && self.text.chars().all(|ch| ch == ' ' || ch == '\t')
	}

	pub(crate) fn is_comment(&self) -> bool {
		self.kind == TokenKind::Comment
	}

	pub(crate) fn is_meaningful(&self) -> bool {
		!self.is_whitespace() && !self.is_comment()
	}

	/// Opens a class-like body: `class`, `interface`, `trait` or `enum`.
	pub(crate) fn is_classy(&self) -> bool {
		matches!(
			self.kind,
			TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum
		)
	}
}

/// One file's token sequence. Indices are dense and reassigned by every
/// mutation, so callers that apply several edits in one scan must pick an
/// iteration order that keeps not-yet-visited indices valid (in practice:
/// back to front).
#[derive(Clone, Debug)]
pub(crate) struct Tokens {
	tokens: Vec<Token>,
	changes: usize,
}
impl Tokens {
	pub(crate) fn new(tokens: Vec<Token>) -> Self {
		Self { tokens, changes: 0 }
	}

	pub(crate) fn len(&self) -> usize {
		self.tokens.len()
	}

	pub(crate) fn get(&self, index: usize) -> Option<&Token> {
		self.tokens.get(index)
	}

	pub(crate) fn iter(&self) -> impl Iterator<Item = &Token> {
		self.tokens.iter()
	}

	/// Count of mutations applied so far; drivers diff this around a fixer
	/// run to learn whether it touched the sequence.
	pub(crate) fn changes(&self) -> usize {
		self.changes
	}

	pub(crate) fn to_source(&self) -> String {
		self.tokens.iter().map(|token| token.text.as_str()).collect()
	}

	pub(crate) fn is_kind_found(&self, kind: TokenKind) -> bool {
		self.tokens.iter().any(|token| token.kind == kind)
	}

	pub(crate) fn is_any_kind_found(&self, kinds: &[TokenKind]) -> bool {
		self.tokens.iter().any(|token| kinds.contains(&token.kind))
	}

	pub(crate) fn next_of_kind(&self, from: usize, kinds: &[TokenKind]) -> Option<usize> {
		(from + 1..self.tokens.len()).find(|&i| kinds.contains(&self.tokens[i].kind))
	}

	pub(crate) fn prev_of_kind(&self, from: usize, kinds: &[TokenKind]) -> Option<usize> {
		(0..from).rev().find(|&i| kinds.contains(&self.tokens[i].kind))
	}

	pub(crate) fn next_meaningful(&self, from: usize) -> Option<usize> {
		(from + 1..self.tokens.len()).find(|&i| self.tokens[i].is_meaningful())
	}

	pub(crate) fn prev_meaningful(&self, from: usize) -> Option<usize> {
		(0..from).rev().find(|&i| self.tokens[i].is_meaningful())
	}

	pub(crate) fn next_non_whitespace(&self, from: usize) -> Option<usize> {
		(from + 1..self.tokens.len()).find(|&i| !self.tokens[i].is_whitespace())
	}

	pub(crate) fn prev_non_whitespace(&self, from: usize) -> Option<usize> {
		(0..from).rev().find(|&i| !self.tokens[i].is_whitespace())
	}

	/// Index of the closing bracket matching the opener at `open_index`,
	/// accounting for nested pairs of the same kind. Exhausting the sequence
	/// before the depth returns to zero is a structural error.
	pub(crate) fn find_block_end(&self, open_index: usize) -> Result<usize> {
		let open_kind = self.tokens[open_index].kind;
		let close_kind = match open_kind {
			TokenKind::BraceOpen => TokenKind::BraceClose,
			TokenKind::ParenOpen => TokenKind::ParenClose,
			TokenKind::BracketOpen => TokenKind::BracketClose,
			_ => {
				return Err(eyre::eyre!(
					"Token at index {open_index} is not a block opener: {open_kind:?}."
				));
			},
		};
		let mut depth = 1_usize;

		for i in open_index + 1..self.tokens.len() {
			let kind = self.tokens[i].kind;

			if kind == open_kind {
				depth += 1;
			} else if kind == close_kind {
				depth -= 1;

				if depth == 0 {
					return Ok(i);
				}
			}
		}

		Err(eyre::eyre!("Unclosed block starting at index {open_index}."))
	}

	/// Whether the bracketed block starting at `open_index` spans lines.
	pub(crate) fn is_block_multiline(&self, open_index: usize) -> Result<bool> {
		let end = self.find_block_end(open_index)?;

		Ok(self.tokens[open_index..=end].iter().any(|token| token.text.contains('\n')))
	}

	/// The horizontal whitespace run that opens the line containing `index`.
	pub(crate) fn detect_indent(&self, index: usize) -> String {
		let mut cursor = index;

		loop {
			let Some(whitespace_index) = self.prev_of_kind(cursor, &[TokenKind::Whitespace])
			else {
				return String::new();
			};
			let whitespace = &self.tokens[whitespace_index];

			if whitespace.text.contains('\n') {
				return whitespace.text.rsplit('\n').next().unwrap_or_default().to_owned();
			}
			// Inline HTML can end a line without a whitespace token.
			if whitespace_index > 0 && self.tokens[whitespace_index - 1].text.ends_with('\n') {
				return whitespace.text.clone();
			}

			cursor = whitespace_index;
		}
	}

	pub(crate) fn set(&mut self, index: usize, token: Token) {
		if self.tokens[index] != token {
			self.tokens[index] = token;
			self.changes += 1;
		}
	}

	pub(crate) fn insert_at(&mut self, index: usize, token: Token) {
		self.tokens.insert(index, token);
		self.changes += 1;
	}

	pub(crate) fn remove_at(&mut self, index: usize) -> Token {
		self.changes += 1;

		self.tokens.remove(index)
	}

	/// Replaces the inclusive range `start..=end` with `replacement`,
	/// implicitly re-indexing all subsequent tokens.
	pub(crate) fn override_range(&mut self, start: usize, end: usize, replacement: Vec<Token>) {
		self.tokens.splice(start..=end, replacement);
		self.changes += 1;
	}

	/// If the token at `index` is whitespace, rewrites its content; otherwise
	/// inserts a new whitespace token at `index + offset`. Returns whether
	/// the sequence changed.
	pub(crate) fn ensure_whitespace_at(
		&mut self,
		index: usize,
		offset: usize,
		content: &str,
	) -> bool {
		if self.tokens[index].is_whitespace() {
			if self.tokens[index].text == content {
				return false;
			}

			self.set(index, Token::whitespace(content));
		} else {
			self.insert_at(index + offset, Token::whitespace(content));
		}

		true
	}

	pub(crate) fn remove_leading_whitespace(&mut self, index: usize) {
		if index > 0 && self.tokens[index - 1].is_whitespace() {
			self.remove_at(index - 1);
		}
	}

	/// Removes the token at `index`; if that leaves two adjacent whitespace
	/// tokens they are merged into one.
	pub(crate) fn clear_and_merge_whitespace(&mut self, index: usize) {
		self.remove_at(index);

		if index > 0
			&& index < self.tokens.len()
			&& self.tokens[index - 1].is_whitespace()
			&& self.tokens[index].is_whitespace()
		{
			let trailing = self.remove_at(index);

			let merged = format!("{}{}", self.tokens[index - 1].text, trailing.text);
			self.tokens[index - 1] = Token::whitespace(merged);
		}
	}
}
impl Index<usize> for Tokens {
	type Output = Token;

	fn index(&self, index: usize) -> &Token {
		&self.tokens[index]
	}
}
