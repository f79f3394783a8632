//! Minimal PHP scanner feeding the token sequence model. It only needs to be
//! faithful enough for the fixers: every byte of the input lands in exactly
//! one token and `Tokens::to_source` reproduces the input verbatim.

use super::tokens::{Token, TokenKind, Tokens};

pub(crate) fn tokenize(source: &str) -> Tokens {
	Lexer { chars: source.chars().collect(), pos: 0, out: Vec::new() }.run()
}

struct Lexer {
	chars: Vec<char>,
	pos: usize,
	out: Vec<Token>,
}
impl Lexer {
	fn run(mut self) -> Tokens {
		self.consume_inline_html();

		while self.pos < self.chars.len() {
			let ch = self.chars[self.pos];

			if ch.is_whitespace() {
				self.consume_whitespace();
			} else if ch == '/' && self.peek(1) == Some('/') {
				self.consume_line_comment();
			} else if ch == '#' {
				self.consume_line_comment();
			} else if ch == '/' && self.peek(1) == Some('*') {
				self.consume_block_comment();
			} else if ch == '\'' || ch == '"' {
				self.consume_string(ch);
			} else if ch == '$' && self.peek(1).is_some_and(is_ident_start) {
				self.consume_variable();
			} else if ch.is_ascii_digit() {
				self.consume_number();
			} else if is_ident_start(ch) {
				self.consume_identifier();
			} else {
				self.consume_operator();
			}
		}

		Tokens::new(self.out)
	}

	fn peek(&self, offset: usize) -> Option<char> {
		self.chars.get(self.pos + offset).copied()
	}

	fn starts_with(&self, needle: &str) -> bool {
		needle.chars().enumerate().all(|(i, ch)| self.peek(i) == Some(ch))
	}

	fn push(&mut self, kind: TokenKind, start: usize) {
		let text = self.chars[start..self.pos].iter().collect::<String>();

		self.out.push(Token::new(kind, text));
	}

	/// Everything up to the next open tag. Emits the tag itself when found.
	fn consume_inline_html(&mut self) {
		let start = self.pos;

		while self.pos < self.chars.len() && !self.starts_with("<?") {
			self.pos += 1;
		}

		if self.pos > start {
			self.push(TokenKind::InlineHtml, start);
		}
		if self.pos < self.chars.len() {
			let tag_start = self.pos;

			self.pos += 2;

			if self.starts_with("php") {
				self.pos += 3;
			} else if self.peek(0) == Some('=') {
				self.pos += 1;
			}

			self.push(TokenKind::OpenTag, tag_start);
		}
	}

	fn consume_whitespace(&mut self) {
		let start = self.pos;

		while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
			self.pos += 1;
		}

		self.push(TokenKind::Whitespace, start);
	}

	fn consume_line_comment(&mut self) {
		let start = self.pos;

		while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
			self.pos += 1;
		}

		self.push(TokenKind::Comment, start);
	}

	fn consume_block_comment(&mut self) {
		let start = self.pos;

		self.pos += 2;

		while self.pos < self.chars.len() && !self.starts_with("*/") {
			self.pos += 1;
		}

		if self.pos < self.chars.len() {
			self.pos += 2;
		}

		self.push(TokenKind::Comment, start);
	}

	fn consume_string(&mut self, quote: char) {
		let start = self.pos;

		self.pos += 1;

		while self.pos < self.chars.len() {
			let ch = self.chars[self.pos];

			if ch == '\\' {
				self.pos += 2;

				continue;
			}

			self.pos += 1;

			if ch == quote {
				break;
			}
		}

		self.pos = self.pos.min(self.chars.len());

		self.push(TokenKind::Str, start);
	}

	fn consume_variable(&mut self) {
		let start = self.pos;

		self.pos += 1;

		while self.pos < self.chars.len() && is_ident_continue(self.chars[self.pos]) {
			self.pos += 1;
		}

		self.push(TokenKind::Variable, start);
	}

	fn consume_number(&mut self) {
		let start = self.pos;

		while self.pos < self.chars.len() {
			let ch = self.chars[self.pos];

			if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
				self.pos += 1;
			} else {
				break;
			}
		}

		self.push(TokenKind::Number, start);
	}

	fn consume_identifier(&mut self) {
		let start = self.pos;

		while self.pos < self.chars.len() && is_ident_continue(self.chars[self.pos]) {
			self.pos += 1;
		}

		let text = self.chars[start..self.pos].iter().collect::<String>();
		let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);

		self.out.push(Token::new(kind, text));
	}

	fn consume_operator(&mut self) {
		let start = self.pos;

		// Longest first.
		static MULTI: &[(&str, TokenKind)] = &[
			("...", TokenKind::Ellipsis),
			("===", TokenKind::Op),
			("!==", TokenKind::Op),
			("<=>", TokenKind::Op),
			("**=", TokenKind::Op),
			("<<=", TokenKind::Op),
			(">>=", TokenKind::Op),
			("??=", TokenKind::Op),
			("?>", TokenKind::CloseTag),
			("::", TokenKind::DoubleColon),
			("->", TokenKind::Arrow),
			("=>", TokenKind::DoubleArrow),
			("==", TokenKind::Op),
			("!=", TokenKind::Op),
			("<>", TokenKind::Op),
			("<=", TokenKind::Op),
			(">=", TokenKind::Op),
			("&&", TokenKind::Op),
			("||", TokenKind::Op),
			("++", TokenKind::Op),
			("--", TokenKind::Op),
			("+=", TokenKind::Op),
			("-=", TokenKind::Op),
			("*=", TokenKind::Op),
			("/=", TokenKind::Op),
			(".=", TokenKind::Op),
			("%=", TokenKind::Op),
			("&=", TokenKind::Op),
			("|=", TokenKind::Op),
			("^=", TokenKind::Op),
			("<<", TokenKind::Op),
			(">>", TokenKind::Op),
			("**", TokenKind::Op),
			("??", TokenKind::Op),
		];

		for (text, kind) in MULTI {
			if self.starts_with(text) {
				self.pos += text.chars().count();

				if *kind == TokenKind::CloseTag {
					self.push(*kind, start);
					self.consume_inline_html();
				} else {
					self.push(*kind, start);
				}

				return;
			}
		}

		let kind = match self.chars[self.pos] {
			'{' => TokenKind::BraceOpen,
			'}' => TokenKind::BraceClose,
			'(' => TokenKind::ParenOpen,
			')' => TokenKind::ParenClose,
			'[' => TokenKind::BracketOpen,
			']' => TokenKind::BracketClose,
			';' => TokenKind::Semicolon,
			',' => TokenKind::Comma,
			'=' => TokenKind::Equals,
			':' => TokenKind::Colon,
			'?' => TokenKind::Question,
			'\\' => TokenKind::NsSeparator,
			'&' => TokenKind::Ampersand,
			_ => TokenKind::Op,
		};

		self.pos += 1;

		self.push(kind, start);
	}
}

fn is_ident_start(ch: char) -> bool {
	ch.is_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_ident_continue(ch: char) -> bool {
	is_ident_start(ch) || ch.is_ascii_digit()
}

/// PHP keywords are case-insensitive.
fn keyword_kind(text: &str) -> Option<TokenKind> {
	Some(match text.to_ascii_lowercase().as_str() {
		"abstract" => TokenKind::Abstract,
		"as" => TokenKind::As,
		"case" => TokenKind::Case,
		"catch" => TokenKind::Catch,
		"class" => TokenKind::Class,
		"const" => TokenKind::Const,
		"do" => TokenKind::Do,
		"else" => TokenKind::Else,
		"elseif" => TokenKind::ElseIf,
		"enum" => TokenKind::Enum,
		"extends" => TokenKind::Extends,
		"final" => TokenKind::Final,
		"finally" => TokenKind::Finally,
		"fn" => TokenKind::Fn,
		"for" => TokenKind::For,
		"foreach" => TokenKind::Foreach,
		"function" => TokenKind::Function,
		"if" => TokenKind::If,
		"implements" => TokenKind::Implements,
		"interface" => TokenKind::Interface,
		"namespace" => TokenKind::Namespace,
		"new" => TokenKind::New,
		"private" => TokenKind::Private,
		"protected" => TokenKind::Protected,
		"public" => TokenKind::Public,
		"readonly" => TokenKind::Readonly,
		"return" => TokenKind::Return,
		"static" => TokenKind::Static,
		"switch" => TokenKind::Switch,
		"trait" => TokenKind::Trait,
		"try" => TokenKind::Try,
		"use" => TokenKind::Use,
		"while" => TokenKind::While,
		_ => return None,
	})
}
