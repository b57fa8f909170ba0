// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lexer output and the text cursor the lexers are written against.

use crate::error::ParseError;
use crate::grammar::{Grammar, TokenKind};
use crate::node::Node;
use crate::span::Span;

/// One token as produced by a lexer: kind, source slice and location.
///
/// Lexemes are `Copy` so `peg` grammars can run directly over a
/// `[Lexeme<'a, K>]` slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a, K> {
    pub kind: K,
    pub text: &'a str,
    pub span: Span,
}

impl<'a, K: TokenKind> Lexeme<'a, K> {
    pub fn new(kind: K, text: &'a str, span: Span) -> Self {
        Self { kind, text, span }
    }

    /// A terminal node for this token.
    pub fn terminal<G: Grammar<Token = K>>(self) -> Node<G> {
        Node::token(self.kind, self.span, self.text)
    }

    /// An error node for this token.
    pub fn error_terminal<G: Grammar<Token = K>>(self) -> Node<G> {
        Node::error_token(self.kind, self.span, self.text)
    }

    /// How a syntax error message refers to this token.
    pub fn describe(&self) -> String {
        if self.text.trim().is_empty() {
            self.kind.name().to_string()
        } else {
            format!("`{}`", self.text.escape_debug())
        }
    }
}

/// A position in the source: byte offset plus line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

/// Character cursor over source text that tracks line and column.
#[derive(Debug, Clone)]
pub struct TextCursor<'a> {
    text: &'a str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> TextCursor<'a> {
    /// A cursor at the start of `text`.
    ///
    /// Fails when offsets into `text` would not fit a [`Span`].
    pub fn new(text: &'a str) -> Result<Self, ParseError> {
        if u32::try_from(text.len()).is_err() {
            return Err(ParseError::InputTooLarge { len: text.len() });
        }
        Ok(Self {
            text,
            offset: 0,
            line: 1,
            column: 0,
        })
    }

    pub fn source(&self) -> &'a str {
        self.text
    }

    /// The unconsumed text.
    pub fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character `n` positions ahead (`peek_nth(0) == peek()`).
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consume one character, keeping line and column current.
    ///
    /// `\r\n`, `\n` and a lone `\r` each end a line.
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        match ch {
            '\n' => self.new_line(),
            '\r' if self.peek() != Some('\n') => self.new_line(),
            '\r' => {}
            _ => self.column += 1,
        }
        Some(ch)
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    /// Consume `expected` if it is next.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `prefix` if the remaining text starts with it.
    pub fn eat_str(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            for _ in prefix.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds; returns how many.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
            count += 1;
        }
        count
    }

    pub fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Text consumed since `mark`.
    pub fn slice_from(&self, mark: Mark) -> &'a str {
        &self.text[mark.offset..self.offset]
    }

    /// Span from `mark` to the current position.
    pub fn span_from(&self, mark: Mark) -> Span {
        // Lengths were checked against u32 in `new`.
        Span::new(
            mark.offset as u32,
            self.offset as u32,
            mark.line,
            mark.column,
        )
    }

    /// A zero-width span at the current position.
    pub fn here(&self) -> Span {
        self.span_from(self.mark())
    }

    /// A lexeme of `kind` covering everything consumed since `mark`.
    pub fn lexeme<K: TokenKind>(&self, kind: K, mark: Mark) -> Lexeme<'a, K> {
        Lexeme::new(kind, self.slice_from(mark), self.span_from(mark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_tracks_lines_and_columns() {
        let mut cursor = TextCursor::new("ab\r\ncé\rd").unwrap();
        cursor.eat_while(|c| c.is_ascii_alphabetic());
        assert_eq!((cursor.mark().line, cursor.mark().column), (1, 2));
        assert!(cursor.eat_str("\r\n"));
        assert_eq!((cursor.mark().line, cursor.mark().column), (2, 0));
        let start = cursor.mark();
        cursor.bump();
        cursor.bump();
        assert_eq!(cursor.slice_from(start), "cé");
        assert_eq!(cursor.span_from(start), Span::new(4, 7, 2, 0));
        cursor.bump();
        assert_eq!((cursor.mark().line, cursor.mark().column), (3, 0));
        assert_eq!(cursor.peek(), Some('d'));
        cursor.bump();
        assert!(cursor.is_eof());
        assert_eq!(cursor.bump(), None);
    }
}
