// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! GenericSql lexer.
//!
//! Keywords are case-insensitive. Numbers are not tokens of their own: each
//! decimal digit is a `DIGIT` and the `numeric` rule gathers them. Whitespace,
//! `--` line comments and `/* */` block comments are skipped.
//!
//! A character that cannot start a token is skipped and reported, so lexing
//! always runs to the end of the input. The token stream always ends with
//! `EOF`.

use schemagram_tree::{Lexeme, Mark, ParseError, Recovery, SyntaxError, TextCursor};

use crate::kinds::SqlToken;

/// A GenericSql token.
pub type SqlLexeme<'a> = Lexeme<'a, SqlToken>;

/// Split `text` into tokens, ending with `EOF`.
///
/// Returns the tokens and the errors for characters that were skipped.
pub fn tokenize(text: &str) -> Result<(Vec<SqlLexeme<'_>>, Vec<SyntaxError>), ParseError> {
    let lexer = SqlLexer {
        cursor: TextCursor::new(text)?,
        lexemes: Vec::new(),
        errors: Vec::new(),
    };
    Ok(lexer.run())
}

struct SqlLexer<'a> {
    cursor: TextCursor<'a>,
    lexemes: Vec<SqlLexeme<'a>>,
    errors: Vec<SyntaxError>,
}

impl<'a> SqlLexer<'a> {
    fn run(mut self) -> (Vec<SqlLexeme<'a>>, Vec<SyntaxError>) {
        loop {
            self.skip_trivia();
            let start = self.cursor.mark();
            let Some(ch) = self.cursor.peek() else {
                break;
            };
            match self.next_kind(ch) {
                Some(kind) => {
                    let lexeme = self.cursor.lexeme(kind, start);
                    self.lexemes.push(lexeme);
                }
                // Only the offending character is dropped.
                None => self.skip_character(start),
            }
        }
        let eof = SqlLexeme::new(SqlToken::Eof, "", self.cursor.here());
        self.lexemes.push(eof);
        tracing::debug!(
            tokens = self.lexemes.len(),
            skipped = self.errors.len(),
            "lexed GenericSql input"
        );
        (self.lexemes, self.errors)
    }

    /// Consume one token starting with `ch` and return its kind, or consume
    /// nothing and return `None` when no token starts here.
    fn next_kind(&mut self, ch: char) -> Option<SqlToken> {
        let kind = match ch {
            '(' => self.single(SqlToken::LParen),
            ')' => self.single(SqlToken::RParen),
            ',' => self.single(SqlToken::Comma),
            '.' => self.single(SqlToken::Dot),
            '*' => self.single(SqlToken::Asterisk),
            '=' => self.single(SqlToken::Equals),
            '?' => self.single(SqlToken::ParamPlaceholder),
            '<' => {
                self.cursor.bump();
                if self.cursor.eat('=') {
                    SqlToken::Lte
                } else if self.cursor.eat('>') {
                    SqlToken::NotEquals
                } else {
                    SqlToken::Lt
                }
            }
            '>' => {
                self.cursor.bump();
                if self.cursor.eat('=') {
                    SqlToken::Gte
                } else {
                    SqlToken::Gt
                }
            }
            '!' if self.cursor.peek_nth(1) == Some('=') => {
                self.cursor.eat_str("!=");
                SqlToken::NotEquals
            }
            '$' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.cursor.bump();
                self.cursor.eat_while(|c| c.is_ascii_digit());
                self.cursor.eat('$');
                SqlToken::IndexedParam
            }
            '\'' => return self.quoted('\'', SqlToken::String),
            '"' => return self.quoted('"', SqlToken::QuotedId),
            '`' => return self.quoted('`', SqlToken::QuotedId),
            c if c.is_ascii_digit() => self.single(SqlToken::Digit),
            c if is_id_start(c) => {
                let start = self.cursor.mark();
                self.cursor.eat_while(is_id_continue);
                SqlToken::keyword(self.cursor.slice_from(start)).unwrap_or(SqlToken::Id)
            }
            _ => return None,
        };
        Some(kind)
    }

    fn single(&mut self, kind: SqlToken) -> SqlToken {
        self.cursor.bump();
        kind
    }

    /// A literal delimited by `quote`, where a doubled quote stands for one
    /// quote. `'` strings also accept backslash escapes.
    ///
    /// An unterminated literal consumes nothing.
    fn quoted(&mut self, quote: char, kind: SqlToken) -> Option<SqlToken> {
        let saved = self.cursor.clone();
        self.cursor.bump();
        loop {
            match self.cursor.bump() {
                None => {
                    self.cursor = saved;
                    return None;
                }
                Some('\\') if quote == '\'' => {
                    self.cursor.bump();
                }
                Some(c) if c == quote => {
                    if !self.cursor.eat(quote) {
                        return Some(kind);
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn skip_character(&mut self, start: Mark) {
        let ch = self.cursor.bump().unwrap_or_default();
        let expected = match ch {
            '\'' | '"' | '`' => format!("closing {ch}"),
            _ => "a token".to_string(),
        };
        let error = SyntaxError::new(
            self.cursor.span_from(start),
            expected,
            format!("`{}`", ch.escape_debug()),
            Recovery::SkippedCharacter,
        );
        tracing::warn!(%error, "skipped character");
        self.errors.push(error);
    }

    fn skip_trivia(&mut self) {
        loop {
            if self.cursor.eat_while(char::is_whitespace) > 0 {
                continue;
            }
            if self.cursor.starts_with("--") {
                self.cursor.eat_while(|c| c != '\n' && c != '\r');
                continue;
            }
            if self.cursor.starts_with("/*") {
                let start = self.cursor.mark();
                self.cursor.eat_str("/*");
                let closed = loop {
                    if self.cursor.eat_str("*/") {
                        break true;
                    }
                    if self.cursor.bump().is_none() {
                        break false;
                    }
                };
                if !closed {
                    self.errors.push(SyntaxError::new(
                        self.cursor.span_from(start),
                        "`*/`",
                        "end of input",
                        Recovery::SkippedCharacter,
                    ));
                }
                continue;
            }
            return;
        }
    }
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_id_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(SqlToken, &str)> {
        let (lexemes, errors) = tokenize(text).unwrap();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        lexemes.into_iter().map(|l| (l.kind, l.text)).collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("select A from t WhErE x"),
            vec![
                (SqlToken::Select, "select"),
                (SqlToken::Id, "A"),
                (SqlToken::From, "from"),
                (SqlToken::Id, "t"),
                (SqlToken::Where, "WhErE"),
                (SqlToken::Id, "x"),
                (SqlToken::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_digits_are_single_tokens() {
        assert_eq!(
            kinds("12.5"),
            vec![
                (SqlToken::Digit, "1"),
                (SqlToken::Digit, "2"),
                (SqlToken::Dot, "."),
                (SqlToken::Digit, "5"),
                (SqlToken::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_operators() {
        let ops: Vec<SqlToken> = kinds("< <= > >= = <> !=").into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            ops,
            vec![
                SqlToken::Lt,
                SqlToken::Lte,
                SqlToken::Gt,
                SqlToken::Gte,
                SqlToken::Equals,
                SqlToken::NotEquals,
                SqlToken::NotEquals,
                SqlToken::Eof,
            ]
        );
    }

    #[test]
    fn test_literals_params_and_comments() {
        assert_eq!(
            kinds("'it''s' \"Col\" `x y` $1$ $22 ? -- note\n/* block */ $name"),
            vec![
                (SqlToken::String, "'it''s'"),
                (SqlToken::QuotedId, "\"Col\""),
                (SqlToken::QuotedId, "`x y`"),
                (SqlToken::IndexedParam, "$1$"),
                (SqlToken::IndexedParam, "$22"),
                (SqlToken::ParamPlaceholder, "?"),
                (SqlToken::Id, "$name"),
                (SqlToken::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_skipped_and_reported() {
        let (lexemes, errors) = tokenize("a # b").unwrap();
        let texts: Vec<&str> = lexemes.iter().map(|l| l.text).collect();
        assert_eq!(texts, ["a", "b", ""]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].recovery, Recovery::SkippedCharacter);
        assert_eq!(errors[0].span.range(), 2..3);
        assert_eq!(errors[0].found, "`#`");
    }

    #[test]
    fn test_unterminated_string_skips_only_the_quote() {
        let (lexemes, errors) = tokenize("'abc").unwrap();
        let kinds: Vec<SqlToken> = lexemes.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, [SqlToken::Id, SqlToken::Eof]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].expected, "closing '");
    }

    #[test]
    fn test_spans_track_lines() {
        let (lexemes, _) = tokenize("SELECT\n  a").unwrap();
        assert_eq!((lexemes[1].span.line, lexemes[1].span.column), (2, 2));
        assert_eq!(lexemes[1].span.range(), 9..10);
    }
}
