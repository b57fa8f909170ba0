// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Python3Subset lexer.
//!
//! Besides ordinary tokens the lexer produces the layout tokens the grammar
//! is written against:
//!
//! - `NEWLINE` at the end of every logical line that holds a token. Blank
//!   lines, comment-only lines and line breaks inside `()`, `[]` or `{}` are
//!   skipped, and a backslash at the end of a line joins it with the next.
//! - `INDENT` when a logical line is indented deeper than the one before,
//!   `DEDENT` for each level it closes. A tab advances to the next multiple
//!   of eight columns.
//! - At the end of input, a `NEWLINE` if the last line lacked one, a
//!   `DEDENT` for every open level, then `EOF`.
//!
//! Template strings (`f'...'` and friends) are lexed in their own mode: a
//! start token, literal atoms, `{` holes lexed as ordinary code up to the
//! matching `TEMPLATE_CLOSE_BRACE`, and an end token. `{{` and `}}` are
//! literal braces.
//!
//! A character that cannot start a token, including the opening quote of an
//! unterminated string, is skipped and reported.

use schemagram_tree::{Lexeme, Mark, ParseError, Recovery, SyntaxError, TextCursor};

use crate::kinds::PyToken;

/// A Python3Subset token.
pub type PyLexeme<'a> = Lexeme<'a, PyToken>;

/// Columns a tab advances indentation to a multiple of.
const TAB_STOP: usize = 8;

/// Split `text` into tokens, ending with `EOF`.
///
/// Returns the tokens and the errors for characters that were skipped.
pub fn tokenize(text: &str) -> Result<(Vec<PyLexeme<'_>>, Vec<SyntaxError>), ParseError> {
    let lexer = PyLexer {
        cursor: TextCursor::new(text)?,
        lexemes: Vec::new(),
        errors: Vec::new(),
        indents: Vec::new(),
        opened: 0,
        frames: Vec::new(),
        line_has_tokens: false,
    };
    Ok(lexer.run())
}

/// Quoting of a template string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Template {
    double: bool,
    long: bool,
    raw: bool,
}

impl Template {
    fn delimiter(self) -> &'static str {
        match (self.double, self.long) {
            (false, false) => "'",
            (false, true) => "'''",
            (true, false) => "\"",
            (true, true) => "\"\"\"",
        }
    }

    fn start(self) -> PyToken {
        match (self.double, self.long) {
            (false, false) => PyToken::SingleQuoteShortTemplateStart,
            (false, true) => PyToken::SingleQuoteLongTemplateStart,
            (true, false) => PyToken::DoubleQuoteShortTemplateStart,
            (true, true) => PyToken::DoubleQuoteLongTemplateStart,
        }
    }

    fn end(self) -> PyToken {
        match (self.double, self.long) {
            (false, false) => PyToken::SingleQuoteShortTemplateEnd,
            (false, true) => PyToken::SingleQuoteLongTemplateEnd,
            (true, false) => PyToken::DoubleQuoteShortTemplateEnd,
            (true, true) => PyToken::DoubleQuoteLongTemplateEnd,
        }
    }

    fn atom(self) -> PyToken {
        if self.double {
            PyToken::DoubleQuoteStringAtom
        } else {
            PyToken::SingleQuoteStringAtom
        }
    }
}

/// What an open `{` (or an open template) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// A dict or set display.
    Brace,
    /// A `{expr}` hole of a template.
    Hole,
    /// The literal part of a template.
    Template(Template),
}

struct PyLexer<'a> {
    cursor: TextCursor<'a>,
    lexemes: Vec<PyLexeme<'a>>,
    errors: Vec<SyntaxError>,
    /// Indentation widths of the open blocks, innermost last.
    indents: Vec<usize>,
    /// Open `(`, `[`, `{` and template holes.
    opened: usize,
    frames: Vec<Frame>,
    /// Whether the current logical line has produced a token.
    line_has_tokens: bool,
}

impl<'a> PyLexer<'a> {
    fn run(mut self) -> (Vec<PyLexeme<'a>>, Vec<SyntaxError>) {
        self.indentation();
        while let Some(ch) = self.cursor.peek() {
            match self.frames.last() {
                Some(Frame::Template(template)) => {
                    let template = *template;
                    self.template_part(template);
                }
                _ => self.code(ch),
            }
        }
        self.finish();
        tracing::debug!(
            tokens = self.lexemes.len(),
            skipped = self.errors.len(),
            "lexed Python3Subset input"
        );
        (self.lexemes, self.errors)
    }

    fn push(&mut self, kind: PyToken, start: Mark) {
        let lexeme = self.cursor.lexeme(kind, start);
        self.lexemes.push(lexeme);
        if !kind.is_layout() {
            self.line_has_tokens = true;
        }
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    /// Measure the indentation of the line starting at the cursor and emit
    /// `INDENT` or `DEDENT`s. Blank and comment-only lines change nothing.
    fn indentation(&mut self) {
        let start = self.cursor.mark();
        let mut width = 0;
        self.cursor.eat_while(|c| match c {
            ' ' => {
                width += 1;
                true
            }
            '\t' => {
                width += TAB_STOP - width % TAB_STOP;
                true
            }
            '\x0c' => {
                width = 0;
                true
            }
            _ => false,
        });
        if matches!(self.cursor.peek(), None | Some('\n' | '\r' | '#')) {
            return;
        }

        let previous = self.indents.last().copied().unwrap_or(0);
        if width > previous {
            self.indents.push(width);
            self.push(PyToken::Indent, start);
        } else {
            let here = self.cursor.mark();
            while self.indents.last().is_some_and(|&open| open > width) {
                self.indents.pop();
                self.push(PyToken::Dedent, here);
            }
        }
    }

    /// A line break in code.
    fn line_break(&mut self) {
        let start = self.cursor.mark();
        if !self.cursor.eat_str("\r\n") {
            self.cursor.bump();
        }
        if self.opened > 0 {
            return;
        }
        if self.line_has_tokens {
            self.push(PyToken::Newline, start);
            self.line_has_tokens = false;
        }
        self.indentation();
    }

    fn finish(&mut self) {
        if let Some(Frame::Template(_) | Frame::Hole) = self.frames.last() {
            tracing::debug!("input ends inside a template string");
        }
        let here = self.cursor.mark();
        if self.line_has_tokens {
            self.push(PyToken::Newline, here);
            self.line_has_tokens = false;
        }
        for _ in self.indents.drain(..) {
            self.lexemes
                .push(PyLexeme::new(PyToken::Dedent, "", self.cursor.here()));
        }
        self.lexemes
            .push(PyLexeme::new(PyToken::Eof, "", self.cursor.here()));
    }

    // ------------------------------------------------------------------------
    // Code
    // ------------------------------------------------------------------------

    fn code(&mut self, ch: char) {
        let start = self.cursor.mark();
        match ch {
            ' ' | '\t' | '\x0c' => {
                self.cursor.bump();
            }
            '#' => {
                self.cursor.eat_while(|c| c != '\n' && c != '\r');
            }
            '\n' | '\r' => self.line_break(),
            '\\' if matches!(self.cursor.peek_nth(1), Some('\n' | '\r')) => {
                self.cursor.bump();
                if !self.cursor.eat_str("\r\n") {
                    self.cursor.bump();
                }
            }
            '\'' | '"' => {
                if !self.string_or_template(start, 0) {
                    self.skip_character(start);
                }
            }
            c if c.is_ascii_digit() => self.number(start),
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.number(start)
            }
            c if is_id_start(c) => {
                if let Some(prefix) = string_prefix(self.cursor.rest()) {
                    if self.string_or_template(start, prefix) {
                        return;
                    }
                }
                self.cursor.eat_while(is_id_continue);
                let kind = PyToken::keyword(self.cursor.slice_from(start)).unwrap_or(PyToken::Name);
                self.push(kind, start);
            }
            '}' if self.frames.last() == Some(&Frame::Hole) => {
                self.cursor.bump();
                self.opened = self.opened.saturating_sub(1);
                self.frames.pop();
                self.push(PyToken::TemplateCloseBrace, start);
            }
            _ => match self.operator() {
                Some(kind) => {
                    self.track_brackets(kind);
                    self.push(kind, start);
                }
                None => self.skip_character(start),
            },
        }
    }

    fn operator(&mut self) -> Option<PyToken> {
        let (spelling, kind) = PyToken::OPERATORS
            .iter()
            .find(|(spelling, _)| self.cursor.starts_with(spelling))?;
        self.cursor.eat_str(spelling);
        Some(*kind)
    }

    /// Keep the bracket depth and brace frames current.
    fn track_brackets(&mut self, kind: PyToken) {
        match kind {
            PyToken::OpenParen | PyToken::OpenBrack => self.opened += 1,
            PyToken::CloseParen | PyToken::CloseBrack => {
                self.opened = self.opened.saturating_sub(1);
            }
            PyToken::OpenBrace => {
                self.opened += 1;
                self.frames.push(Frame::Brace);
            }
            PyToken::CloseBrace => {
                self.opened = self.opened.saturating_sub(1);
                if self.frames.last() == Some(&Frame::Brace) {
                    self.frames.pop();
                }
            }
            _ => {}
        }
    }

    fn number(&mut self, start: Mark) {
        let radix = ["0x", "0X", "0o", "0O", "0b", "0B"]
            .iter()
            .any(|prefix| self.cursor.starts_with(prefix));
        if radix {
            self.cursor.bump();
            self.cursor.bump();
            self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.cursor.eat_while(is_digit);
            if self.cursor.eat('.') {
                self.cursor.eat_while(is_digit);
            }
            let exponent = matches!(self.cursor.peek(), Some('e' | 'E'))
                && match self.cursor.peek_nth(1) {
                    Some('+' | '-') => self.cursor.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                    next => next.is_some_and(|c| c.is_ascii_digit()),
                };
            if exponent {
                self.cursor.bump();
                if !self.cursor.eat('+') {
                    self.cursor.eat('-');
                }
                self.cursor.eat_while(is_digit);
            }
            if !self.cursor.eat('j') {
                self.cursor.eat('J');
            }
        }
        self.push(PyToken::Number, start);
    }

    /// Lex a string, bytes or template literal whose prefix is `prefix`
    /// bytes long. Returns `false`, consuming nothing, when the literal is
    /// unterminated.
    fn string_or_template(&mut self, start: Mark, prefix: usize) -> bool {
        let rest = self.cursor.rest();
        let flags = rest[..prefix].to_ascii_lowercase();
        let body = &rest[prefix..];
        let double = body.starts_with('"');
        let long = body.starts_with("'''") || body.starts_with("\"\"\"");
        let template = Template {
            double,
            long,
            raw: flags.contains('r'),
        };
        let delimiter = template.delimiter();
        let Some(end) = literal_end(&body[delimiter.len()..], delimiter, long) else {
            return false;
        };

        if flags.contains('f') {
            self.advance_to(start.offset + prefix + delimiter.len());
            self.push(template.start(), start);
            self.frames.push(Frame::Template(template));
        } else {
            self.advance_to(start.offset + prefix + delimiter.len() + end);
            self.push(PyToken::String, start);
        }
        true
    }

    fn advance_to(&mut self, offset: usize) {
        while self.cursor.mark().offset < offset {
            if self.cursor.bump().is_none() {
                break;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------------

    /// One token of a template's literal part.
    fn template_part(&mut self, template: Template) {
        let start = self.cursor.mark();
        if self.cursor.eat_str(template.delimiter()) {
            self.frames.pop();
            self.push(template.end(), start);
            return;
        }
        if self.cursor.peek() == Some('{') && self.cursor.peek_nth(1) != Some('{') {
            self.cursor.bump();
            self.opened += 1;
            self.frames.push(Frame::Hole);
            self.push(PyToken::OpenBrace, start);
            return;
        }

        while let Some(ch) = self.cursor.peek() {
            if self.cursor.starts_with(template.delimiter()) {
                break;
            }
            match ch {
                '{' | '}' if self.cursor.peek_nth(1) == Some(ch) => {
                    self.cursor.bump();
                    self.cursor.bump();
                }
                '{' => break,
                '\\' if !template.raw => {
                    self.cursor.bump();
                    self.cursor.bump();
                }
                '\n' | '\r' if !template.long => break,
                _ => {
                    self.cursor.bump();
                }
            }
        }

        if self.cursor.mark().offset > start.offset {
            self.push(template.atom(), start);
        } else {
            // A line break inside a short template: leave template mode and
            // let the parser report the missing end.
            tracing::debug!(span = %self.cursor.here(), "unterminated template string");
            self.frames.pop();
        }
    }

    fn skip_character(&mut self, start: Mark) {
        let ch = self.cursor.bump().unwrap_or_default();
        let expected = match ch {
            '\'' | '"' => format!("closing {ch}"),
            '\\' => "a line break after `\\`".to_string(),
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
}

fn is_id_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_id_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || c == '_'
}

/// Length of the literal prefix (`r`, `b`, `f`, `rb`, ...) at the start of
/// `rest`, if a quote follows it.
fn string_prefix(rest: &str) -> Option<usize> {
    let len = rest.bytes().take_while(u8::is_ascii_alphabetic).take(3).count();
    if !rest[len..].starts_with(['\'', '"']) {
        return None;
    }
    let prefix = rest[..len].to_ascii_lowercase();
    matches!(
        prefix.as_str(),
        "r" | "u" | "b" | "br" | "rb" | "f" | "fr" | "rf"
    )
    .then_some(len)
}

/// Byte offset just past the closing `delimiter` in `body`, the text after
/// the opening delimiter. Short literals end at a line break.
fn literal_end(body: &str, delimiter: &str, long: bool) -> Option<usize> {
    let mut chars = body.char_indices();
    while let Some((at, ch)) = chars.next() {
        if body[at..].starts_with(delimiter) {
            return Some(at + delimiter.len());
        }
        match ch {
            '\\' => {
                chars.next();
            }
            '\n' | '\r' if !long => return None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagram_tree::TokenKind;

    fn kinds(text: &str) -> Vec<&'static str> {
        let (lexemes, errors) = tokenize(text).unwrap();
        assert!(errors.is_empty(), "{errors:?}");
        lexemes.iter().map(|lexeme| lexeme.kind.name()).collect()
    }

    fn texts(text: &str) -> Vec<String> {
        let (lexemes, _) = tokenize(text).unwrap();
        lexemes.iter().map(|lexeme| lexeme.text.to_string()).collect()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(
            kinds("x = 1\n"),
            ["NAME", "'='", "NUMBER", "NEWLINE", "EOF"]
        );
    }

    #[test]
    fn test_missing_final_newline_is_added() {
        assert_eq!(kinds("x"), ["NAME", "NEWLINE", "EOF"]);
        let (lexemes, _) = tokenize("x").unwrap();
        assert_eq!(lexemes[1].span.range(), 1..1);
        assert_eq!(kinds(""), ["EOF"]);
        assert_eq!(kinds("\n\n# only a comment\n"), ["EOF"]);
    }

    #[test]
    fn test_indent_and_dedent() {
        assert_eq!(
            kinds("if x:\n    y\nz\n"),
            [
                "'if'", "NAME", "':'", "NEWLINE", "INDENT", "NAME", "NEWLINE", "DEDENT", "NAME",
                "NEWLINE", "EOF",
            ]
        );
    }

    #[test]
    fn test_dedents_at_end_of_input() {
        assert_eq!(
            kinds("def f():\n  if x:\n    return 1"),
            [
                "'def'", "NAME", "'('", "')'", "':'", "NEWLINE", "INDENT", "'if'", "NAME", "':'",
                "NEWLINE", "INDENT", "'return'", "NUMBER", "NEWLINE", "DEDENT", "DEDENT", "EOF",
            ]
        );
    }

    #[test]
    fn test_tabs_advance_to_multiples_of_eight() {
        // A tab and eight spaces are the same level, so no DEDENT or INDENT
        // separates the two statements.
        assert_eq!(
            kinds("if x:\n\ta\n        b\n"),
            [
                "'if'", "NAME", "':'", "NEWLINE", "INDENT", "NAME", "NEWLINE", "NAME", "NEWLINE",
                "DEDENT", "EOF",
            ]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_do_not_change_indentation() {
        assert_eq!(
            kinds("if x:\n  a\n\n      # note\n  b\n"),
            [
                "'if'", "NAME", "':'", "NEWLINE", "INDENT", "NAME", "NEWLINE", "NAME", "NEWLINE",
                "DEDENT", "EOF",
            ]
        );
    }

    #[test]
    fn test_line_breaks_inside_brackets_are_skipped() {
        assert_eq!(
            kinds("f(a,\n  b)\nd = {\n 1: [2,\n3]}\n"),
            [
                "NAME", "'('", "NAME", "','", "NAME", "')'", "NEWLINE", "NAME", "'='", "'{'",
                "NUMBER", "':'", "'['", "NUMBER", "','", "NUMBER", "']'", "'}'", "NEWLINE", "EOF",
            ]
        );
    }

    #[test]
    fn test_backslash_joins_lines() {
        assert_eq!(
            kinds("x = 1 + \\\n    2\n"),
            ["NAME", "'='", "NUMBER", "'+'", "NUMBER", "NEWLINE", "EOF"]
        );
    }

    #[test]
    fn test_operators_take_the_longest_match() {
        assert_eq!(
            texts("a **= b // c ... -> <> != <<= @"),
            ["a", "**=", "b", "//", "c", "...", "->", "<>", "!=", "<<=", "@", "", ""]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            texts("1 1_000 0x1F 0o17 0b101 1.5 .5 1. 1e10 2.5E-3 3j"),
            [
                "1", "1_000", "0x1F", "0o17", "0b101", "1.5", ".5", "1.", "1e10", "2.5E-3", "3j", "",
                "",
            ]
        );
    }

    #[test]
    fn test_strings_and_prefixes() {
        let text = r#"'a' "b\"c" r'\d' b"x" '''long
text''' Rb'y'"#;
        let (lexemes, errors) = tokenize(text).unwrap();
        assert!(errors.is_empty());
        let strings: Vec<&str> = lexemes
            .iter()
            .filter(|lexeme| lexeme.kind == PyToken::String)
            .map(|lexeme| lexeme.text)
            .collect();
        assert_eq!(
            strings,
            ["'a'", r#""b\"c""#, r"r'\d'", r#"b"x""#, "'''long\ntext'''", "Rb'y'"]
        );
        // The line break inside the long string is not a NEWLINE.
        assert_eq!(
            lexemes.iter().filter(|l| l.kind == PyToken::Newline).count(),
            1
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("None none True if If"),
            ["'None'", "NAME", "'True'", "'if'", "NAME", "NEWLINE", "EOF"]
        );
    }

    #[test]
    fn test_template_string() {
        assert_eq!(
            kinds("f'a{x}b{{c}}'"),
            [
                "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_START",
                "SINGLE_QUOTE_STRING_ATOM",
                "'{'",
                "NAME",
                "TEMPLATE_CLOSE_BRACE",
                "SINGLE_QUOTE_STRING_ATOM",
                "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_END",
                "NEWLINE",
                "EOF",
            ]
        );
        assert_eq!(
            texts("F\"{a['k']}\""),
            ["F\"", "{", "a", "[", "'k'", "]", "}", "\"", "", ""]
        );
    }

    #[test]
    fn test_template_holes_nest_dicts_and_templates() {
        assert_eq!(
            kinds("f\"\"\"{ {1: f'{y}'}[1] }\"\"\""),
            [
                "DOUBLE_QUOTE_LONG_TEMPLATE_STRING_START",
                "'{'",
                "'{'",
                "NUMBER",
                "':'",
                "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_START",
                "'{'",
                "NAME",
                "TEMPLATE_CLOSE_BRACE",
                "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_END",
                "'}'",
                "'['",
                "NUMBER",
                "']'",
                "TEMPLATE_CLOSE_BRACE",
                "DOUBLE_QUOTE_LONG_TEMPLATE_STRING_END",
                "NEWLINE",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_closed_hole_restores_line_structure() {
        // After the template the bracket depth is back to zero, so the line
        // break ends the statement.
        assert_eq!(
            kinds("a = f'{b}'\nc\n"),
            [
                "NAME",
                "'='",
                "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_START",
                "'{'",
                "NAME",
                "TEMPLATE_CLOSE_BRACE",
                "SINGLE_QUOTE_SHORT_TEMPLATE_STRING_END",
                "NEWLINE",
                "NAME",
                "NEWLINE",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let (lexemes, errors) = tokenize("a $ b\n").unwrap();
        let kinds: Vec<PyToken> = lexemes.iter().map(|lexeme| lexeme.kind).collect();
        assert_eq!(
            kinds,
            [PyToken::Name, PyToken::Name, PyToken::Newline, PyToken::Eof]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.range(), 2..3);
        assert_eq!(errors[0].found, "`$`");
        assert_eq!(errors[0].recovery, Recovery::SkippedCharacter);
    }

    #[test]
    fn test_unterminated_string_skips_the_quote() {
        let (lexemes, errors) = tokenize("x = 'abc\n").unwrap();
        let kinds: Vec<PyToken> = lexemes.iter().map(|lexeme| lexeme.kind).collect();
        assert_eq!(
            kinds,
            [
                PyToken::Name,
                PyToken::Assign,
                PyToken::Name,
                PyToken::Newline,
                PyToken::Eof
            ]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].expected, "closing '");
    }

    #[test]
    fn test_positions() {
        let (lexemes, _) = tokenize("if a:\n    bb\n").unwrap();
        let bb = lexemes.iter().find(|lexeme| lexeme.text == "bb").unwrap();
        assert_eq!((bb.span.line, bb.span.column), (2, 4));
        assert_eq!(bb.span.range(), 10..12);
        let indent = lexemes
            .iter()
            .find(|lexeme| lexeme.kind == PyToken::Indent)
            .unwrap();
        assert_eq!(indent.text, "    ");
    }
}
