// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rendering syntax errors as annotated source excerpts.

use std::cmp::{max, min};

use annotate_snippets::{Level, Renderer, Snippet};
use schemagram_tree::SyntaxError;

/// Lines shown above and below the offending line.
const CONTEXT: usize = 1;

/// Render `error` against `source` as an annotated excerpt titled `label`.
///
/// `styled` selects ANSI colors. A zero-width span is widened to one
/// character so the caret has something to point at.
pub fn prettify_error(error: &SyntaxError, source: &str, label: &str, styled: bool) -> String {
    let line = error.span.line as usize;
    let line_start = max(1, line.saturating_sub(CONTEXT));
    let start_offset = bol_offset(source, line_start);
    let end_offset = max(start_offset, bol_offset(source, line + CONTEXT + 1));
    let excerpt = &source[start_offset..end_offset];

    let start = min(error.span.start as usize, end_offset) - start_offset;
    let end = min(error.span.end as usize, end_offset) - start_offset;
    let end = if start == end {
        min(end + 1, excerpt.len() + 1)
    } else {
        end
    };

    let message = format!("expected {}, found {}", error.expected, error.found);
    let renderer = if styled {
        Renderer::styled()
    } else {
        Renderer::plain()
    };
    let rendered = renderer
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(excerpt)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error.span(start..end).label(&message)]),
            ),
        )
        .to_string();
    rendered
}

/// Render every error in `errors`, separated by blank lines.
pub fn prettify_errors(errors: &[SyntaxError], source: &str, label: &str, styled: bool) -> String {
    errors
        .iter()
        .map(|error| prettify_error(error, source, label, styled))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Byte offset of the beginning of 1-based `line`, or the end of `source`
/// past the last line.
fn bol_offset(source: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth(line - 2)
        .map_or(source.len(), |(index, _)| index + 1)
}
