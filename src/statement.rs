//! Pick the lines to run out of a do-file being edited.
//!
//! A statement spans several lines when they end with `///`. Whether we run
//! the statement under the cursor, everything up to it or everything from it,
//! such a statement is never cut in half.
//!
//! Rows are 1-based, like the line numbers of an editor.

use log::debug;
use std::fmt;

/// Marker at the end of a line continued on the next one
const CONTINUATION: &str = "///";

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RowError {
    OutOfRange { row: usize, lines: usize },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RowError::OutOfRange { row, lines } => {
                write!(f, "row {} is outside of the file ({} lines)", row, lines)
            }
        }
    }
}

/// The statement `row` is part of, with all its continuation lines.
pub fn statement_at_row(source: &str, row: usize) -> Result<String, RowError> {
    let lines = split_lines(source);
    let start = statement_start(&lines, row)?;
    let end = statement_end(&lines, row)?;

    Ok(join(&lines, start, end))
}

/// From the first line of the file to the end of the statement at `row`.
pub fn lines_up_to_row(source: &str, row: usize) -> Result<String, RowError> {
    let lines = split_lines(source);
    let end = statement_end(&lines, row)?;

    Ok(join(&lines, 1, end))
}

/// From the start of the statement at `row` to the last line of the file.
pub fn lines_from_row(source: &str, row: usize) -> Result<String, RowError> {
    let lines = split_lines(source);
    let start = statement_start(&lines, row)?;

    Ok(join(&lines, start, lines.len()))
}

fn check_row(lines: &[&str], row: usize) -> Result<(), RowError> {
    if row == 0 || row > lines.len() {
        return Err(RowError::OutOfRange {
            row,
            lines: lines.len(),
        });
    }

    Ok(())
}

/// Walk up while the previous line is continued
fn statement_start(lines: &[&str], row: usize) -> Result<usize, RowError> {
    check_row(lines, row)?;

    let mut start = row;
    while start > 1 && is_continued(lines[start - 2]) {
        start -= 1;
    }

    debug!("statement at row {} starts at {}", row, start);
    Ok(start)
}

/// Walk down while the current line is continued
fn statement_end(lines: &[&str], row: usize) -> Result<usize, RowError> {
    check_row(lines, row)?;

    let mut end = row;
    while end < lines.len() && is_continued(lines[end - 1]) {
        end += 1;
    }

    debug!("statement at row {} ends at {}", row, end);
    Ok(end)
}

fn is_continued(line: &str) -> bool {
    line.trim_end().ends_with(CONTINUATION)
}

/// Lines `start` to `end`, both included
fn join(lines: &[&str], start: usize, end: usize) -> String {
    lines[start - 1..end].join("\n")
}

/// Split on `\n`, `\r\n` and lone `\r`. A terminator at the very end doesn't
/// start another line.
fn split_lines(source: &str) -> Vec<&str> {
    let mut lines = vec![];
    let mut rest = source;

    while !rest.is_empty() {
        match rest.find(|c: char| c == '\n' || c == '\r') {
            Some(end) => {
                lines.push(&rest[..end]);
                let width = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + width..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}
