//! Verbatim regions outside fenced blocks: indented code and code spans.
//!
//! Inline map tags are never matched inside these.

use std::ops::Range;

fn in_any(ranges: &[Range<usize>], pos: usize) -> Option<&Range<usize>> {
    ranges.iter().find(|r| r.contains(&pos))
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_indented_code_line(line: &str) -> bool {
    !is_blank(line) && indent_width(line) >= 4
}

/// Bullet (`-`, `*`, `+`) or ordered (`1.`, `1)`) list marker.
fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    let rest = match trimmed.chars().next() {
        Some('-' | '*' | '+') => &trimmed[1..],
        Some(c) if c.is_ascii_digit() => {
            let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
            match trimmed[digits..].chars().next() {
                Some('.' | ')') => &trimmed[digits + 1..],
                _ => return false,
            }
        }
        _ => return false,
    };
    rest.is_empty() || rest.starts_with([' ', '\t', '\r', '\n'])
}

/// Indented code blocks at the top level of the document.
///
/// A block starts with a line indented by four or more columns that follows
/// a blank line (or the start of input), and is not list item continuation.
/// Blank lines belong to the block only if indented code follows them.
/// Ranges exclude the final line terminator. Lines inside `skip` (fenced
/// blocks) are never code here.
pub(crate) fn find_indented_code(content: &str, skip: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    let mut blocks = Vec::new();
    let mut prev_blank = true;
    let mut in_list = false;
    let mut pos = 0;

    while pos < lines.len() {
        let (start, line) = lines[pos];

        if in_any(skip, start).is_some() {
            prev_blank = false;
            pos += 1;
            continue;
        }
        if is_blank(line) {
            prev_blank = true;
            pos += 1;
            continue;
        }

        if is_indented_code_line(line) && prev_blank && !in_list {
            let mut last = pos;
            let mut next = pos + 1;
            while next < lines.len() {
                let (next_start, next_line) = lines[next];
                if in_any(skip, next_start).is_some() {
                    break;
                }
                if is_indented_code_line(next_line) {
                    last = next;
                    next += 1;
                } else if is_blank(next_line) {
                    next += 1;
                } else {
                    break;
                }
            }

            let (last_start, last_line) = lines[last];
            let end = last_start + last_line.trim_end_matches(['\r', '\n']).len();
            log::debug!("Indented code from byte {} to {}", start, end);
            blocks.push(start..end);

            prev_blank = false;
            pos = last + 1;
            continue;
        }

        if indent_width(line) < 4 {
            if is_list_item(line) {
                in_list = true;
            } else if prev_blank && indent_width(line) == 0 {
                in_list = false;
            }
        }
        prev_blank = false;
        pos += 1;
    }

    blocks
}

fn backtick_run(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..].iter().take_while(|&&b| b == b'`').count()
}

/// True when the line starting at `pos` is empty or whitespace only.
fn blank_line_at(bytes: &[u8], pos: usize) -> bool {
    bytes[pos..]
        .iter()
        .take_while(|&&b| b != b'\n')
        .all(|b| b.is_ascii_whitespace())
}

/// End of the backtick run closing a span opened with `run` backticks.
///
/// A span can't cross a blank line or enter a skipped region.
fn find_closing_run(bytes: &[u8], from: usize, run: usize, skip: &[Range<usize>]) -> Option<usize> {
    let mut pos = from;
    while pos < bytes.len() {
        if in_any(skip, pos).is_some() {
            return None;
        }
        match bytes[pos] {
            b'`' => {
                let closing = backtick_run(bytes, pos);
                if closing == run {
                    return Some(pos + closing);
                }
                pos += closing;
            }
            b'\n' if blank_line_at(bytes, pos + 1) => return None,
            _ => pos += 1,
        }
    }
    None
}

/// Inline code spans: a run of backticks closed by a run of equal length.
///
/// Unmatched runs are literal text. A backslash-escaped backtick never
/// opens a span. Regions in `skip` are not searched.
pub(crate) fn find_code_spans(content: &str, skip: &[Range<usize>]) -> Vec<Range<usize>> {
    let bytes = content.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if let Some(region) = in_any(skip, pos) {
            pos = region.end;
            continue;
        }
        match bytes[pos] {
            b'\\' => pos += 2,
            b'`' => {
                let run = backtick_run(bytes, pos);
                match find_closing_run(bytes, pos + run, run, skip) {
                    Some(end) => {
                        spans.push(pos..end);
                        pos = end;
                    }
                    None => pos += run,
                }
            }
            _ => pos += 1,
        }
    }

    spans
}
