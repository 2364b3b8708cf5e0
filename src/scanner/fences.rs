//! Fenced code block detection.
//!
//! Every fenced block is located, whatever its language: map blocks become
//! declarations, and all blocks are regions where inline tags are ignored.

use std::borrow::Cow;
use std::ops::Range;

pub(crate) fn strip_leading_spaces(line: &str) -> &str {
    line.strip_prefix("   ")
        .or_else(|| line.strip_prefix("  "))
        .or_else(|| line.strip_prefix(" "))
        .unwrap_or(line)
}

/// Strip a trailing LF or CRLF.
fn strip_newline(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FenceInfo {
    pub fence_char: char,
    pub fence_count: usize,
    pub indent: usize,
    pub info_string: String,
}

impl FenceInfo {
    /// First word of the info string, with `{.lang}` / `{lang}` unwrapped.
    pub(crate) fn language(&self) -> Option<&str> {
        let info = self.info_string.trim();
        let info = info.strip_prefix('{').unwrap_or(info);
        let info = info.strip_prefix('.').unwrap_or(info);
        info.split(|c: char| c.is_whitespace() || c == '}' || c == ',')
            .next()
            .filter(|lang| !lang.is_empty())
    }
}

pub(crate) fn try_parse_fence_open(line: &str) -> Option<FenceInfo> {
    let content = strip_newline(line);
    let trimmed = strip_leading_spaces(content);
    let indent = content.len() - trimmed.len();

    let (fence_char, fence_count) = if trimmed.starts_with('`') {
        ('`', trimmed.chars().take_while(|&c| c == '`').count())
    } else if trimmed.starts_with('~') {
        ('~', trimmed.chars().take_while(|&c| c == '~').count())
    } else {
        return None;
    };

    if fence_count < 3 {
        return None;
    }

    let info_string = &trimmed[fence_count..];
    // A backtick in a backtick fence's info string makes it inline code
    if fence_char == '`' && info_string.contains('`') {
        return None;
    }

    Some(FenceInfo {
        fence_char,
        fence_count,
        indent,
        info_string: info_string.trim().to_string(),
    })
}

/// Check if a line is a valid closing fence for the given fence info.
pub(crate) fn is_closing_fence(line: &str, fence: &FenceInfo) -> bool {
    let trimmed = strip_leading_spaces(strip_newline(line));

    let count = trimmed.chars().take_while(|&c| c == fence.fence_char).count();
    if count < fence.fence_count {
        return false;
    }

    trimmed[count..].trim().is_empty()
}

/// A fenced code block found in the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FencedBlock<'a> {
    pub info: FenceInfo,
    /// From the start of the opening fence line to the end of the closing
    /// fence, excluding its line terminator. Unclosed blocks run to the end
    /// of the content.
    pub span: Range<usize>,
    pub body: Cow<'a, str>,
    pub closed: bool,
}

/// Remove up to `indent` leading spaces from every body line.
fn dedent_body(body: &str, indent: usize) -> Cow<'_, str> {
    if indent == 0 {
        return Cow::Borrowed(body);
    }
    let lines: Vec<&str> = body
        .split('\n')
        .map(|line| {
            let spaces = line.bytes().take(indent).take_while(|&b| b == b' ').count();
            &line[spaces..]
        })
        .collect();
    Cow::Owned(lines.join("\n"))
}

/// Find every fenced code block, in order.
pub(crate) fn find_fenced_blocks(content: &str) -> Vec<FencedBlock<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < lines.len() {
        let (start, line) = lines[pos];
        let Some(info) = try_parse_fence_open(line) else {
            pos += 1;
            continue;
        };

        let body_start = start + line.len();
        let closing = (pos + 1..lines.len()).find(|&i| is_closing_fence(lines[i].1, &info));

        match closing {
            Some(close_idx) => {
                let (close_start, close_line) = lines[close_idx];
                let body = content[body_start..close_start]
                    .strip_suffix('\n')
                    .map(|b| b.strip_suffix('\r').unwrap_or(b))
                    .unwrap_or("");
                log::debug!(
                    "Fenced block at line {} closed at line {}",
                    pos + 1,
                    close_idx + 1
                );
                let indent = info.indent;
                blocks.push(FencedBlock {
                    info,
                    span: start..close_start + strip_newline(close_line).len(),
                    body: dedent_body(body, indent),
                    closed: true,
                });
                pos = close_idx + 1;
            }
            None => {
                log::debug!("Fenced block at line {} is never closed", pos + 1);
                blocks.push(FencedBlock {
                    info,
                    span: start..content.len(),
                    body: Cow::Borrowed(&content[body_start.min(content.len())..]),
                    closed: false,
                });
                break;
            }
        }
    }

    blocks
}
