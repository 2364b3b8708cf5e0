//! Locating map declarations in content.
//!
//! Two dialects are recognized:
//!
//! - fenced blocks whose language is one of `Dialects::fence_languages`,
//!   with a YAML body;
//! - inline tags named after one of `Dialects::tag_names`, with attributes.
//!
//! The scan is read-only and produces disjoint spans in source order. Inline
//! tags inside code (fenced blocks, indented blocks and code spans) are
//! ignored, so a map block or a code sample showing a tag never yields an
//! inline declaration.

use std::borrow::Cow;
use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::config::Config;

mod code_regions;
mod fences;
mod tags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    Fenced,
    Inline,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fenced => write!(f, "fenced block"),
            Self::Inline => write!(f, "inline tag"),
        }
    }
}

/// One map declaration found in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDeclaration<'a> {
    pub dialect: Dialect,
    /// Half-open byte range of the whole declaration in the content.
    pub span: Range<usize>,
    /// Block body (fenced) or attribute text (inline).
    pub inner: Cow<'a, str>,
}

pub struct Scanner {
    fenced: bool,
    fence_languages: Vec<String>,
    tag: Option<Regex>,
}

impl Scanner {
    pub fn new(config: &Config) -> Self {
        let dialects = &config.dialects;
        let tag = if dialects.inline {
            tags::tag_regex(&dialects.tag_names)
        } else {
            None
        };

        Self {
            fenced: dialects.fenced,
            fence_languages: dialects
                .fence_languages
                .iter()
                .map(|l| l.trim().to_ascii_lowercase())
                .collect(),
            tag,
        }
    }

    fn is_map_language(&self, language: Option<&str>) -> bool {
        language.is_some_and(|lang| {
            self.fence_languages
                .iter()
                .any(|l| l.eq_ignore_ascii_case(lang))
        })
    }

    /// Find every declaration in `content`, left to right.
    pub fn scan<'a>(&self, content: &'a str) -> Vec<MapDeclaration<'a>> {
        let blocks = fences::find_fenced_blocks(content);
        let mut declarations = Vec::new();

        if self.fenced {
            for block in &blocks {
                if !self.is_map_language(block.info.language()) {
                    continue;
                }
                if !block.closed {
                    log::debug!(
                        "Ignoring unterminated map block at byte {}",
                        block.span.start
                    );
                    continue;
                }
                declarations.push(MapDeclaration {
                    dialect: Dialect::Fenced,
                    span: block.span.clone(),
                    inner: block.body.clone(),
                });
            }
        }

        if let Some(tag) = &self.tag {
            let mut code: Vec<Range<usize>> = blocks.iter().map(|b| b.span.clone()).collect();
            let indented = code_regions::find_indented_code(content, &code);
            code.extend(indented);
            let spans = code_regions::find_code_spans(content, &code);
            code.extend(spans);
            let overlaps_code =
                |span: &Range<usize>| code.iter().any(|c| span.start < c.end && c.start < span.end);

            for caps in tag.captures_iter(content) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let span = whole.range();
                if overlaps_code(&span) {
                    log::debug!("Skipping map tag inside code at byte {}", span.start);
                    continue;
                }
                let attrs = caps.name("attrs").map_or("", |m| m.as_str());
                declarations.push(MapDeclaration {
                    dialect: Dialect::Inline,
                    span,
                    inner: Cow::Borrowed(attrs),
                });
            }
        }

        declarations.sort_by_key(|d| d.span.start);
        log::debug!("Found {} map declaration(s)", declarations.len());
        declarations
    }
}
