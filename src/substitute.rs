//! Replacing map declarations with placeholder tokens.
//!
//! The substitution is a single fold over the original content: text between
//! declarations is copied verbatim and each successfully parsed declaration
//! is replaced by `__MAP_PLACEHOLDER_<i>__`, where `i` counts successful
//! parses only. Because spans come from the original text, an inserted token
//! is never rescanned.
//!
//! Every declaration, parsed or not, gets a [`DeclarationOutcome`] in the
//! returned [`Substitution`].

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::attributes;
use crate::config::{Config, InvalidBlocks};
use crate::map_config::yaml;
use crate::map_config::{DeclarationWarning, MapConfig, YamlError};
use crate::scanner::{Dialect, MapDeclaration, Scanner};

/// Matches any placeholder token; group 1 is the index.
pub static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__MAP_PLACEHOLDER_(\d+)__").expect("valid placeholder regex"));

pub fn placeholder_token(index: usize) -> String {
    format!("__MAP_PLACEHOLDER_{index}__")
}

/// A token inserted into the substituted content, with the map it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub index: usize,
    pub token: String,
    /// Byte range of the token in [`Substitution::content`].
    pub range: Range<usize>,
    pub config: MapConfig,
}

/// Why a declaration was skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationError {
    Yaml(YamlError),
}

impl std::fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DeclarationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Yaml(e) => Some(e),
        }
    }
}

impl From<YamlError> for DeclarationError {
    fn from(e: YamlError) -> Self {
        Self::Yaml(e)
    }
}

/// What happened to one declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationOutcome {
    pub dialect: Dialect,
    /// Span in the original content.
    pub span: Range<usize>,
    /// Placeholder index on success.
    pub result: Result<usize, DeclarationError>,
    pub warnings: Vec<DeclarationWarning>,
}

impl DeclarationOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Content with declarations replaced, and everything needed to put maps back.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub content: String,
    pub placeholders: Vec<Placeholder>,
    pub outcomes: Vec<DeclarationOutcome>,
}

impl Substitution {
    pub fn configs(&self) -> impl Iterator<Item = &MapConfig> {
        self.placeholders.iter().map(|p| &p.config)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeclarationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn has_maps(&self) -> bool {
        !self.placeholders.is_empty()
    }
}

/// Scans and substitutes content with a fixed configuration.
pub struct Extractor {
    config: Config,
    scanner: Scanner,
}

impl Extractor {
    pub fn new(config: Config) -> Self {
        let scanner = Scanner::new(&config);
        Self { config, scanner }
    }

    fn parse(
        &self,
        declaration: &MapDeclaration<'_>,
    ) -> Result<(MapConfig, Vec<DeclarationWarning>), DeclarationError> {
        match declaration.dialect {
            Dialect::Fenced => Ok(yaml::parse_block(&declaration.inner, &self.config)?),
            Dialect::Inline => Ok(attributes::parse_tag(&declaration.inner, &self.config)),
        }
    }

    /// Replace every map declaration in `content` with a placeholder.
    pub fn extract(&self, content: &str) -> Substitution {
        if PLACEHOLDER_PATTERN.is_match(content) {
            log::warn!("Content already contains placeholder-like text; it will be kept as text");
        }

        let declarations = self.scanner.scan(content);

        let mut output = String::with_capacity(content.len());
        let mut placeholders = Vec::new();
        let mut outcomes = Vec::with_capacity(declarations.len());
        let mut cursor = 0;

        for declaration in &declarations {
            let span = declaration.span.clone();
            output.push_str(&content[cursor..span.start]);
            cursor = span.end;

            match self.parse(declaration) {
                Ok((config, warnings)) => {
                    let index = placeholders.len();
                    let token = placeholder_token(index);
                    let start = output.len();
                    output.push_str(&token);
                    for warning in &warnings {
                        log::debug!("Map {} ({}): {}", index, declaration.dialect, warning);
                    }
                    placeholders.push(Placeholder {
                        index,
                        token,
                        range: start..output.len(),
                        config,
                    });
                    outcomes.push(DeclarationOutcome {
                        dialect: declaration.dialect,
                        span,
                        result: Ok(index),
                        warnings,
                    });
                }
                Err(e) => {
                    log::warn!(
                        "Skipping map {} at byte {}: {}",
                        declaration.dialect,
                        span.start,
                        e
                    );
                    if self.config.on_invalid == InvalidBlocks::Preserve {
                        output.push_str(&content[span.clone()]);
                    }
                    outcomes.push(DeclarationOutcome {
                        dialect: declaration.dialect,
                        span,
                        result: Err(e),
                        warnings: Vec::new(),
                    });
                }
            }
        }
        output.push_str(&content[cursor..]);

        Substitution {
            content: output,
            placeholders,
            outcomes,
        }
    }
}
