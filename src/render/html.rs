//! Static HTML mount points.
//!
//! Emits an empty `<div>` carrying the map config as JSON, for a client-side
//! script to pick up. Nothing here talks to a map engine.

use crate::map_config::MapConfig;
use crate::recompose::Segment;

use super::{RenderError, RenderedDocument, Renderer};

pub const MAP_CLASS: &str = "mapfence-map";
pub const ERROR_CLASS: &str = "mapfence-error";

/// Escape text for use inside a double-quoted attribute or element body.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer {
    /// Leave the token out of the emitted config.
    pub strip_token: bool,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_mount_point(&self, config: &MapConfig) -> Result<String, RenderError> {
        if !config.center.is_valid() {
            return Err(RenderError::CoordinateOutOfRange(config.center));
        }

        let json = if self.strip_token && config.auth_token.is_some() {
            let mut public = config.clone();
            public.auth_token = None;
            serde_json::to_string(&public)
        } else {
            serde_json::to_string(config)
        }
        .map_err(|e| RenderError::Backend(e.to_string()))?;

        Ok(format!(
            "<div class=\"{}\" style=\"height: {}; width: {};\" data-config=\"{}\"></div>",
            MAP_CLASS,
            escape_html(&config.height),
            escape_html(&config.width),
            escape_html(&json)
        ))
    }
}

impl Renderer for HtmlRenderer {
    type Widget = String;

    async fn render(&self, config: &MapConfig) -> Result<String, RenderError> {
        self.render_mount_point(config)
    }
}

pub fn render_error(error: &RenderError) -> String {
    format!(
        "<div class=\"{}\" role=\"alert\">Map failed to load: {}</div>",
        ERROR_CLASS,
        escape_html(&error.to_string())
    )
}

/// Concatenate a rendered document, writing failed maps as error boxes.
pub fn to_html(document: &RenderedDocument<String>) -> String {
    let mut out = String::new();
    for segment in &document.segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Widget(Ok(html)) => out.push_str(html),
            Segment::Widget(Err(e)) => out.push_str(&render_error(e)),
        }
    }
    out
}
