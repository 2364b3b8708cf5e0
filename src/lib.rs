pub mod attributes;
pub mod config;
pub mod diagnostics;
pub mod map_config;
pub mod recompose;
pub mod render;
pub mod scanner;
pub mod substitute;

pub use config::Config;
pub use config::ConfigBuilder;
pub use config::InvalidBlocks;
pub use map_config::{LatLng, LayerDescriptor, LayerKind, MapConfig};
pub use recompose::{Segment, recompose};
pub use render::{RenderError, RenderedDocument, Renderer, render_document};
pub use substitute::{Extractor, Substitution};

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Replaces every map declaration in `content` with a placeholder token.
///
/// Returns the substituted content, the parsed configuration behind each
/// placeholder (in placeholder order) and an outcome for every declaration
/// found, including the ones that failed to parse.
///
/// # Examples
///
/// ```rust
/// use mapfence::extract;
///
/// let input = "Our office:\n\n<arcgis-map lat=\"51.5\" lng=\"-0.12\" zoom=\"12\" />\n";
/// let substitution = extract(input, None);
/// assert_eq!(substitution.content, "Our office:\n\n__MAP_PLACEHOLDER_0__\n");
/// ```
///
/// # Arguments
///
/// * `content` - Markdown-like content that may contain map declarations
/// * `config` - Optional configuration (defaults to default config)
pub fn extract(content: &str, config: Option<Config>) -> Substitution {
    Extractor::new(config.unwrap_or_default()).extract(content)
}
