//! Normalized map configuration handed to renderers.
//!
//! Both declaration dialects end up here: the inline-tag extractor and the
//! fenced YAML parser produce a [`MapConfig`] whose fields are fully resolved
//! (defaults applied, sizes normalized, basemap checked against the
//! allowlist). Renderers never see raw author input.

use serde::{Deserialize, Serialize};

use crate::config::Config;

mod basemap;
pub(crate) mod yaml;

pub use basemap::{DEFAULT_BASEMAPS, resolve_basemap};
pub use yaml::YamlError;

pub const DEFAULT_ZOOM: f64 = 4.0;
pub const DEFAULT_BASEMAP: &str = "osm";
pub const DEFAULT_HEIGHT: &str = "400px";
pub const DEFAULT_WIDTH: &str = "100%";
pub const DEFAULT_PORTAL_URL: &str = "https://www.arcgis.com";

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components lie within the renderable range.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Visibility of the map's UI elements. Missing keys stay visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiToggles {
    pub attribution: bool,
    pub compass: bool,
    pub home: bool,
    pub zoom: bool,
    pub legend: bool,
    pub layer_list: bool,
    pub basemap_toggle: bool,
    pub scale_bar: bool,
}

impl Default for UiToggles {
    fn default() -> Self {
        Self {
            attribution: true,
            compass: true,
            home: true,
            zoom: true,
            legend: true,
            layer_list: true,
            basemap_toggle: true,
            scale_bar: true,
        }
    }
}

/// The kind of service a layer is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    #[serde(alias = "feature-layer", alias = "FeatureServer")]
    FeatureService,
    #[serde(alias = "map-image", alias = "MapServer")]
    MapServer,
    #[serde(alias = "imagery", alias = "ImageServer")]
    ImageServer,
    #[serde(alias = "vector-tile", alias = "VectorTileServer")]
    VectorTileService,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeatureService => "feature-service",
            Self::MapServer => "map-server",
            Self::ImageServer => "image-server",
            Self::VectorTileService => "vector-tile-service",
        }
    }
}

/// One entry of `services`: a geospatial source drawn as one map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub url: String,
    #[serde(
        default,
        alias = "layerIndex",
        alias = "layer",
        skip_serializing_if = "Option::is_none"
    )]
    pub layer_id: Option<u32>,
    #[serde(default, alias = "fields", skip_serializing_if = "Option::is_none")]
    pub out_fields: Option<StringOrArray>,
    #[serde(
        default,
        alias = "where",
        alias = "filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub definition_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl LayerDescriptor {
    pub fn new(kind: LayerKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            layer_id: None,
            out_fields: None,
            definition_expression: None,
            opacity: None,
            visible: None,
            title: None,
        }
    }
}

/// Helper type to deserialize both string and array forms.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrArray {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrArray {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Multiple(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// A hosted map item loaded from a portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalReference {
    pub url: String,
    pub item_id: String,
}

impl PortalReference {
    pub fn new(url: Option<String>, item_id: impl Into<String>) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string()),
            item_id: item_id.into(),
        }
    }
}

/// Fully resolved configuration of one embedded map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub basemap: String,
    pub height: String,
    pub width: String,
    pub ui: UiToggles,
    pub services: Vec<LayerDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal: Option<PortalReference>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLng::default(),
            zoom: DEFAULT_ZOOM,
            basemap: DEFAULT_BASEMAP.to_string(),
            height: DEFAULT_HEIGHT.to_string(),
            width: DEFAULT_WIDTH.to_string(),
            ui: UiToggles::default(),
            services: Vec::new(),
            auth_token: None,
            portal: None,
        }
    }
}

/// A non-fatal problem found while building a [`MapConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationWarning {
    /// The requested basemap is not on the allowlist and was replaced.
    UnknownBasemap { requested: String, fallback: String },
    /// The center cannot be rendered; the renderer will show an error.
    CoordinateOutOfRange { center: LatLng },
    /// A field value could not be interpreted and was ignored.
    InvalidField { field: &'static str, value: String },
}

impl std::fmt::Display for DeclarationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBasemap {
                requested,
                fallback,
            } => write!(f, "unknown basemap '{}', using '{}'", requested, fallback),
            Self::CoordinateOutOfRange { center } => write!(
                f,
                "center ({}, {}) is outside the valid latitude/longitude range",
                center.lat, center.lon
            ),
            Self::InvalidField { field, value } => {
                write!(f, "ignoring invalid {} value '{}'", field, value)
            }
        }
    }
}

impl DeclarationWarning {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownBasemap { .. } => "unknown-basemap",
            Self::CoordinateOutOfRange { .. } => "coordinate-out-of-range",
            Self::InvalidField { .. } => "invalid-field",
        }
    }
}

/// Map fields as an author wrote them, before defaults are applied.
#[derive(Debug, Default)]
pub(crate) struct MapFields {
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    pub basemap: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    pub ui: UiToggles,
    pub services: Vec<LayerDescriptor>,
    pub auth_token: Option<String>,
    pub portal_url: Option<String>,
    pub item_id: Option<String>,
}

impl MapFields {
    /// Apply defaults and the basemap allowlist.
    pub(crate) fn resolve(
        self,
        config: &Config,
        warnings: &mut Vec<DeclarationWarning>,
    ) -> MapConfig {
        let defaults = &config.defaults;

        let center = self.center.unwrap_or_default();
        if !center.is_valid() {
            warnings.push(DeclarationWarning::CoordinateOutOfRange { center });
        }

        let zoom = match self.zoom {
            Some(z) if z.is_finite() && z > 0.0 => z,
            Some(z) => {
                warnings.push(DeclarationWarning::InvalidField {
                    field: "zoom",
                    value: z.to_string(),
                });
                defaults.zoom
            }
            None => defaults.zoom,
        };

        let basemap = match self.basemap {
            Some(requested) => {
                let (resolved, fell_back) =
                    resolve_basemap(&requested, &config.basemaps, &defaults.basemap);
                if fell_back {
                    warnings.push(DeclarationWarning::UnknownBasemap {
                        requested,
                        fallback: resolved.clone(),
                    });
                }
                resolved
            }
            None => defaults.basemap.clone(),
        };

        let portal = match (self.item_id, self.portal_url) {
            (Some(item), url) => Some(PortalReference::new(url, item)),
            (None, Some(url)) => {
                warnings.push(DeclarationWarning::InvalidField {
                    field: "portalUrl",
                    value: url,
                });
                None
            }
            (None, None) => None,
        };

        MapConfig {
            center,
            zoom,
            basemap,
            height: self
                .height
                .as_deref()
                .and_then(normalize_size)
                .unwrap_or_else(|| defaults.height.clone()),
            width: self
                .width
                .as_deref()
                .and_then(normalize_size)
                .unwrap_or_else(|| defaults.width.clone()),
            ui: self.ui,
            services: self.services,
            auth_token: self.auth_token.filter(|t| !t.trim().is_empty()),
            portal,
        }
    }
}

/// Normalize an authored size: bare numbers become pixel values.
pub fn normalize_size(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(format!("{}px", format_number(n))),
        _ => Some(trimmed.to_string()),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
