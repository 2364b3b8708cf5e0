//! Parsing of fenced map block bodies.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::{DeclarationWarning, LatLng, LayerDescriptor, MapConfig, MapFields, UiToggles};
use crate::config::Config;

/// Errors that can occur while parsing a map block body.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlError {
    /// YAML syntax error, or a value of the wrong shape.
    ParseError(String),
    /// The document parsed but is not a map description.
    StructureError(String),
}

impl std::fmt::Display for YamlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseError(msg) => write!(f, "YAML parse error: {}", msg),
            Self::StructureError(msg) => write!(f, "Invalid map block: {}", msg),
        }
    }
}

impl std::error::Error for YamlError {}

impl From<serde_saphyr::Error> for YamlError {
    fn from(err: serde_saphyr::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

/// A YAML scalar that should hold a number but may have been quoted.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PointSpec {
    #[serde(alias = "latitude")]
    lat: Scalar,
    #[serde(alias = "lng", alias = "long", alias = "longitude")]
    lon: Scalar,
}

/// Every accepted spelling of `center`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CenterSpec {
    Text(String),
    Single(Scalar),
    Pair(Vec<Scalar>),
    Point(PointSpec),
}

impl CenterSpec {
    fn to_latlng(&self) -> Option<LatLng> {
        match self {
            Self::Text(s) => parse_center_str(s),
            Self::Single(_) => None,
            Self::Pair(values) if values.len() >= 2 => {
                Some(LatLng::new(values[0].as_f64()?, values[1].as_f64()?))
            }
            Self::Pair(_) => None,
            Self::Point(p) => Some(LatLng::new(p.lat.as_f64()?, p.lon.as_f64()?)),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Single(s) => s.to_text(),
            Self::Pair(values) => format!(
                "[{}]",
                values
                    .iter()
                    .map(Scalar::to_text)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Point(p) => format!("{{lat: {}, lon: {}}}", p.lat.to_text(), p.lon.to_text()),
        }
    }
}

/// Internal representation of a map block body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MapBlock {
    center: Option<CenterSpec>,
    zoom: Option<Scalar>,
    basemap: Option<String>,
    height: Option<Scalar>,
    width: Option<Scalar>,
    ui: Option<UiToggles>,
    services: Vec<LayerDescriptor>,
    #[serde(alias = "apiKey")]
    token: Option<String>,
    portal_url: Option<String>,
    #[serde(alias = "webmap", alias = "webMap")]
    item_id: Option<String>,
}

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]\n]*\]\(([^)\s]*)\)").expect("valid link regex"));

/// Replace `[text](url)` with `url`.
///
/// Markdown tooling likes to autolink URLs in pasted content, and the
/// brackets would otherwise be read as YAML flow sequences.
pub(crate) fn normalize_links(body: &str) -> String {
    MARKDOWN_LINK.replace_all(body, "$1").into_owned()
}

/// Parse `"lat, lon"`. Anything but exactly two numeric parts is rejected.
pub(crate) fn parse_center_str(text: &str) -> Option<LatLng> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return None;
    }
    let lat = parts[0].parse::<f64>().ok()?;
    let lon = parts[1].parse::<f64>().ok()?;
    Some(LatLng::new(lat, lon))
}

fn is_blank_document(body: &str) -> bool {
    body.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Parse a fenced block body into a resolved [`MapConfig`].
pub(crate) fn parse_block(
    body: &str,
    config: &Config,
) -> Result<(MapConfig, Vec<DeclarationWarning>), YamlError> {
    let normalized = normalize_links(body);

    let block: MapBlock = if is_blank_document(&normalized) {
        MapBlock::default()
    } else {
        serde_saphyr::from_str(&normalized)?
    };

    let mut warnings = Vec::new();
    let fields = block.into_fields(&mut warnings)?;
    let map = fields.resolve(config, &mut warnings);
    Ok((map, warnings))
}

impl MapBlock {
    fn into_fields(self, warnings: &mut Vec<DeclarationWarning>) -> Result<MapFields, YamlError> {
        let center = self.center.and_then(|spec| {
            let parsed = spec.to_latlng();
            if parsed.is_none() {
                warnings.push(DeclarationWarning::InvalidField {
                    field: "center",
                    value: spec.describe(),
                });
            }
            parsed
        });

        let zoom = self.zoom.and_then(|z| {
            let parsed = z.as_f64();
            if parsed.is_none() {
                warnings.push(DeclarationWarning::InvalidField {
                    field: "zoom",
                    value: z.to_text(),
                });
            }
            parsed
        });

        for (i, service) in self.services.iter().enumerate() {
            if service.url.trim().is_empty() {
                return Err(YamlError::StructureError(format!(
                    "service {} ({}) has an empty url",
                    i,
                    service.kind.as_str()
                )));
            }
        }

        Ok(MapFields {
            center,
            zoom,
            basemap: self.basemap,
            height: self.height.map(|h| h.to_text()),
            width: self.width.map(|w| w.to_text()),
            ui: self.ui.unwrap_or_default(),
            services: self.services,
            auth_token: self.token,
            portal_url: self.portal_url,
            item_id: self.item_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_config::LayerKind;

    fn parse(body: &str) -> (MapConfig, Vec<DeclarationWarning>) {
        parse_block(body, &Config::default()).unwrap()
    }

    #[test]
    fn center_from_comma_string() {
        let (map, warnings) = parse("center: \"34.056, -117.195\"\nzoom: 12");
        assert_eq!(map.center, LatLng::new(34.056, -117.195));
        assert_eq!(map.zoom, 12.0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn center_from_unquoted_string() {
        let (map, _) = parse("center: 34.056, -117.195");
        assert_eq!(map.center, LatLng::new(34.056, -117.195));
    }

    #[test]
    fn center_from_sequence() {
        let (map, _) = parse("center: [40.7128, -74.0060]");
        assert_eq!(map.center, LatLng::new(40.7128, -74.0060));
    }

    #[test]
    fn center_from_integer_sequence() {
        let (map, _) = parse("center:\n  - 40\n  - -74\n  - 3");
        assert_eq!(map.center, LatLng::new(40.0, -74.0));
    }

    #[test]
    fn center_from_mapping() {
        let (map, _) = parse("center:\n  latitude: 51.5\n  lng: -0.12");
        assert_eq!(map.center, LatLng::new(51.5, -0.12));
    }

    #[test]
    fn single_component_center_stays_at_origin() {
        let (map, warnings) = parse("center: \"34.056\"");
        assert_eq!(map.center, LatLng::new(0.0, 0.0));
        assert_eq!(
            warnings,
            vec![DeclarationWarning::InvalidField {
                field: "center",
                value: "34.056".to_string()
            }]
        );
    }

    #[test]
    fn three_component_center_stays_at_origin() {
        let (map, _) = parse("center: \"1, 2, 3\"");
        assert_eq!(map.center, LatLng::default());
    }

    #[test]
    fn parse_center_str_rejects_garbage() {
        assert_eq!(parse_center_str("34.056, abc"), None);
        assert_eq!(parse_center_str(""), None);
        assert_eq!(
            parse_center_str(" -33.9 ,151.2 "),
            Some(LatLng::new(-33.9, 151.2))
        );
    }

    #[test]
    fn empty_body_is_all_defaults() {
        let (map, warnings) = parse("\n# just a comment\n");
        assert_eq!(map, MapConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn links_are_unwrapped_before_parsing() {
        assert_eq!(
            normalize_links("url: [https://x.org/a](https://x.org/a)"),
            "url: https://x.org/a"
        );

        let body = "services:\n  - type: feature-service\n    url: [https://services.arcgis.com/x/FeatureServer/0](https://services.arcgis.com/x/FeatureServer/0)\n";
        let (map, _) = parse(body);
        assert_eq!(
            map.services[0].url,
            "https://services.arcgis.com/x/FeatureServer/0"
        );
    }

    #[test]
    fn services_keep_declaration_order() {
        let body = r#"
services:
  - type: map-server
    url: https://example.com/MapServer
    opacity: 0.5
  - type: feature-service
    url: https://example.com/FeatureServer
    layerId: 3
    outFields: ["NAME", "POP"]
    definitionExpression: "POP > 1000"
  - type: vector-tile-service
    url: https://example.com/VectorTileServer
    visible: false
"#;
        let (map, _) = parse(body);
        let kinds: Vec<LayerKind> = map.services.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LayerKind::MapServer,
                LayerKind::FeatureService,
                LayerKind::VectorTileService
            ]
        );
        assert_eq!(map.services[0].opacity, Some(0.5));
        assert_eq!(map.services[1].layer_id, Some(3));
        assert_eq!(
            map.services[1].out_fields.as_ref().unwrap().values(),
            vec!["NAME", "POP"]
        );
        assert_eq!(
            map.services[1].definition_expression.as_deref(),
            Some("POP > 1000")
        );
        assert_eq!(map.services[2].visible, Some(false));
    }

    #[test]
    fn unknown_service_type_is_a_parse_error() {
        let result = parse_block(
            "services:\n  - type: wms\n    url: https://example.com/wms\n",
            &Config::default(),
        );
        assert!(matches!(result, Err(YamlError::ParseError(_))));
    }

    #[test]
    fn empty_service_url_is_a_structure_error() {
        let result = parse_block(
            "services:\n  - type: image-server\n    url: \"\"\n",
            &Config::default(),
        );
        assert!(matches!(result, Err(YamlError::StructureError(_))));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = parse_block("center: [1, 2\nzoom: : :\n  - x", &Config::default());
        assert!(result.is_err());
    }

    #[test]
    fn ui_token_portal_and_sizes() {
        let body = r#"
basemap: satellite
height: 500
width: 80%
apiKey: secret
webmap: 41281c51f9de45edaf1c8ed44bb10e30
ui:
  compass: false
  scaleBar: false
"#;
        let (map, warnings) = parse(body);
        assert!(warnings.is_empty());
        assert_eq!(map.basemap, "satellite");
        assert_eq!(map.height, "500px");
        assert_eq!(map.width, "80%");
        assert_eq!(map.auth_token.as_deref(), Some("secret"));
        let portal = map.portal.unwrap();
        assert_eq!(portal.url, "https://www.arcgis.com");
        assert_eq!(portal.item_id, "41281c51f9de45edaf1c8ed44bb10e30");
        assert!(!map.ui.compass);
        assert!(!map.ui.scale_bar);
        assert!(map.ui.legend);
    }

    #[test]
    fn unknown_basemap_is_replaced() {
        let (map, warnings) = parse("basemap: topo-vector-premium");
        assert_eq!(map.basemap, "osm");
        assert_eq!(
            warnings,
            vec![DeclarationWarning::UnknownBasemap {
                requested: "topo-vector-premium".to_string(),
                fallback: "osm".to_string()
            }]
        );
    }

    #[test]
    fn out_of_range_center_is_kept() {
        let (map, warnings) = parse("center: [95, 200]");
        assert_eq!(map.center, LatLng::new(95.0, 200.0));
        assert_eq!(
            warnings,
            vec![DeclarationWarning::CoordinateOutOfRange {
                center: LatLng::new(95.0, 200.0)
            }]
        );
    }
}
