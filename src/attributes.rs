//! Parsing of inline map tag attributes.
//!
//! Attributes may be written as `name="value"`, `name='value'` or as a braced
//! expression `name={value}`. Inside braces, a surrounding pair of quotes or
//! backticks is stripped, so `basemap={"gray"}` and `basemap={gray}` agree.
//!
//! Each field accepts several names (see [`FIELDS`]); matching is
//! case-insensitive and the leftmost occurrence in the tag wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;
use crate::map_config::yaml::parse_center_str;
use crate::map_config::{DeclarationWarning, LatLng, MapConfig, MapFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Latitude,
    Longitude,
    Center,
    Zoom,
    Basemap,
    Height,
    Width,
    Token,
    Item,
    Portal,
}

/// Accepted attribute names per field.
const FIELDS: &[(Field, &[&str])] = &[
    (Field::Latitude, &["latitude", "lat"]),
    (Field::Longitude, &["longitude", "long", "lng", "lon"]),
    (Field::Center, &["center"]),
    (Field::Zoom, &["zoom", "z"]),
    (Field::Basemap, &["basemap", "map"]),
    (Field::Height, &["height", "h"]),
    (Field::Width, &["width", "w"]),
    (Field::Token, &["token", "apikey"]),
    (Field::Item, &["item", "itemid", "webmap"]),
    (Field::Portal, &["portal", "portalurl"]),
];

static FIELD_PATTERNS: LazyLock<Vec<(Field, Regex)>> = LazyLock::new(|| {
    FIELDS
        .iter()
        .map(|(field, names)| {
            let pattern = format!(
                r#"(?i)(?:^|\s)(?:{})\s*=\s*(?:"([^"]*)"|'([^']*)'|\{{([^}}]*)\}})"#,
                names.join("|")
            );
            (
                *field,
                Regex::new(&pattern).expect("valid attribute regex"),
            )
        })
        .collect()
});

/// Raw attribute values found in a tag, by field.
#[derive(Debug, Default, PartialEq)]
pub struct TagAttributes {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub center: Option<String>,
    pub zoom: Option<String>,
    pub basemap: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    pub token: Option<String>,
    pub item: Option<String>,
    pub portal: Option<String>,
}

impl TagAttributes {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
            Field::Center => &mut self.center,
            Field::Zoom => &mut self.zoom,
            Field::Basemap => &mut self.basemap,
            Field::Height => &mut self.height,
            Field::Width => &mut self.width,
            Field::Token => &mut self.token,
            Field::Item => &mut self.item,
            Field::Portal => &mut self.portal,
        }
    }
}

/// Strip one pair of matching quotes or backticks around a braced value.
fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\'', '`'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Extract every known field from the text between the tag delimiters.
pub fn extract_attributes(attrs: &str) -> TagAttributes {
    let mut found = TagAttributes::default();

    for (field, regex) in FIELD_PATTERNS.iter() {
        let Some(caps) = regex.captures(attrs) else {
            continue;
        };
        let quoted = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
        let braced = caps.get(3).map(|m| unquote(m.as_str()));
        let value = [quoted, braced]
            .into_iter()
            .flatten()
            .find(|v| !v.is_empty())
            .unwrap_or("");
        *found.slot(*field) = Some(value.to_string());
    }

    log::debug!("Extracted tag attributes: {:?}", found);
    found
}

fn parse_number(
    field: &'static str,
    value: &str,
    warnings: &mut Vec<DeclarationWarning>,
) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) => {
            warnings.push(DeclarationWarning::InvalidField {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build a resolved [`MapConfig`] from an inline tag's attribute text.
///
/// Never fails: unusable coordinates fall back to `0`, other unusable values
/// are dropped, and each is reported as a warning.
pub(crate) fn parse_tag(attrs: &str, config: &Config) -> (MapConfig, Vec<DeclarationWarning>) {
    let found = extract_attributes(attrs);
    let mut warnings = Vec::new();

    let center = if found.latitude.is_some() || found.longitude.is_some() {
        let lat = found
            .latitude
            .as_deref()
            .and_then(|v| parse_number("latitude", v, &mut warnings))
            .unwrap_or(0.0);
        let lon = found
            .longitude
            .as_deref()
            .and_then(|v| parse_number("longitude", v, &mut warnings))
            .unwrap_or(0.0);
        Some(LatLng::new(lat, lon))
    } else if let Some(text) = found.center.as_deref() {
        let parsed = parse_center_str(text);
        if parsed.is_none() {
            warnings.push(DeclarationWarning::InvalidField {
                field: "center",
                value: text.to_string(),
            });
        }
        parsed
    } else {
        None
    };

    let zoom = found
        .zoom
        .as_deref()
        .and_then(|v| parse_number("zoom", v, &mut warnings));

    let fields = MapFields {
        center,
        zoom,
        basemap: non_empty(found.basemap),
        height: found.height,
        width: found.width,
        auth_token: non_empty(found.token),
        portal_url: non_empty(found.portal),
        item_id: non_empty(found.item),
        ..MapFields::default()
    };

    let map = fields.resolve(config, &mut warnings);
    (map, warnings)
}
