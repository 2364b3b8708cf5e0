use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::map_config::{
    DEFAULT_BASEMAP, DEFAULT_BASEMAPS, DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_ZOOM,
};

/// What to do with a fenced block whose body fails to parse.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidBlocks {
    /// Leave the authored block in the output untouched
    #[default]
    Preserve,
    /// Remove the block as if it had been consumed
    Drop,
}

/// Which declaration dialects are recognized, and under which names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Dialects {
    /// Recognize fenced blocks (```map)
    pub fenced: bool,
    /// Recognize inline tags (<arcgis-map ... />)
    pub inline: bool,
    /// Fence info-string languages that mark a map block
    pub fence_languages: Vec<String>,
    /// Tag names (matched case-insensitively) that mark an inline map
    pub tag_names: Vec<String>,
}

impl Default for Dialects {
    fn default() -> Self {
        Self {
            fenced: true,
            inline: true,
            fence_languages: vec!["map".to_string(), "arcgis".to_string()],
            tag_names: vec![
                "ArcGISMap".to_string(),
                "arcgis-map".to_string(),
                "arcgis_map".to_string(),
            ],
        }
    }
}

/// Values used for fields a declaration leaves out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub zoom: f64,
    pub basemap: String,
    pub height: String,
    pub width: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            basemap: DEFAULT_BASEMAP.to_string(),
            height: DEFAULT_HEIGHT.to_string(),
            width: DEFAULT_WIDTH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dialects: Dialects,
    pub defaults: Defaults,
    /// Basemaps that may be forwarded to a renderer
    pub basemaps: Vec<String>,
    pub on_invalid: InvalidBlocks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialects: Dialects::default(),
            defaults: Defaults::default(),
            basemaps: DEFAULT_BASEMAPS.iter().map(|b| b.to_string()).collect(),
            on_invalid: InvalidBlocks::default(),
        }
    }
}

#[derive(Default, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn fenced(mut self, enabled: bool) -> Self {
        self.config.dialects.fenced = enabled;
        self
    }

    pub fn inline(mut self, enabled: bool) -> Self {
        self.config.dialects.inline = enabled;
        self
    }

    pub fn fence_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.dialects.fence_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn tag_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.dialects.tag_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_basemap(mut self, basemap: impl Into<String>) -> Self {
        self.config.defaults.basemap = basemap.into();
        self
    }

    pub fn basemaps<I, S>(mut self, basemaps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.basemaps = basemaps.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_invalid(mut self, policy: InvalidBlocks) -> Self {
        self.config.on_invalid = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

const CANDIDATE_NAMES: &[&str] = &[".mapfence.toml", "mapfence.toml"];

fn parse_config_str(s: &str, path: &Path) -> io::Result<Config> {
    toml::from_str::<Config>(s).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid config {}: {e}", path.display()),
        )
    })
}

fn read_config(path: &Path) -> io::Result<Config> {
    log::debug!("Reading config from: {}", path.display());
    let s = fs::read_to_string(path)?;
    let config = parse_config_str(&s, path)?;
    log::info!("Loaded config from: {}", path.display());
    Ok(config)
}

fn find_in_tree(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        for name in CANDIDATE_NAMES {
            let p = dir.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
    }
    None
}

fn xdg_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let p = Path::new(&xdg).join("mapfence").join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }
    if let Ok(home) = env::var("HOME") {
        let p = Path::new(&home)
            .join(".config")
            .join("mapfence")
            .join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }
    None
}

/// Load configuration with precedence:
/// 1) explicit path (error if unreadable/invalid)
/// 2) walk up from start_dir: .mapfence.toml, mapfence.toml
/// 3) XDG: $XDG_CONFIG_HOME/mapfence/config.toml or ~/.config/mapfence/config.toml
/// 4) default config
pub fn load(explicit: Option<&Path>, start_dir: &Path) -> io::Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let cfg = read_config(path)?;
        return Ok((cfg, Some(path.to_path_buf())));
    }

    if let Some(p) = find_in_tree(start_dir)
        && let Ok(cfg) = read_config(&p)
    {
        return Ok((cfg, Some(p)));
    }

    if let Some(p) = xdg_config_path()
        && let Ok(cfg) = read_config(&p)
    {
        return Ok((cfg, Some(p)));
    }

    log::debug!("No config file found, using defaults");
    Ok((Config::default(), None))
}
