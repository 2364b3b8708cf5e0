use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mapfence")]
#[command(author, version)]
#[command(about = "Embed interactive maps in Markdown from fenced blocks and inline tags")]
#[command(
    long_about = "Mapfence finds map declarations in Markdown content, either fenced ```map \
    blocks with a YAML body or inline <arcgis-map ... /> tags, parses their configuration and \
    swaps them for placeholders or HTML mount points that a map component can pick up."
)]
#[command(after_help = "\
EXAMPLES:

    # Show content with maps replaced by placeholders
    mapfence extract document.md

    # Same, as JSON with the parsed map configurations
    mapfence extract --json document.md

    # Report malformed map blocks (exit code 1 if any)
    mapfence check document.md

    # Replace maps with HTML mount points
    cat document.md | mapfence render

CONFIGURATION:

Mapfence looks for configuration files in this order:
  1. Explicit --config path
  2. mapfence.toml or .mapfence.toml in current/parent directories
  3. ~/.config/mapfence/config.toml (XDG)
  4. Built-in defaults

Example .mapfence.toml:

    on_invalid = \"preserve\"

    [dialects]
    fence_languages = [\"map\", \"arcgis\"]
    tag_names = [\"ArcGISMap\", \"arcgis-map\", \"arcgis_map\"]

    [defaults]
    basemap = \"gray\"
    height = \"500px\"")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    #[arg(help = "Path to configuration file")]
    #[arg(
        long_help = "Path to a custom configuration file. If not specified, mapfence will \
        search for .mapfence.toml or mapfence.toml in the current directory and its parents, \
        then fall back to ~/.config/mapfence/config.toml."
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace map declarations with placeholders
    #[command(
        long_about = "Replace every map declaration with a __MAP_PLACEHOLDER_<n>__ token and \
        print the result. With --json, print the substituted content together with the parsed \
        configuration behind each placeholder and the declarations that failed to parse."
    )]
    #[command(after_help = "\
EXAMPLES:

    # Placeholders to stdout
    mapfence extract document.md

    # Machine-readable output
    mapfence extract --json document.md")]
    Extract {
        /// Input file (stdin if not provided)
        #[arg(help = "Input file path")]
        file: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        #[arg(help = "Print content, map configurations and errors as JSON")]
        json: bool,
    },
    /// Report problems with map declarations
    #[command(
        long_about = "Check map declarations without changing anything. Blocks that fail to \
        parse are errors; out-of-range coordinates, ignored values and replaced basemaps are \
        reported as warnings or notes. Exits with code 1 if there are errors."
    )]
    Check {
        /// Input file (stdin if not provided)
        #[arg(help = "Input file path")]
        file: Option<PathBuf>,
    },
    /// Replace map declarations with HTML mount points
    #[command(
        long_about = "Replace every map declaration with an empty <div class=\"mapfence-map\"> \
        whose data-config attribute holds the map configuration as JSON. Maps that cannot be \
        shown become an inline <div class=\"mapfence-error\"> instead."
    )]
    Render {
        /// Input file (stdin if not provided)
        #[arg(help = "Input file path")]
        file: Option<PathBuf>,

        /// Leave tokens out of the emitted configuration
        #[arg(long)]
        #[arg(help = "Do not write auth tokens into the HTML")]
        strip_token: bool,
    },
}
