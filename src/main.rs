use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;

use mapfence::diagnostics::{Diagnostic, Severity};
use mapfence::render::html::{HtmlRenderer, to_html};
use mapfence::{Config, Extractor, render};

mod cli;
use cli::{Cli, Commands};

fn read_all(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn start_dir_for(input_path: &Option<PathBuf>) -> io::Result<PathBuf> {
    if let Some(p) = input_path {
        Ok(p.parent().unwrap_or(Path::new(".")).to_path_buf())
    } else {
        std::env::current_dir()
    }
}

fn load_config(explicit: Option<&Path>, file: &Option<PathBuf>) -> io::Result<Config> {
    let start_dir = start_dir_for(file)?;
    let (cfg, cfg_path) = mapfence::config::load(explicit, &start_dir)?;

    if let Some(path) = &cfg_path {
        log::debug!("Using config from: {}", path.display());
    } else {
        log::debug!("Using default config");
    }
    Ok(cfg)
}

fn print_diagnostics(diagnostics: &[Diagnostic], file: Option<&PathBuf>) {
    let file_name = file.and_then(|p| p.to_str()).unwrap_or("<stdin>");

    for diag in diagnostics {
        let severity_str = match diag.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",     // red
            Severity::Warning => "\x1b[33mwarning\x1b[0m", // yellow
            Severity::Info => "\x1b[34minfo\x1b[0m",       // blue
        };

        println!(
            "{severity_str}[{}]: {} at {}:{}:{}",
            diag.code, diag.message, file_name, diag.location.line, diag.location.column
        );
    }

    println!("\nFound {} issue(s)", diagnostics.len());
}

fn extract_json(substitution: &mapfence::Substitution) -> serde_json::Value {
    let maps: Vec<serde_json::Value> = substitution
        .placeholders
        .iter()
        .map(|p| serde_json::json!({ "placeholder": p.token, "config": p.config }))
        .collect();
    let errors: Vec<serde_json::Value> = substitution
        .outcomes
        .iter()
        .filter_map(|o| {
            o.result.as_ref().err().map(|e| {
                serde_json::json!({
                    "dialect": o.dialect,
                    "start": o.span.start,
                    "end": o.span.end,
                    "message": e.to_string(),
                })
            })
        })
        .collect();

    serde_json::json!({
        "content": substitution.content,
        "maps": maps,
        "errors": errors,
    })
}

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { file, json } => {
            let cfg = load_config(cli.config.as_deref(), &file)?;
            let input = read_all(file.as_ref())?;
            let substitution = Extractor::new(cfg).extract(&input);

            if json {
                let value = extract_json(&substitution);
                let out = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
                println!("{out}");
            } else {
                print!("{}", substitution.content);
            }
            Ok(())
        }
        Commands::Check { file } => {
            let cfg = load_config(cli.config.as_deref(), &file)?;
            let input = read_all(file.as_ref())?;
            let substitution = Extractor::new(cfg).extract(&input);
            let diagnostics = mapfence::diagnostics::collect(&substitution, &input);

            if diagnostics.is_empty() {
                println!(
                    "No issues found ({} map(s))",
                    substitution.placeholders.len()
                );
                return Ok(());
            }

            print_diagnostics(&diagnostics, file.as_ref());

            if diagnostics.iter().any(|d| d.severity == Severity::Error) {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Render { file, strip_token } => {
            let cfg = load_config(cli.config.as_deref(), &file)?;
            let input = read_all(file.as_ref())?;
            let renderer = HtmlRenderer { strip_token };

            let rt = tokio::runtime::Builder::new_current_thread().build()?;
            let document = rt.block_on(render::render_document(&input, &cfg, &renderer));
            print!("{}", to_html(&document));
            Ok(())
        }
    }
}
