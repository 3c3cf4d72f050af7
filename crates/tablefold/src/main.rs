//! tablefold: converts the tables of an HTML page into mobile-friendly widgets.
//!
//! `tablefold page.html -o page.mobile.html` converts every table for a narrow
//! viewport. `--dump-structure` prints the analysed structure of each table as
//! JSON instead.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use tablefold_analysis::{analyze_table, AnalysisOptions};
use tablefold_core::marker::MarkerKind;
use tablefold_core::options::{ConversionOptions, ViewMode};
use tablefold_core::plugin::TableSource;
use tablefold_core::session::SessionBuilder;
use tablefold_core::structure::TableStructure;
use tablefold_input::HtmlTableSource;
use tablefold_utils::encoding::decode_html;

#[derive(Parser, Debug)]
#[command(
    name = "tablefold",
    version,
    about = "Restructure HTML tables for narrow screens"
)]
struct Cli {
    /// Input HTML file
    input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// View mode: narrow or wide (default: narrow)
    #[arg(long)]
    mode: Option<String>,

    /// Viewport width in pixels; picks the mode against the breakpoint
    #[arg(long, conflicts_with = "mode")]
    width: Option<u32>,

    /// Marker applied to tables without an explicit one
    #[arg(long)]
    default_marker: Option<String>,

    /// Print the analysed structure of every table as JSON and exit
    #[arg(long)]
    dump_structure: bool,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Load config from global and project-local TOML files.
/// The project-local file fully overrides the global one. Missing files are ignored.
fn load_config() -> ConversionOptions {
    let mut opts = ConversionOptions::default();

    // 1. Global config: ~/.config/tablefold/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        if let Some(parsed) = read_config(&config_dir.join("tablefold").join("config.toml")) {
            opts = parsed;
        }
    }

    // 2. Project-local config: ./.tablefold.toml
    if let Some(parsed) = read_config(Path::new(".tablefold.toml")) {
        opts = parsed;
    }

    opts
}

fn read_config(path: &Path) -> Option<ConversionOptions> {
    let contents = fs::read_to_string(path).ok()?;
    match toml::from_str::<ConversionOptions>(&contents) {
        Ok(parsed) => {
            log::debug!("Loaded config from {}", path.display());
            Some(parsed)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Apply CLI flags on top of config-loaded options.
fn apply_cli_overrides(opts: &mut ConversionOptions, cli: &Cli) -> Result<()> {
    if cli.verbose > 0 {
        opts.verbose = cli.verbose;
    }
    if let Some(ref marker) = cli.default_marker {
        opts.default_marker = marker
            .parse::<MarkerKind>()
            .with_context(|| format!("Invalid --default-marker '{}'", marker))?;
    }
    Ok(())
}

fn view_mode(cli: &Cli, opts: &ConversionOptions) -> Result<ViewMode> {
    if let Some(width) = cli.width {
        return Ok(ViewMode::from_width(width, opts.breakpoint));
    }
    match cli.mode.as_deref() {
        None | Some("narrow") => Ok(ViewMode::Narrow),
        Some("wide") => Ok(ViewMode::Wide),
        Some(other) => anyhow::bail!("Unknown mode '{}': expected narrow or wide", other),
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut opts = load_config();
    if let Err(e) = apply_cli_overrides(&mut opts, &cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
    if let Err(e) = opts.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // Handle --dump-config
    if cli.dump_config {
        match toml::to_string_pretty(&opts) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = run(&cli, &opts) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, opts: &ConversionOptions) -> Result<()> {
    let document = read_document(&cli.input)?;

    let output = if cli.dump_structure {
        dump_structures(&document, opts)?
    } else {
        let mode = view_mode(cli, opts)?;
        log::info!("Processing {} ({:?})", cli.input.display(), mode);
        convert(&document, opts, mode)?
    };

    write_output(cli.output.as_deref(), &output)
}

fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (document, encoding) = decode_html(&bytes);
    log::debug!("Decoded {} as {}", path.display(), encoding);
    Ok(document)
}

fn write_output(path: Option<&Path>, output: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Run one conversion session over `document`.
fn convert(document: &str, opts: &ConversionOptions, mode: ViewMode) -> Result<String> {
    let mut builder = SessionBuilder::new()
        .source(Box::new(HtmlTableSource))
        .options(opts.clone());
    for converter in tablefold_render::standard_converters() {
        builder = builder.converter(converter);
    }

    let mut session = builder
        .progress_reporter(Box::new(|frac, msg| {
            if frac < 1.0 {
                log::debug!("[{:3.0}%] {}", frac * 100.0, msg);
            }
        }))
        .build()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    session
        .apply(document, mode)
        .map_err(|e| anyhow::anyhow!("{}", e))
}

#[derive(Serialize)]
struct TableDump {
    index: usize,
    marker: MarkerKind,
    /// `None` when the table has no data region.
    structure: Option<TableStructure>,
}

/// Analyse every table of `document` and serialise the results.
fn dump_structures(document: &str, opts: &ConversionOptions) -> Result<String> {
    let located = HtmlTableSource
        .locate(document, opts)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let analysis = AnalysisOptions::from(opts);
    let dumps: Vec<TableDump> = located
        .iter()
        .map(|t| TableDump {
            index: t.index,
            marker: t.marker.kind(opts.default_marker),
            structure: analyze_table(&t.table, &analysis),
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&dumps).context("Failed to serialize structures")?;
    json.push('\n');
    Ok(json)
}
