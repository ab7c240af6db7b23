//! # xsdoc
//!
//! Command-line front end for the schema merge engine.
//!
//! Resolves a root XML Schema together with everything it includes or
//! imports and writes the merged schema, its namespace legend, or a
//! consistency report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xsdoc_ir::{to_xml_string, Cursor, Node, WriteOptions, XSD_NAMESPACE};
use xsdoc_schema::{resolve, DefinitionIndex, Resolution, ResolverConfig};

#[derive(Parser)]
#[command(name = "xsdoc")]
#[command(about = "Merge an XML Schema with its includes and imports")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a schema and write the merged tree
    Merge {
        /// Root schema file
        input: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Xml)]
        format: OutputFormat,

        /// Write only the node at this path, e.g. `complexType[@name=Order]/sequence`
        #[arg(short, long, value_name = "PATH")]
        select: Option<String>,
    },

    /// Print the namespace legend (URI to prefix)
    Namespaces {
        /// Root schema file
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Report skipped imports, duplicate definitions and dangling references
    Check {
        /// Root schema file
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Xml,
    Json,
}

/// JSON form of `merge --format json`
#[derive(Serialize)]
struct MergeReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    resolution: &'a Resolution,
}

/// JSON form of `namespaces --json`
#[derive(Serialize)]
struct NamespaceLegend<'a> {
    generated_at: DateTime<Utc>,
    root_namespace: Option<&'a str>,
    root_prefix: Option<&'a str>,
    namespaces: Vec<LegendEntry<'a>>,
}

/// JSON form of `merge --select PATH --format json`
#[derive(Serialize)]
struct SelectionReport<'a> {
    generated_at: DateTime<Utc>,
    path: &'a [String],
    node: &'a Node,
}

#[derive(Serialize)]
struct LegendEntry<'a> {
    uri: &'a str,
    prefix: &'a str,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    match cli.command {
        Commands::Merge {
            input,
            output,
            format,
            select,
        } => {
            let resolution = resolve_input(&input, &config)?;
            let root = Cursor::new(&resolution.merged.schema);
            let selected = match select.as_deref() {
                Some(path) => Some(
                    root.navigate(path)
                        .with_context(|| format!("Failed to select {path}"))?,
                ),
                None => None,
            };

            let rendered = match (format, &selected) {
                (OutputFormat::Xml, _) => {
                    let node = selected.as_ref().map_or(root.node(), Cursor::node);
                    render_xml(&resolution, node, &config.builtin_prefix)?
                }
                (OutputFormat::Json, Some(cursor)) => {
                    serde_json::to_string_pretty(&SelectionReport {
                        generated_at: Utc::now(),
                        path: cursor.path(),
                        node: cursor.node(),
                    })?
                }
                (OutputFormat::Json, None) => serde_json::to_string_pretty(&MergeReport {
                    generated_at: Utc::now(),
                    resolution: &resolution,
                })?,
            };
            write_output(output.as_deref(), &rendered)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Namespaces { input, json } => {
            let resolution = resolve_input(&input, &config)?;
            let legend = NamespaceLegend {
                generated_at: Utc::now(),
                root_namespace: resolution.root.target_namespace.as_deref(),
                root_prefix: resolution.root.root_prefix.as_deref(),
                namespaces: resolution
                    .namespaces
                    .iter()
                    .map(|(uri, prefix)| LegendEntry { uri, prefix })
                    .collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&legend)?);
            } else {
                print_legend(&legend);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { input } => {
            let resolution = resolve_input(&input, &config)?;
            Ok(check(&resolution, &config.builtin_prefix))
        }
    }
}

/// Log to stderr; `RUST_LOG` applies unless `-v` is given
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_input(input: &Path, config: &ResolverConfig) -> Result<Resolution> {
    tracing::info!("Resolving {}", input.display());
    resolve(input, config).with_context(|| format!("Failed to resolve {}", input.display()))
}

/// Serialize `node` from the merged schema with one declaration per chosen prefix
fn render_xml(resolution: &Resolution, node: &Node, builtin_prefix: &str) -> Result<String> {
    let mut options = WriteOptions::default()
        .with_prefix(XSD_NAMESPACE, builtin_prefix)
        .with_declaration(Some(builtin_prefix), XSD_NAMESPACE);

    if resolution.root.root_prefix.is_none() {
        if let Some(tns) = &resolution.root.target_namespace {
            options = options.with_declaration(None, tns.as_str());
        }
    }
    for (uri, prefix) in resolution.namespaces.iter() {
        options = options
            .with_prefix(uri, prefix)
            .with_declaration(Some(prefix), uri);
    }

    let body = to_xml_string(node, &options)?;
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n"))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn print_legend(legend: &NamespaceLegend<'_>) {
    let root = legend.root_namespace.unwrap_or("(no namespace)");
    match legend.root_prefix {
        Some(prefix) => println!("root: {root} as {prefix}"),
        None => println!("root: {root} (unprefixed)"),
    }

    let width = legend
        .namespaces
        .iter()
        .map(|e| e.prefix.len())
        .max()
        .unwrap_or(0);
    for entry in &legend.namespaces {
        println!("{:<width$}  {}", entry.prefix, entry.uri);
    }
}

/// Print problems found in the merged tree; dangling references fail the check
fn check(resolution: &Resolution, builtin_prefix: &str) -> ExitCode {
    let index = DefinitionIndex::build(&resolution.merged.schema, builtin_prefix);

    for (path, reason) in resolution.skipped_imports() {
        println!("skipped import {path}: {reason}");
    }
    for (category, name) in index.duplicates() {
        println!("duplicate {category} {name}");
    }

    let unresolved = index.unresolved();
    for reference in &unresolved {
        println!(
            "dangling {} \"{}\" at {}",
            reference.attribute,
            reference.value,
            reference.path.join("/")
        );
    }

    println!(
        "{} definitions from {} documents, {} dangling references",
        index.definitions().len(),
        resolution.merged.sources.len(),
        unresolved.len()
    );

    if unresolved.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
