//! `overlap`: lay out overlapping time blocks side by side.
//!
//! Reads a JSON array of blocks (`{"id", "text", "startMinutes",
//! "durationMinutes"}`) from a file or stdin and prints the placement of
//! every block.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use overlap_engine::{add_placing, compute_overlap, PlacementTable, PlanItem};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "overlap",
    version,
    about = "Lay out overlapping time blocks side by side"
)]
struct Cli {
    /// JSON file with an array of blocks. Reads stdin when omitted or "-".
    input: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Emit every block with its percentage geometry instead of raw slots.
    /// Always JSON.
    #[arg(long)]
    placing: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let raw = read_input(cli.input.as_deref())?;
    let items: Vec<PlanItem> =
        serde_json::from_str(&raw).context("Input must be a JSON array of blocks")?;
    info!(blocks = items.len(), "laying out blocks");

    let output = if cli.placing {
        let placed = add_placing(items)?;
        to_json(&placed, cli.pretty)?
    } else {
        let table = compute_overlap(&items)?;
        match cli.format {
            Format::Json => to_json(&slots_by_id(&items, &table), cli.pretty)?,
            Format::Table => render_table(&items, &table),
        }
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}").context("Failed to write output")?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Placements keyed by id, in input order.
fn slots_by_id(items: &[PlanItem], table: &PlacementTable) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    for item in items {
        if let Some(overlap) = table.get(&item.id) {
            let value = serde_json::json!({
                "start": overlap.start,
                "span": overlap.span,
                "columns": overlap.columns,
            });
            map.entry(item.id.clone()).or_insert(value);
        }
    }
    map
}

fn render_table(items: &[PlanItem], table: &PlacementTable) -> String {
    let mut lines = vec!["id\tstart\tspan\tcolumns\twidth".to_string()];
    for item in items {
        if let Some(overlap) = table.get(&item.id) {
            lines.push(format!(
                "{}\t{}\t{}\t{}\t{}",
                item.id,
                overlap.start,
                overlap.span,
                overlap.columns,
                overlap.width()
            ));
        }
    }
    lines.join("\n")
}
