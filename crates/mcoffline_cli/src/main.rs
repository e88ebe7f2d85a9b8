use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use mcoffline_core::converter::DEFAULT_WHITELIST;
use mcoffline_core::{ConversionSummary, ConvertConfig, ConvertedList, Converter, LinkMode};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LinkArg {
    Hardlink,
    Copy,
}

/// Convert an online-mode server's whitelist, ops and player data to
/// offline-mode UUIDs.
///
/// Converted files are written next to the originals with a `.offline`
/// suffix; nothing is modified in place.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Server whitelist, or a player name to print the offline UUID for.
    #[arg(value_name = "WHITELIST.JSON|NAME")]
    target: Option<String>,
    /// How converted player files share data with the originals.
    #[arg(long, value_enum, default_value_t = LinkArg::Hardlink)]
    link: LinkArg,
    /// Skip ops.json instead of failing when the server has none.
    #[arg(long = "allow-missing-ops")]
    allow_missing_ops: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let whitelist = PathBuf::from(cli.target.as_deref().unwrap_or(DEFAULT_WHITELIST));

    // A bare argument that is not a file is taken to be a player name.
    if let Some(name) = cli.target.as_deref() {
        if matches!(whitelist.try_exists(), Ok(false)) {
            println!("{name} {}", mcoffline_core::offline_uuid(name));
            return;
        }
    }

    let config = ConvertConfig::new(whitelist)
        .with_link_mode(to_link_mode(cli.link))
        .with_require_ops(!cli.allow_missing_ops)
        .with_tool_version(TOOL_VERSION);

    let summary = Converter::new(config).run().unwrap_or_else(|e| {
        eprintln!("mcoffline {TOOL_VERSION}: {}", e.message);
        process::exit(1);
    });

    print_summary(&summary);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .init();
}

fn to_link_mode(link: LinkArg) -> LinkMode {
    match link {
        LinkArg::Hardlink => LinkMode::HardLink,
        LinkArg::Copy => LinkMode::Copy,
    }
}

fn print_summary(summary: &ConversionSummary) {
    print_list(&summary.whitelist);
    if let Some(ops) = &summary.ops {
        print_list(ops);
    }
    for category in &summary.categories {
        let report = &category.report;
        println!(
            "{}: {} created, {} already present, {} unmatched",
            report.destination.display(),
            report.created.len(),
            report.already_present.len(),
            report.unmatched.len(),
        );
    }
}

fn print_list(list: &ConvertedList) {
    println!(
        "{}: {} {}",
        list.destination.display(),
        list.records,
        if list.records == 1 { "entry" } else { "entries" }
    );
}
