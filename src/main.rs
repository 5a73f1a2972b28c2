use std::path::{Path, PathBuf};

use clap::Parser;

use cairo_lint::cli::{Cli, Commands};
use cairo_lint::config::Settings;
use cairo_lint::facade::SummaryStats;
use cairo_lint::linker::Linker;
use cairo_lint::walker::FileWalker;
use cairo_lint::{facade, logging, report};

fn main() {
    let cli = Cli::parse();

    let mut settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("configuration error: {e}");
        Settings::default()
    });

    let verbose = match &cli.command {
        Commands::Analyze { verbose, .. } => *verbose,
        Commands::Stubs { verbose, .. } => *verbose,
        Commands::Ir { verbose, .. } => *verbose,
    };
    if verbose {
        settings.logging.default = "debug".to_string();
    }
    logging::init_with_config(&settings.logging);

    let exit_code = match &cli.command {
        Commands::Analyze { path, max_paths, json, .. } => {
            let max_paths = max_paths.unwrap_or(settings.analysis.max_paths);
            run_analyze(path, max_paths, *json, &settings)
        }
        Commands::Stubs { path, .. } => run_stubs(path, &settings),
        Commands::Ir { path, .. } => run_ir(path, &settings),
    };

    std::process::exit(exit_code);
}

fn read_sources(paths: &[PathBuf]) -> Vec<(PathBuf, String)> {
    paths
        .iter()
        .filter_map(|path| match std::fs::read_to_string(path) {
            Ok(source) => Some((path.clone(), source)),
            Err(e) => {
                tracing::warn!("skipping '{}': {e}", path.display());
                None
            }
        })
        .collect()
}

fn link_path(path: &Path, settings: &Settings) -> Result<Linker, i32> {
    let walker = FileWalker::new(&settings.walker);
    let discovered = walker.discover(path).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let files = read_sources(&discovered);
    let mut linker = Linker::new();
    linker.link_files(&files);
    Ok(linker)
}

fn run_analyze(path: &Path, max_paths: usize, as_json: bool, settings: &Settings) -> i32 {
    let linker = match link_path(path, settings) {
        Ok(linker) => linker,
        Err(code) => return code,
    };

    let contracts = facade::analyze_contracts(linker.contracts(), max_paths);
    let stats = facade::summary_stats(&contracts);

    if as_json {
        let analysis_report = report::AnalysisReport {
            contracts: contracts.iter().map(report::ContractReport::from).collect(),
            summary: report::SummaryReport::from(stats),
        };
        if let Err(e) = serde_json::to_writer_pretty(std::io::stdout(), &analysis_report) {
            eprintln!("error writing report: {e}");
            return 1;
        }
        println!();
    } else {
        print_summary(&stats);
    }

    0
}

fn run_stubs(path: &Path, settings: &Settings) -> i32 {
    let linker = match link_path(path, settings) {
        Ok(linker) => linker,
        Err(code) => return code,
    };

    let stub_report = report::build_stub_report(&linker);
    if let Err(e) = serde_json::to_writer_pretty(std::io::stdout(), &stub_report) {
        eprintln!("error writing report: {e}");
        return 1;
    }
    println!();
    0
}

fn run_ir(path: &Path, settings: &Settings) -> i32 {
    let linker = match link_path(path, settings) {
        Ok(linker) => linker,
        Err(code) => return code,
    };

    let ir_reports: Vec<report::ContractIrReport> =
        linker.contracts().iter().map(report::ContractIrReport::from).collect();
    if let Err(e) = serde_json::to_writer_pretty(std::io::stdout(), &ir_reports) {
        eprintln!("error writing report: {e}");
        return 1;
    }
    println!();
    0
}

fn print_summary(stats: &SummaryStats) {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("Cairo Contract Analysis Summary");
    println!("{rule}");
    println!();
    println!("Contracts analyzed: {}", stats.total_contracts);
    println!("Total functions: {}", stats.total_functions);
    println!("  - With body: {}", stats.functions_with_body);
    println!("  - Without body: {}", stats.functions_without_body);
    println!();
    println!("Analysis Results:");
    println!("  - Total warnings: {}", stats.total_warnings);
    println!("  - Total errors: {}", stats.total_errors);
    println!();
    println!("Storage Access:");
    println!("  - Storage reads: {}", stats.total_storage_reads);
    println!("  - Storage writes: {}", stats.total_storage_writes);
    println!();
    println!("External Calls:");
    println!("  - Total external calls: {}", stats.total_external_calls);
    println!("{rule}");
}
