use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use illotool_core::analysis::run_analysis;
use illotool_core::runtime::{PathOverrides, ResolutionContext, Runtime, resolve_runtime};
use illotool_core::sync::sync_catalog;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "illotool",
    version,
    about = "Mirror the illustration catalog and analyze the mirrored assets"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    project_root: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    project_root: Option<PathBuf>,
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            project_root: cli.project_root.clone(),
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Download the remote catalog and regenerate the Dart mapping")]
    Sync,
    #[command(about = "Tally fill colors across the mirrored assets")]
    Analyze,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Sync) => run_sync(&runtime),
        Some(Commands::Analyze) => run_analyze(&runtime),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_sync(options: &RuntimeOptions) -> Result<()> {
    let runtime = resolve(options)?;
    let report = sync_catalog(&runtime).context("catalog sync failed")?;

    println!("sync");
    println!(
        "project_root: {}",
        normalize_path(&runtime.paths.project_root)
    );
    println!("catalog_entries: {}", report.catalog_entries);
    println!("downloaded: {}", report.downloaded);
    println!("assets_dir: {}", normalize_path(&runtime.paths.assets_dir));
    println!("mapping_path: {}", normalize_path(&report.mapping_path));
    println!("mapping_members: {}", report.mapping_members);
    println!("mapping_rows: {}", report.mapping_rows);
    println!("formatted: {}", format_flag(report.formatted));
    println!("request_count: {}", report.request_count);
    if report.collisions.is_empty() {
        println!("collisions: <none>");
    } else {
        for collision in &report.collisions {
            println!(
                "collision.{}: {}",
                collision.id,
                collision.titles.join(" | ")
            );
        }
    }
    if options.diagnostics {
        println!("\n[diagnostics]\n{}", runtime.paths.diagnostics());
    }

    Ok(())
}

fn run_analyze(options: &RuntimeOptions) -> Result<()> {
    let runtime = resolve(options)?;
    let output = run_analysis(&runtime.paths).context("corpus analysis failed")?;

    println!("{}", output.colors_json);
    println!("{}", output.colors_per_asset_json);
    println!("analyze");
    println!("assets_dir: {}", normalize_path(&runtime.paths.assets_dir));
    println!("assets_scanned: {}", output.report.assets_scanned);
    println!("distinct_colors: {}", output.report.colors.len());
    println!(
        "colors_report: {}",
        normalize_path(&runtime.paths.colors_report_path)
    );
    println!(
        "colors_per_asset_report: {}",
        normalize_path(&runtime.paths.colors_per_asset_report_path)
    );
    if options.diagnostics {
        println!("\n[diagnostics]\n{}", runtime.paths.diagnostics());
    }

    Ok(())
}

fn resolve(options: &RuntimeOptions) -> Result<Runtime> {
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let overrides = PathOverrides {
        project_root: options.project_root.clone(),
        config: options.config.clone(),
    };

    let initial = resolve_runtime(&context, &overrides)?;
    let project_env = initial.paths.project_root.join(".env");
    if project_env.exists() {
        let _ = dotenvy::from_path_override(&project_env);
        return resolve_runtime(&context, &overrides);
    }
    Ok(initial)
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
