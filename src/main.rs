use gmdump::cli::Args;
use gmdump::config::{self, ExportOptions};
use gmdump::core::ConsoleProgress;
use gmdump::emit::Emitter;
use gmdump::export::{ExportContext, Exporter};
use gmdump::ids;
use gmdump::source::SourceData;
use gmdump::utils::imaging::TexturePages;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

fn init_logging(args: &Args) -> Result<()> {
    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt.clone().unwrap_or_else(|| PathBuf::from("gmdump.log"));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("gmdump {} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    let mut options = ExportOptions::resolve(args.config.as_deref(), &path_config)?;
    args.apply(&mut options);
    debug!("Export options: {:?}", options);

    let source = SourceData::load(&args.dump)?;
    let output_root = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(ids::sanitize_name(&source.general.name)));
    info!("Exporting '{}' to {}", source.general.name, output_root.display());

    let textures = TexturePages::from_source(&source);
    let ctx = ExportContext::new(options, source, Box::new(textures), output_root.clone());
    let output = Exporter::new(ctx, Box::new(ConsoleProgress::new()))
        .run()
        .context("Export failed")?;

    Emitter::new(&output_root)
        .emit(&output)
        .with_context(|| format!("Failed to write project to {}", output_root.display()))?;

    output.summary.log();
    if output.summary.failed.is_empty() {
        println!("Exported {} to {}", output.project.file_name(), output_root.display());
    } else {
        warn!("Export finished with {} failed assets", output.summary.failed.len());
        println!(
            "Exported {} to {} ({} assets failed, see log)",
            output.project.file_name(),
            output_root.display(),
            output.summary.failed.len()
        );
    }
    Ok(())
}
