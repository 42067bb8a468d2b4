use std::fs;
use std::sync::Arc;

use clap::Parser;

use feedwatch::cli::{Cli, Commands, KeywordCommands, SourceCommands};
use feedwatch::config::Config;
use feedwatch::context::AppContext;
use feedwatch::domain::settings::DEFAULT_INTERVAL_MINUTES;
use feedwatch::errors::{WatchError, WatchResult};
use feedwatch::scheduler::Scheduler;
use feedwatch::services::{ImportExportService, RunPipeline, RunReport};
use feedwatch::storage::sqlite::SqliteSourceRepository;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("feedwatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> WatchResult<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let ctx = AppContext::initialize(&config)?;

    match cli.command {
        Commands::Settings => cmd_settings(&ctx),
        Commands::Configure {
            token,
            channel,
            interval,
        } => cmd_configure(&ctx, &token, &channel, interval),
        Commands::Keyword(command) => cmd_keyword(&ctx, command),
        Commands::Source(command) => cmd_source(&ctx, command),
        Commands::Run => cmd_run(&ctx),
        Commands::Watch => cmd_watch(ctx),
    }
}

fn cmd_settings(ctx: &AppContext) -> WatchResult<()> {
    match ctx.admin.get_settings()? {
        None => {
            println!("Pipeline is not configured. Run `feedwatch configure` first.");
        }
        Some(settings) => {
            println!("Channel: {}", settings.channel_id);
            println!("Interval: {} minutes", settings.interval_minutes);
            match settings.last_run_at {
                Some(at) => println!("Last run: {}", at.to_rfc3339()),
                None => println!("Last run: never"),
            }
        }
    }
    Ok(())
}

fn cmd_configure(
    ctx: &AppContext,
    token: &str,
    channel: &str,
    interval: u32,
) -> WatchResult<()> {
    ctx.admin.set_settings(token, channel, interval)?;
    println!(
        "Settings saved. Channel {}, polling every {} minutes.",
        channel, interval
    );
    Ok(())
}

fn cmd_keyword(ctx: &AppContext, command: KeywordCommands) -> WatchResult<()> {
    match command {
        KeywordCommands::Add { keyword } => {
            if ctx.admin.add_keyword(&keyword)? {
                println!("Keyword added: {}", keyword.trim());
            } else {
                println!("Keyword already exists: {}", keyword.trim());
            }
        }
        KeywordCommands::Remove { keyword } => {
            ctx.admin.remove_keyword(&keyword)?;
            println!("Keyword removed: {}", keyword.trim());
        }
        KeywordCommands::List => {
            let keywords = ctx.admin.list_keywords()?;
            if keywords.is_empty() {
                println!("No keywords configured.");
            } else {
                println!("Configured keywords:\n");
                for keyword in keywords {
                    println!("  {}", keyword);
                }
            }
        }
    }
    Ok(())
}

fn cmd_source(ctx: &AppContext, command: SourceCommands) -> WatchResult<()> {
    match command {
        SourceCommands::Add { url } => {
            if ctx.admin.add_source(&url)? {
                println!("Source added: {}", url.trim());
            } else {
                println!("Source already exists: {}", url.trim());
            }
        }
        SourceCommands::Remove { url } => {
            ctx.admin.remove_source(&url)?;
            println!("Source removed: {}", url.trim());
        }
        SourceCommands::List => {
            let sources = ctx.admin.list_sources()?;
            if sources.is_empty() {
                println!("No sources configured.");
            } else {
                println!("Configured sources:\n");
                for url in sources {
                    println!("  {}", url);
                }
            }
        }
        SourceCommands::Import { path } => cmd_import(ctx, &path)?,
        SourceCommands::Export { output } => cmd_export(ctx, output)?,
    }
    Ok(())
}

fn cmd_import(ctx: &AppContext, path: &str) -> WatchResult<()> {
    let content = fs::read_to_string(path)?;
    let service = ImportExportService::new(SqliteSourceRepository::new(ctx.storage.clone()));

    println!("Importing sources from {}...\n", path);

    let result = service.import_opml(&content)?;

    if !result.added.is_empty() {
        println!("Added {} sources:", result.added.len());
        for url in &result.added {
            println!("  + {}", url);
        }
        println!();
    }

    if !result.duplicates.is_empty() {
        println!("Skipped {} duplicates:", result.duplicates.len());
        for url in &result.duplicates {
            println!("  - {}", url);
        }
        println!();
    }

    if !result.invalid.is_empty() {
        println!("Rejected {} entries:", result.invalid.len());
        for (url, error) in &result.invalid {
            println!("  ! {}: {}", url, error);
        }
        println!();
    }

    println!(
        "Import complete: {} added, {} duplicates, {} rejected",
        result.added.len(),
        result.duplicates.len(),
        result.invalid.len()
    );

    Ok(())
}

fn cmd_export(ctx: &AppContext, output: Option<String>) -> WatchResult<()> {
    let service = ImportExportService::new(SqliteSourceRepository::new(ctx.storage.clone()));
    let opml = service.export_opml()?;

    match output {
        Some(path) => {
            fs::write(&path, &opml)?;
            println!("Exported sources to {}", path);
        }
        None => {
            println!("{}", opml);
        }
    }

    Ok(())
}

fn cmd_run(ctx: &AppContext) -> WatchResult<()> {
    println!("Running pipeline...");

    match ctx.pipeline.try_run() {
        Ok(Some(report)) => {
            print_report(&report);
            Ok(())
        }
        Ok(None) => {
            println!("A run is already in progress; this trigger was dropped.");
            Ok(())
        }
        Err(WatchError::ConfigMissing) => {
            println!("Pipeline is not configured. Run `feedwatch configure` first.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn print_report(report: &RunReport) {
    println!(
        "Polled {} sources ({} failed).",
        report.sources_polled + report.sources_failed,
        report.sources_failed
    );
    println!(
        "Evaluated {} new entries, skipped {} already seen.",
        report.entries_evaluated, report.entries_skipped
    );
    println!(
        "Matched {}, delivered {} ({} delivery failures).",
        report.matched, report.delivered, report.delivery_failures
    );
}

fn cmd_watch(ctx: AppContext) -> WatchResult<()> {
    let interval = match ctx.admin.get_settings()? {
        Some(settings) => settings.interval(),
        None => {
            println!(
                "Pipeline is not configured; ticking every {} minutes until it is.",
                DEFAULT_INTERVAL_MINUTES
            );
            std::time::Duration::from_secs(u64::from(DEFAULT_INTERVAL_MINUTES) * 60)
        }
    };

    let scheduler = Scheduler::start(Arc::clone(&ctx.pipeline), interval);

    println!(
        "Watching feeds every {} minutes. Press Ctrl-C to stop.",
        interval.as_secs() / 60
    );

    scheduler.join();
    Ok(())
}
