// CBL dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the table)
// 2. Load config
// 3. Build the HTTP source and dashboard
// 4. Build the requested page's table
// 5. Validate and apply filters
// 6. Print the table or write it as CSV

use cbl_app::cli::Args;
use cbl_app::dashboard::Dashboard;
use cbl_app::render;
use cbl_app::source::HttpSource;
use cbl_core::config;

use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Initialize tracing
    init_tracing()?;
    info!("CBL dashboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: season={}, cache ttl {}s",
        config.season, config.cache_ttl_secs
    );

    // 3. Build source and dashboard
    let source = HttpSource::from_config(&config.sources);
    let dashboard = Dashboard::new(config, source);

    // 4. Build the page table
    let page = args.page;
    let mut table = dashboard
        .page(page, chrono::Utc::now())
        .await
        .with_context(|| format!("failed to build the {page} table"))?;
    info!("{page} table built: {} rows", table.len());

    // 5. Filters
    let filter = page
        .build_filter(&args.selection(), &table)
        .context("invalid filter")?;
    filter.apply(&mut table);
    info!("{} rows after filtering", table.len());

    // 6. Output
    let formats = page.column_formats();
    match &args.csv {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            render::write_csv(&table, &formats, file)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => print!("{}", render::render_text(&table, &formats)),
    }

    Ok(())
}

/// Initialize tracing to log to a file so stdout only carries table output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("cbl.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("cbl=info,cbl_app=info,cbl_baseball=info,cbl_core=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
