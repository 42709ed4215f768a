use clap::Parser;
use rhodl_core::config::Settings;
use rhodl_core::ingest::provider::CoinglassClient;
use rhodl_core::pipeline::{self, RunOptions, SyncMode};
use rhodl_core::sheets::google::GoogleSheetsClient;
use rhodl_core::sheets::sink::WORKSHEET_TITLE;
use rhodl_core::storage::snapshot::DEFAULT_OUTFILE;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "rhodl_worker",
    about = "Fetch the Bitcoin RHODL Ratio and sync it into columns A/B of the RHODL worksheet"
)]
struct Args {
    /// Append only new days into columns A/B instead of overwriting them.
    #[arg(long)]
    append: bool,

    /// Path to save the RHODL JSON snapshot.
    #[arg(long, default_value = DEFAULT_OUTFILE)]
    outfile: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let project_root = rhodl_core::config::project_root();
    let settings = Settings::load(&project_root)?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    if let Err(err) = run(&settings, &args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "rhodl sync failed");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let source = CoinglassClient::from_settings(settings)?;
    let opts = RunOptions {
        mode: if args.append {
            SyncMode::Append
        } else {
            SyncMode::Overwrite
        },
        outfile: args.outfile.clone(),
    };

    let summary =
        pipeline::run_pipeline(&source, || GoogleSheetsClient::connect(settings), &opts).await?;

    tracing::info!(
        mode = ?opts.mode,
        records = summary.records,
        rows_written = summary.rows_written,
        worksheet = WORKSHEET_TITLE,
        "rhodl sync finished"
    );
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
