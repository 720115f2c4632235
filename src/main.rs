use std::path::PathBuf;

use clap::Parser;
use exam_client::config::{Overrides, Settings};
use exam_client::models::ExamId;
use exam_client::{client, telemetry};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the exam service API
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token from an earlier login; skips the login screen
    #[arg(long)]
    token: Option<String>,

    /// Email to prefill on the login screen
    #[arg(long)]
    email: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long)]
    insecure: bool,

    /// File to write logs to
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Open this exam directly after login
    #[arg(short, long)]
    exam: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("exam-client fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::load()?.with_overrides(Overrides {
        api_url: args.api_url,
        token: args.token,
        email: args.email,
        insecure: args.insecure,
        log_file: args.log_file,
    })?;

    telemetry::init_tracing(settings.telemetry())?;
    tracing::info!(api = %settings.api().base_url, "Starting exam client");

    client::run(settings, args.exam.map(|id| ExamId::from(id.as_str()))).await
}
