use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shelfscan::{
    ClientConfig, DetectionClient, DetectionResult, IntakeSource, StateKind, SubmissionSession,
    intake::FileCandidate, models::NO_DETECTION_TIPS,
};

#[derive(Parser)]
#[command(name = "shelfscan")]
#[command(about = "Submit product images to a detection service and review the results")]
struct Cli {
    /// Image to submit. Without one, the desktop dashboard opens.
    #[arg(value_name = "IMAGE")]
    image_path: Option<PathBuf>,

    /// Detection API base URL (overrides SHELFSCAN_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides SHELFSCAN_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Bearer token (overrides SHELFSCAN_AUTH_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Print the normalized result as JSON
    #[arg(long)]
    json: bool,

    /// Open the desktop dashboard even when an image is given
    #[arg(long)]
    gui: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shelfscan={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &args.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(secs) = args.timeout {
        anyhow::ensure!(secs > 0, "--timeout must be at least 1 second");
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if args.token.is_some() {
        config = config.with_auth_token(args.token.clone());
    }
    Ok(config)
}

fn print_result(result: &DetectionResult) {
    println!("\n=== Detection Results: {} ===", result.source_file_name);
    println!("Provider: {}", result.provider_label);
    println!("Processing time: {:.1}s", result.processing_seconds);

    if result.item_count == 0 {
        println!("\nNo objects detected.");
        println!("Tips for better detection:");
        for tip in NO_DETECTION_TIPS {
            println!("  - {}", tip);
        }
        return;
    }

    let total = result.reported_total.unwrap_or_else(|| result.total_units());
    println!("Total objects: {}", total);
    println!("Object types: {}", result.item_count);
    println!("Categories: {}", result.categories().join(", "));
    println!("\nDetected objects:");
    for item in &result.items {
        print!(
            "  {} x {} [{}] - confidence: {:.1}%",
            item.count,
            item.label,
            item.category,
            item.confidence * 100.0
        );
        match &item.bounding_box {
            Some(bbox) => println!(
                " at ({:.0}, {:.0}, {:.0}x{:.0})",
                bbox.x, bbox.y, bbox.width, bbox.height
            ),
            None => println!(),
        }
    }
}

async fn detect_once(
    client: &DetectionClient,
    image_path: PathBuf,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = SubmissionSession::new();
    let candidate = FileCandidate::from_path(&image_path, IntakeSource::Picked).await?;
    session.select(candidate)?;

    let state = session
        .submit_with(client)
        .await
        .ok_or_else(|| anyhow::anyhow!("Submission did not start"))?;

    match (state, session.result()) {
        (StateKind::Success | StateKind::Empty, Some(result)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                print_result(result);
            }
            Ok(())
        }
        _ => {
            let message = session.error_message().unwrap_or("Detection failed");
            Err(anyhow::anyhow!("{}", message))
        }
    }
}

// The dashboard drives its own executor, so only the one-shot path gets a runtime here.
fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = build_config(&args)?;
    tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "Loaded configuration");
    let client = DetectionClient::from_config(&config)?;

    match args.image_path {
        Some(path) if !args.gui => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(detect_once(&client, path, args.json)),
        _ => run_gui(client),
    }
}

#[cfg(feature = "gui")]
fn run_gui(client: DetectionClient) -> anyhow::Result<()> {
    shelfscan::gui::run(client).map_err(|e| anyhow::anyhow!("Dashboard failed: {}", e))
}

#[cfg(not(feature = "gui"))]
fn run_gui(_client: DetectionClient) -> anyhow::Result<()> {
    anyhow::bail!("Built without the `gui` feature: pass an IMAGE to run a detection")
}
