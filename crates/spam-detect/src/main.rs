use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use spam_classifier::{train, TrainingConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod server;

/// Trains the spam classifier, then classifies one message or serves the
/// HTTP API.
#[derive(Debug, Parser)]
#[clap(name = "spam-detect", version, about = "Email Spam Detection")]
struct Opt {
    /// Classify this message and exit instead of starting the server.
    #[clap(long)]
    message: Option<String>,

    #[clap(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    #[clap(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Labelled CSV with `v1` (label) and `v2` (text) columns.
    #[clap(long, env = "SPAM_DATASET", default_value = "data/spam.csv")]
    dataset: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let opt = Opt::parse();

    let config = TrainingConfig::default().with_dataset(&opt.dataset);
    let trained = tokio::task::spawn_blocking(move || train(&config))
        .await?
        .with_context(|| format!("could not train on {}", opt.dataset.display()))?;
    let predictor = Arc::new(trained.predictor);

    if let Some(message) = opt.message {
        let prediction = predictor.predict(&message)?;
        println!("The message is classified as: {prediction}");
        return Ok(());
    }

    let addr = SocketAddr::new(opt.host, opt.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!("Web interface available at http://{addr}/web");
    server::serve(listener, predictor).await
}
