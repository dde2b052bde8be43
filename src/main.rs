use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;

use captcha_bench::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config().map_err(|e| anyhow!(e))?;

    captcha_bench::init_logging(&config.logging);

    info!("Starting captcha-bench v{}", env!("CARGO_PKG_VERSION"));
    info!("Model server: {}", config.model_server.base_url);
    info!("Upload directory: {}", config.upload.dir.display());

    captcha_bench::run(config).await
}
