use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

/// Real-time dialogue-region extraction and translation service.
#[derive(Parser)]
struct Args {
    /// Path to the INI configuration file.
    #[arg(long, env = "KOTRANS_CONFIG", default_value = "settings.ini")]
    config: PathBuf,

    /// Path to the CRAFT textness ONNX model.
    #[arg(long, env = "KOTRANS_CRAFT_MODEL", default_value = "craft.onnx")]
    craft_model: PathBuf,

    /// Address to bind the HTTP server to.
    #[arg(long, env = "KOTRANS_BIND", default_value = "127.0.0.1:8964")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mangatan_ocr_server::logging::init();

    let args = Args::parse();

    let craft_model_bytes = std::fs::read(&args.craft_model).map_err(|e| {
        anyhow::anyhow!(
            "failed to read craft model at {}: {e}",
            args.craft_model.display()
        )
    })?;

    let router = mangatan_ocr_server::create_router(args.config, &craft_model_bytes)?;

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(addr = %args.bind, "listening");

    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "server exited with error");
    }

    Ok(())
}
