//! `serve` command handler.

use folkreel_error::FolkreelResult;
use folkreel_server::{FolkreelApp, FolkreelConfig, serve};

/// Wire the app from `config` and serve until Ctrl-C.
pub async fn run_serve(config: &FolkreelConfig, bind: Option<String>) -> FolkreelResult<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let app = FolkreelApp::from_config(config).await?;

    tracing::info!(%bind, "Folkreel API starting. Press Ctrl+C to stop.");
    serve(app, &bind).await
}
