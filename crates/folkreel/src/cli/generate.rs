//! `generate` command handler.

use folkreel_core::{AccountId, SubscriptionTier};
use folkreel_error::FolkreelResult;
use folkreel_server::{FolkreelApp, FolkreelConfig};

const CLI_ACCOUNT: &str = "cli";

/// Run one generation for a throwaway account and print the artifact paths.
pub async fn run_generate(
    config: &FolkreelConfig,
    country: &str,
    tier: SubscriptionTier,
) -> FolkreelResult<()> {
    let app = FolkreelApp::from_config(config).await?;
    let account = AccountId::from(CLI_ACCOUNT);
    app.directory().add_account(&account, tier);

    let outcome = app.service().generate(&account, None, country).await?;
    app.checkpoint().await?;
    let record = &outcome.record;

    println!("Generated {} ({})", record.id, record.country);
    for artifact in record.artifacts.iter() {
        println!("  {:<10} {}", artifact.kind, artifact.path.display());
    }
    if outcome.is_degraded() {
        println!("  degraded: {}", outcome.degraded.join(", "));
    }
    Ok(())
}
