//! Sweep command - re-runs the refresh sweep after a reported failure

use tracing::error;

use crate::domain::EntityKind;

/// Sweeps each selected kind; every kind is attempted before failing
pub async fn run(kind: Option<EntityKind>) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let repositories = crate::build_repositories(&config).await?;

    let mut failed = Vec::new();

    for kind in super::kinds(kind) {
        match repositories.refresh(kind).await {
            Ok(report) => println!("{}", report),
            Err(e) => {
                error!(kind = %kind, error = %e, "Sweep failed");
                println!("{}: failed: {}", kind, e);
                failed.push(kind.to_string());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("sweep failed for: {}", failed.join(", "));
    }

    Ok(())
}
