//! Flush command - out-of-band cache flush

use crate::domain::EntityKind;

pub async fn run(kind: Option<EntityKind>) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let repositories = crate::build_repositories(&config).await?;

    for kind in super::kinds(kind) {
        let deleted = repositories.flush(kind).await?;
        println!("{}: {} keys deleted", kind, deleted);
    }

    Ok(())
}
