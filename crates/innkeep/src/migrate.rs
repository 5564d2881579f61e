//! Embedded schema migrations.
//!
//! Migrations are plain Rust functions listed in [`crate::migrations::ALL`],
//! ordered by version. Each runs in its own transaction together with the
//! row recording it in `innkeep_migration`, so a failed migration leaves no
//! trace.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use tokio_postgres::{Client, Transaction};
use tracing::Instrument;

use crate::{Error, Result};

/// Table recording applied migrations.
pub const MIGRATION_TABLE: &str = "innkeep_migration";

/// A migration step: receives the open transaction, returns when done.
pub type MigrationFn = for<'a, 't> fn(
    &'a MigrationContext<'t>,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// One embedded migration.
pub struct Migration {
    /// Sortable version, e.g. `2026_01_05_090000-create_app_user`.
    pub version: &'static str,
    /// Short description shown by `status`.
    pub name: &'static str,
    pub run: MigrationFn,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish()
    }
}

/// What a migration function gets to work with.
pub struct MigrationContext<'t> {
    tx: Transaction<'t>,
}

impl MigrationContext<'_> {
    /// Run one or more `;`-separated statements.
    pub async fn execute(&self, sql: &str) -> Result<()> {
        let span = tracing::debug_span!("db.migrate", sql = %sql);
        self.tx.batch_execute(sql).instrument(span).await?;
        Ok(())
    }
}

/// Whether a known migration has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: &'static str,
    pub name: &'static str,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Applies [`Migration`]s in version order against one client.
pub struct MigrationRunner<'c> {
    client: &'c mut Client,
    migrations: &'static [Migration],
}

impl<'c> MigrationRunner<'c> {
    /// A runner for the crate's embedded migrations.
    pub fn new(client: &'c mut Client) -> Self {
        Self::with_migrations(client, crate::migrations::ALL)
    }

    pub fn with_migrations(client: &'c mut Client, migrations: &'static [Migration]) -> Self {
        Self { client, migrations }
    }

    async fn ensure_table(&self) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {MIGRATION_TABLE} (
                version TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        );
        self.client.batch_execute(&sql).await?;
        Ok(())
    }

    async fn applied(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        let sql = format!("SELECT version, applied_at FROM {MIGRATION_TABLE} ORDER BY version");
        let rows = self.client.query(&sql, &[]).await?;
        rows.iter()
            .map(|row| -> Result<(String, DateTime<Utc>)> { Ok((row.try_get(0)?, row.try_get(1)?)) })
            .collect()
    }

    /// Every known migration and whether it has been applied.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        self.ensure_table().await?;
        let applied = self.applied().await?;
        Ok(self
            .migrations
            .iter()
            .map(|m| {
                let applied_at = applied
                    .iter()
                    .find(|(version, _)| version == m.version)
                    .map(|(_, at)| *at);
                MigrationStatus {
                    version: m.version,
                    name: m.name,
                    applied: applied_at.is_some(),
                    applied_at,
                }
            })
            .collect())
    }

    /// Apply every pending migration in order. Returns the versions applied.
    pub async fn migrate(&mut self) -> Result<Vec<&'static str>> {
        self.ensure_table().await?;
        let applied = self.applied().await?;

        let mut ran = Vec::new();
        for migration in self.migrations {
            if applied.iter().any(|(version, _)| version == migration.version) {
                continue;
            }
            tracing::info!(version = migration.version, name = migration.name, "applying migration");
            self.apply(migration).await.map_err(|e| Error::Migration {
                version: migration.version,
                message: e.to_string(),
            })?;
            ran.push(migration.version);
        }
        Ok(ran)
    }

    async fn apply(&mut self, migration: &Migration) -> Result<()> {
        let tx = self.client.transaction().await?;
        let ctx = MigrationContext { tx };
        (migration.run)(&ctx).await?;

        let record = format!("INSERT INTO {MIGRATION_TABLE} (version, name) VALUES ($1, $2)");
        ctx.tx
            .execute(&record, &[&migration.version, &migration.name])
            .await?;
        ctx.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_sorted_and_unique() {
        let versions: Vec<_> = crate::migrations::ALL.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }
}
