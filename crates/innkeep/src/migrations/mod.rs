//! The schema, as an ordered list of migrations.
//!
//! Foreign keys are plain `BIGINT` columns without `ON DELETE CASCADE`;
//! deleting a property's children is the aggregator's job.

use std::future::Future;
use std::pin::Pin;

use crate::Result;
use crate::migrate::{Migration, MigrationContext};

mod m_2026_01_05_090000_create_app_user;
mod m_2026_01_05_091000_create_property;
mod m_2026_01_05_092000_create_rooms;
mod m_2026_01_05_093000_create_rules;
mod m_2026_01_05_094000_create_media;

type MigrationFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Every migration, oldest first.
pub static ALL: &[Migration] = &[
    Migration {
        version: "2026_01_05_090000-create_app_user",
        name: "create app_user",
        run: m_2026_01_05_090000_create_app_user::run,
    },
    Migration {
        version: "2026_01_05_091000-create_property",
        name: "create basic_info and location_details",
        run: m_2026_01_05_091000_create_property::run,
    },
    Migration {
        version: "2026_01_05_092000-create_rooms",
        name: "create room_setup and room_pricing_availability",
        run: m_2026_01_05_092000_create_rooms::run,
    },
    Migration {
        version: "2026_01_05_093000-create_rules",
        name: "create property_rules and the per-topic rule tables",
        run: m_2026_01_05_093000_create_rules::run,
    },
    Migration {
        version: "2026_01_05_094000-create_media",
        name: "create id_proofs and room_images",
        run: m_2026_01_05_094000_create_media::run,
    },
];

/// `CREATE INDEX` on `property_id`, named after the table.
fn property_index(table: &str) -> String {
    format!(
        "CREATE INDEX {} ON {} (property_id)",
        innkeep_sql::quote_ident(&innkeep_sql::index_name(table, &["property_id"])),
        innkeep_sql::quote_ident(table),
    )
}

/// Runs `sql` and then a `property_id` index for each of `tables`.
fn run_with_indexes<'a>(
    ctx: &'a MigrationContext<'_>,
    sql: &'static str,
    tables: &'static [&'static str],
) -> MigrationFuture<'a> {
    Box::pin(async move {
        ctx.execute(sql).await?;
        for table in tables {
            ctx.execute(&property_index(table)).await?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_index_sql() {
        assert_eq!(
            property_index("room_setup"),
            r#"CREATE INDEX "idx_room_setup_property_id" ON "room_setup" (property_id)"#
        );
    }
}
