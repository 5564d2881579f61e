//! Property listing backend: typed table records, per-table stores, the
//! combined host profile and the onboarding wizard.
//!
//! # Layers
//!
//! - [`Store`]: one table, one statement per operation. Generic over any
//!   [`Connection`] (pooled client or open transaction).
//! - [`Aggregator`]: composes the stores into [`PropertyProfile`] /
//!   [`PropertyDetail`] and applies [`ProfilePatch`]es transactionally.
//! - [`wizard::WizardSession`]: the 11-step onboarding flow, persisting
//!   each step through a [`wizard::StepSink`].
//! - [`Accounts`]: user registration and credential checks.
//!
//! # Naming
//!
//! Table names are kept as the schema has always had them (`basic_info`,
//! `room_setup`, `app_user`, ...). The owning property of every sub-record
//! is its `property_id` column, which holds a `basic_info.id`.
//!
//! # Migrations
//!
//! The schema ships as embedded migrations:
//!
//! ```ignore
//! let mut runner = MigrationRunner::new(&mut client);
//! let applied = runner.migrate().await?;
//! ```

mod aggregate;
mod entity;
mod error;
mod jsonb;
mod migrate;
mod migrations;
pub mod model;
mod pool;
mod store;
mod traced;
mod users;
pub mod wizard;

pub use aggregate::{
    Aggregator, ProfilePatch, PropertyDetail, PropertyProfile, RoomInput, combine, reconcile_rooms,
};
pub use entity::{Entity, OnePerProperty, PropertyScoped};
pub use error::Error;
pub use jsonb::Jsonb;
pub use migrate::{
    MIGRATION_TABLE, Migration, MigrationContext, MigrationFn, MigrationRunner, MigrationStatus,
};
pub use pool::{Pool, PooledConn};
pub use store::Store;
pub use traced::{Connection, ConnectionExt, TracedConn};
pub use users::{Accounts, Credentials, MIN_PASSWORD_LEN, ProfileUpdate, Registration};

/// Result type for innkeep operations.
pub type Result<T> = std::result::Result<T, Error>;
