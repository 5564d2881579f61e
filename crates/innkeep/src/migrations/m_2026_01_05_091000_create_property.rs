use super::{MigrationFuture, run_with_indexes};
use crate::migrate::MigrationContext;

pub(super) fn run<'a>(ctx: &'a MigrationContext<'_>) -> MigrationFuture<'a> {
    run_with_indexes(
        ctx,
        r#"
CREATE TABLE basic_info (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_name TEXT NOT NULL CONSTRAINT basic_info_property_name_key UNIQUE,
    property_type TEXT NOT NULL,
    star_rating INTEGER,
    contact_phone TEXT,
    contact_email TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_basic_info_user_id ON basic_info (user_id);

CREATE TABLE location_details (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    address_line1 TEXT NOT NULL,
    address_line2 TEXT,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    country TEXT NOT NULL,
    postal_code TEXT NOT NULL
);
"#,
        &["location_details"],
    )
}
