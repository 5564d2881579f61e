use super::{MigrationFuture, run_with_indexes};
use crate::migrate::MigrationContext;

pub(super) fn run<'a>(ctx: &'a MigrationContext<'_>) -> MigrationFuture<'a> {
    run_with_indexes(
        ctx,
        r#"
CREATE TABLE room_setup (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    floor INTEGER NOT NULL,
    room_type TEXT NOT NULL,
    room_count INTEGER NOT NULL,
    capacity INTEGER NOT NULL,
    bed_type TEXT NOT NULL,
    amenities TEXT[] NOT NULL DEFAULT '{}'
);

CREATE TABLE room_pricing_availability (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    room_id BIGINT NOT NULL,
    room_type TEXT NOT NULL,
    base_price NUMERIC(12, 2) NOT NULL,
    occupancy_pricing JSONB NOT NULL DEFAULT '[]',
    refund_tiers JSONB NOT NULL DEFAULT '[]',
    available_units INTEGER NOT NULL,
    available_from DATE,
    available_to DATE
);

CREATE INDEX idx_room_pricing_availability_room_id ON room_pricing_availability (room_id);
"#,
        &["room_setup", "room_pricing_availability"],
    )
}
