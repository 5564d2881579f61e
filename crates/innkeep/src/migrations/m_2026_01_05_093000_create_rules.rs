use super::{MigrationFuture, run_with_indexes};
use crate::migrate::MigrationContext;

pub(super) fn run<'a>(ctx: &'a MigrationContext<'_>) -> MigrationFuture<'a> {
    run_with_indexes(
        ctx,
        r#"
CREATE TABLE property_rules (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    check_in_time TIME NOT NULL,
    check_out_time TIME NOT NULL,
    min_guest_age INTEGER NOT NULL DEFAULT 18,
    smoking_allowed BOOLEAN NOT NULL DEFAULT false,
    alcohol_allowed BOOLEAN NOT NULL DEFAULT false,
    pets_allowed BOOLEAN NOT NULL DEFAULT false,
    outside_food_allowed BOOLEAN NOT NULL DEFAULT false,
    wheelchair_accessible BOOLEAN NOT NULL DEFAULT false,
    unmarried_couples_allowed BOOLEAN NOT NULL DEFAULT false,
    local_ids_allowed BOOLEAN NOT NULL DEFAULT false
);

CREATE TABLE accessibility_rules (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    wheelchair_accessible BOOLEAN NOT NULL,
    elevator_available BOOLEAN NOT NULL,
    accessible_bathroom BOOLEAN NOT NULL,
    notes TEXT
);

CREATE TABLE food_rules (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    outside_food_allowed BOOLEAN NOT NULL,
    food_delivery_allowed BOOLEAN NOT NULL,
    non_veg_allowed BOOLEAN NOT NULL,
    in_house_restaurant BOOLEAN NOT NULL
);

CREATE TABLE pet_rules (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    pets_allowed BOOLEAN NOT NULL,
    pet_fee NUMERIC(12, 2),
    allowed_pets TEXT[] NOT NULL DEFAULT '{}'
);

CREATE TABLE smoking_rules (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    smoking_allowed BOOLEAN NOT NULL,
    designated_area BOOLEAN NOT NULL,
    smoking_in_rooms BOOLEAN NOT NULL
);

CREATE TABLE guest_profile_rules (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    unmarried_couples_allowed BOOLEAN NOT NULL,
    local_ids_allowed BOOLEAN NOT NULL,
    male_only_groups_allowed BOOLEAN NOT NULL,
    min_age INTEGER NOT NULL
);
"#,
        &[
            "property_rules",
            "accessibility_rules",
            "food_rules",
            "pet_rules",
            "smoking_rules",
            "guest_profile_rules",
        ],
    )
}
