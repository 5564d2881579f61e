use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::ValidationError;

use super::check::{non_negative, not_blank, occupancy, refund_tiers};
use super::table;
use crate::jsonb::Jsonb;

/// Price change applied when a room is booked for `guests` people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyAdjustment {
    pub guests: i32,
    pub adjustment: Decimal,
}

/// One cancellation tier: cancelling at least `days_before` days ahead
/// refunds `refund_percent` of the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundTier {
    pub enabled: bool,
    pub days_before: i32,
    pub refund_percent: i32,
}

table! {
    #[table = "room_pricing_availability", label = "room pricing"]
    /// Price and availability of one room configuration.
    pub struct RoomPricing {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        #[validate(range(min = 1))]
        pub room_id: i64,
        #[validate(custom(function = "not_blank"))]
        pub room_type: String,
        #[validate(custom(function = "non_negative"))]
        pub base_price: Decimal,
        #[serde(default)]
        #[validate(custom(function = "occupancy"))]
        pub occupancy_pricing: Jsonb<Vec<OccupancyAdjustment>>,
        #[serde(default)]
        #[validate(custom(function = "refund_tiers"))]
        pub refund_tiers: Jsonb<Vec<RefundTier>>,
        #[validate(range(min = 1))]
        pub available_units: i32,
        pub available_from: Option<NaiveDate>,
        pub available_to: Option<NaiveDate>,
    }

    #[validate(schema(function = "availability_window"))]
    pub struct RoomPricingFields;
}

fn availability_window(fields: &RoomPricingFields) -> Result<(), ValidationError> {
    match (fields.available_from, fields.available_to) {
        (Some(from), Some(to)) if to < from => Err(ValidationError::new("available_to")),
        _ => Ok(()),
    }
}
