//! House rules: the general policy row plus the per-topic rule tables.
//! Each is one row per property.

use chrono::NaiveTime;
use rust_decimal::Decimal;

use super::check::{no_blank_items, optional_non_negative};
use super::table;

table! {
    #[table = "property_rules", label = "property rules"]
    pub struct PropertyRules {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub check_in_time: NaiveTime,
        pub check_out_time: NaiveTime,
        #[validate(range(min = 0, max = 120))]
        pub min_guest_age: i32,
        pub smoking_allowed: bool,
        pub alcohol_allowed: bool,
        pub pets_allowed: bool,
        pub outside_food_allowed: bool,
        pub wheelchair_accessible: bool,
        pub unmarried_couples_allowed: bool,
        pub local_ids_allowed: bool,
    }

    pub struct PropertyRulesFields;
}

table! {
    #[table = "accessibility_rules", label = "accessibility rules"]
    pub struct AccessibilityRules {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub wheelchair_accessible: bool,
        pub elevator_available: bool,
        pub accessible_bathroom: bool,
        #[validate(length(max = 2000))]
        pub notes: Option<String>,
    }

    pub struct AccessibilityRulesFields;
}

table! {
    #[table = "food_rules", label = "food rules"]
    pub struct FoodRules {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub outside_food_allowed: bool,
        pub food_delivery_allowed: bool,
        pub non_veg_allowed: bool,
        pub in_house_restaurant: bool,
    }

    pub struct FoodRulesFields;
}

table! {
    #[table = "pet_rules", label = "pet rules"]
    pub struct PetRules {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub pets_allowed: bool,
        #[validate(custom(function = "optional_non_negative"))]
        pub pet_fee: Option<Decimal>,
        /// Kinds of pets accepted, e.g. "dog", "cat".
        #[serde(default)]
        #[validate(custom(function = "no_blank_items"))]
        pub allowed_pets: Vec<String>,
    }

    pub struct PetRulesFields;
}

table! {
    #[table = "smoking_rules", label = "smoking rules"]
    pub struct SmokingRules {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub smoking_allowed: bool,
        pub designated_area: bool,
        pub smoking_in_rooms: bool,
    }

    pub struct SmokingRulesFields;
}

table! {
    #[table = "guest_profile_rules", label = "guest profile rules"]
    pub struct GuestProfileRules {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub unmarried_couples_allowed: bool,
        pub local_ids_allowed: bool,
        pub male_only_groups_allowed: bool,
        #[validate(range(min = 0, max = 120))]
        pub min_age: i32,
    }

    pub struct GuestProfileRulesFields;
}
