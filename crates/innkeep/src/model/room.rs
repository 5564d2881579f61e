use super::check::{no_blank_items, not_blank};
use super::table;

table! {
    #[table = "room_setup", label = "room"]
    /// One room configuration of a property: a room type on a floor with a
    /// number of identical units.
    pub struct Room {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub floor: i32,
        #[validate(custom(function = "not_blank"))]
        pub room_type: String,
        #[validate(range(min = 1))]
        pub room_count: i32,
        #[validate(range(min = 1))]
        pub capacity: i32,
        #[validate(custom(function = "not_blank"))]
        pub bed_type: String,
        #[serde(default)]
        #[validate(custom(function = "no_blank_items"))]
        pub amenities: Vec<String>,
    }

    pub struct RoomFields;
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use validator::Validate;

    use super::*;

    fn room(room_count: i32, capacity: i32) -> RoomFields {
        RoomFields {
            user_id: 7,
            property_id: 3,
            floor: 1,
            room_type: "Deluxe".into(),
            room_count,
            capacity,
            bed_type: "King".into(),
            amenities: vec!["WiFi".into(), "AC".into()],
        }
    }

    #[test]
    fn test_amenities_default_to_empty() {
        let fields: RoomFields = serde_json::from_str(
            r#"{"user_id":7,"property_id":3,"floor":0,"room_type":"Twin","room_count":2,"capacity":2,"bed_type":"Twin"}"#,
        )
        .unwrap();
        assert!(fields.amenities.is_empty());
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn test_blank_amenity_rejected() {
        let mut fields = room(1, 2);
        fields.amenities.push(" ".into());
        assert!(fields.validate().is_err());
    }

    proptest! {
        #[test]
        fn counts_below_one_are_rejected(room_count in -5i32..5, capacity in -5i32..5) {
            let valid = room(room_count, capacity).validate().is_ok();
            prop_assert_eq!(valid, room_count >= 1 && capacity >= 1);
        }
    }
}
