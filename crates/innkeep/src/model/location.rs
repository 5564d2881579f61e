use super::check::not_blank;
use super::table;

table! {
    #[table = "location_details", label = "location"]
    /// Postal address of a property. At most one per property.
    pub struct Location {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        #[validate(custom(function = "not_blank"))]
        pub address_line1: String,
        pub address_line2: Option<String>,
        #[validate(custom(function = "not_blank"))]
        pub city: String,
        #[validate(custom(function = "not_blank"))]
        pub state: String,
        #[validate(custom(function = "not_blank"))]
        pub country: String,
        #[validate(custom(function = "not_blank"), length(max = 16))]
        pub postal_code: String,
    }

    pub struct LocationFields;
}

/// A partial address: only the supplied parts overwrite the stored row.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocationPatch {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl LocationPatch {
    /// True when no part of the address is supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay the supplied parts on `base`.
    pub fn apply(&self, mut base: LocationFields) -> LocationFields {
        fn set(slot: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }
        set(&mut base.address_line1, &self.address_line1);
        set(&mut base.city, &self.city);
        set(&mut base.state, &self.state);
        set(&mut base.country, &self.country);
        set(&mut base.postal_code, &self.postal_code);
        if self.address_line2.is_some() {
            base.address_line2.clone_from(&self.address_line2);
        }
        base
    }

    /// Fields for a brand new row. Missing parts are left blank and fail
    /// validation on write.
    pub fn into_fields(self, user_id: i64, property_id: i64) -> LocationFields {
        let blank = LocationFields {
            user_id,
            property_id,
            address_line1: String::new(),
            address_line2: None,
            city: String::new(),
            state: String::new(),
            country: String::new(),
            postal_code: String::new(),
        };
        self.apply(blank)
    }
}
