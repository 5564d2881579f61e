use chrono::{DateTime, Utc};

use super::check::not_blank;
use super::table;
use crate::entity::text_enum;
use crate::error::PROPERTY_NAME_CONSTRAINT;
use crate::store::Store;
use crate::traced::Connection;
use crate::{Error, Result};

text_enum! {
    /// Kind of listed property.
    pub enum PropertyType {
        Hotel => "Hotel",
        Villa => "Villa",
        Apartment => "Apartment",
        Resort => "Resort",
        Homestay => "Homestay",
        GuestHouse => "Guest House",
        Hostel => "Hostel",
        Cottage => "Cottage",
    }
}

table! {
    #[table = "basic_info", label = "property"]
    /// The anchor row of a property profile. Its `id` is the `property_id`
    /// every other sub-record points at.
    pub struct BasicInfo {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(custom(function = "not_blank"), length(max = 200))]
        pub property_name: String,
        pub property_type: PropertyType,
        #[validate(range(min = 1, max = 5))]
        pub star_rating: Option<i32>,
        #[validate(length(max = 32))]
        pub contact_phone: Option<String>,
        #[validate(email)]
        pub contact_email: Option<String>,
    }

    pub struct BasicInfoFields;

    read_only {
        pub created_at: DateTime<Utc>,
    }

    entity {
        async fn check_unique<C: Connection + ?Sized>(
            conn: &C,
            fields: &BasicInfoFields,
            except_id: Option<i64>,
        ) -> Result<()> {
            let taken = Store::<BasicInfo>::new()
                .exists_where(conn, "property_name", &fields.property_name, except_id)
                .await?;
            if taken {
                return Err(Error::DuplicatePropertyName(fields.property_name.clone()));
            }
            Ok(())
        }

        fn unique_violation(constraint: &str, fields: &BasicInfoFields) -> Option<Error> {
            (constraint == PROPERTY_NAME_CONSTRAINT)
                .then(|| Error::DuplicatePropertyName(fields.property_name.clone()))
        }
    }
}

impl BasicInfoFields {
    /// Minimal fields for a new property: no rating, no contact details.
    pub fn new(user_id: i64, property_name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            user_id,
            property_name: property_name.into(),
            property_type,
            star_rating: None,
            contact_phone: None,
            contact_email: None,
        }
    }
}
