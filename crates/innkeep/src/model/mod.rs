//! Table records.
//!
//! Every table is declared once with [`table!`]: the record read back from
//! the table (`id` plus every column), its writable `Fields`, and the
//! [`Entity`](crate::Entity) impl tying both to the generic store.
//!
//! Table names follow the existing schema (`basic_info`, `room_setup`, ...)
//! rather than a singular/plural convention.

mod basic_info;
mod check;
mod id_proof;
mod image;
mod location;
mod pricing;
mod room;
mod rules;
mod user;

pub use basic_info::{BasicInfo, BasicInfoFields, PropertyType};
pub use id_proof::{IdProof, IdProofFields, IdProofType};
pub use image::{RoomImage, RoomImageFields};
pub use location::{Location, LocationFields, LocationPatch};
pub use pricing::{OccupancyAdjustment, RefundTier, RoomPricing, RoomPricingFields};
pub use room::{Room, RoomFields};
pub use rules::{
    AccessibilityRules, AccessibilityRulesFields, FoodRules, FoodRulesFields, GuestProfileRules,
    GuestProfileRulesFields, PetRules, PetRulesFields, PropertyRules, PropertyRulesFields,
    SmokingRules, SmokingRulesFields,
};
pub use user::{User, UserFields, UserRole};

/// Declares a table record, its writable fields and its `Entity` impl.
///
/// Field attributes (validation, serde defaults) apply to the `Fields`
/// struct only; the record is plain output. Columns listed under
/// `read_only` are selected but never written. Items in the optional
/// `entity` block are added to the `Entity` impl.
macro_rules! table {
    (
        #[table = $table:literal, label = $label:literal]
        $(#[$rmeta:meta])*
        pub struct $record:ident {
            $( $(#[$fmeta:meta])* pub $field:ident : $fty:ty, )*
        }

        $(#[$wmeta:meta])*
        pub struct $fields:ident;

        $( read_only { $( pub $ro:ident : $roty:ty, )* } )?

        $( entity { $($hook:item)* } )?
    ) => {
        $(#[$rmeta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $record {
            pub id: i64,
            $( pub $field: $fty, )*
            $($( pub $ro: $roty, )*)?
        }

        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, validator::Validate)]
        $(#[$wmeta])*
        pub struct $fields {
            $( $(#[$fmeta])* pub $field: $fty, )*
        }

        impl $record {
            /// The writable part of this record.
            pub fn fields(&self) -> $fields {
                $fields {
                    $( $field: self.$field.clone(), )*
                }
            }
        }

        impl $crate::entity::Entity for $record {
            const TABLE: &'static str = $table;
            const LABEL: &'static str = $label;
            const COLUMNS: &'static [&'static str] = &[$(stringify!($field)),*];
            const READ_ONLY: &'static [&'static str] = &[$($(stringify!($ro)),*)?];

            type Fields = $fields;

            fn id(&self) -> i64 {
                self.id
            }

            fn from_row(row: &tokio_postgres::Row) -> $crate::Result<Self> {
                Ok(Self {
                    id: $crate::entity::column(row, $table, "id")?,
                    $( $field: $crate::entity::column(row, $table, stringify!($field))?, )*
                    $($( $ro: $crate::entity::column(row, $table, stringify!($ro))?, )*)?
                })
            }

            fn params(fields: &$fields) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
                vec![$( &fields.$field as &(dyn tokio_postgres::types::ToSql + Sync) ),*]
            }

            $($($hook)*)?
        }
    };
}

pub(crate) use table;

/// Implements `PropertyScoped` (and `OnePerProperty` for the `one:` list)
/// for records with a `property_id` column.
macro_rules! property_scoped {
    (one: $($one:ty),* ; many: $($many:ty),* $(;)?) => {
        $(
            impl $crate::entity::PropertyScoped for $one {
                fn property_id(&self) -> i64 {
                    self.property_id
                }
            }

            impl $crate::entity::OnePerProperty for $one {}
        )*
        $(
            impl $crate::entity::PropertyScoped for $many {
                fn property_id(&self) -> i64 {
                    self.property_id
                }
            }
        )*
    };
}

property_scoped! {
    one: Location, PropertyRules, AccessibilityRules, FoodRules, PetRules, SmokingRules,
        GuestProfileRules;
    many: Room, RoomPricing, IdProof, RoomImage;
}
