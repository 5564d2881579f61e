use chrono::{DateTime, Utc};

use super::check::not_blank;
use super::table;

table! {
    #[table = "room_images", label = "room image"]
    /// Metadata of an uploaded image. The file itself lives under the upload
    /// directory at `image_path`.
    pub struct RoomImage {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        /// Room the picture shows, or `None` for property-wide pictures.
        pub room_id: Option<i64>,
        /// Generated file name, relative to the configured upload
        /// directory.
        #[validate(custom(function = "not_blank"))]
        pub image_path: String,
        pub original_name: Option<String>,
        #[validate(custom(function = "not_blank"))]
        pub content_type: String,
        #[validate(range(min = 0))]
        pub size_bytes: i64,
    }

    pub struct RoomImageFields;

    read_only {
        pub uploaded_at: DateTime<Utc>,
    }
}
