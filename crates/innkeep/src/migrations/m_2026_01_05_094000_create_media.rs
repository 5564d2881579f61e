use super::{MigrationFuture, run_with_indexes};
use crate::migrate::MigrationContext;

pub(super) fn run<'a>(ctx: &'a MigrationContext<'_>) -> MigrationFuture<'a> {
    run_with_indexes(
        ctx,
        r#"
CREATE TABLE id_proofs (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    proof_type TEXT NOT NULL
);

CREATE TABLE room_images (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    property_id BIGINT NOT NULL,
    room_id BIGINT,
    image_path TEXT NOT NULL,
    original_name TEXT,
    content_type TEXT NOT NULL,
    size_bytes BIGINT NOT NULL,
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#,
        &["id_proofs", "room_images"],
    )
}
