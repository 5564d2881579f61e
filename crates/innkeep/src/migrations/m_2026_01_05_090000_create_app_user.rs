use super::MigrationFuture;
use crate::migrate::MigrationContext;

pub(super) fn run<'a>(ctx: &'a MigrationContext<'_>) -> MigrationFuture<'a> {
    Box::pin(ctx.execute(
        r#"
CREATE TABLE app_user (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL CONSTRAINT app_user_email_key UNIQUE,
    phone TEXT,
    role TEXT NOT NULL DEFAULT 'guest',
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#,
    ))
}
