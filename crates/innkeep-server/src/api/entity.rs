//! Uniform CRUD routes, one router per table.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use innkeep::{Entity, Store};

use super::envelope::{Created, Envelope};
use super::error::ApiError;
use super::extract::{Id, Valid};
use crate::AppState;

/// `POST /`, `GET /`, and `GET|PUT|DELETE /:id` for `E`.
pub fn router<E: Entity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<E>).post(create::<E>))
        .route("/:id", get(show::<E>).put(update::<E>).delete(remove::<E>))
}

#[tracing::instrument(skip_all, fields(entity = E::LABEL))]
async fn create<E: Entity>(
    State(state): State<AppState>,
    Valid(fields): Valid<E::Fields>,
) -> Result<(StatusCode, Envelope<Created>), ApiError> {
    let conn = state.pool.get().await?;
    let id = Store::<E>::new().create(&conn, &fields).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::data(Created { id }).with_message(format!("{} created", E::LABEL)),
    ))
}

#[tracing::instrument(skip_all, fields(entity = E::LABEL))]
async fn list<E: Entity>(State(state): State<AppState>) -> Result<Envelope<Vec<E>>, ApiError> {
    let conn = state.pool.get().await?;
    Ok(Envelope::data(Store::<E>::new().get_all(&conn).await?))
}

#[tracing::instrument(skip_all, fields(entity = E::LABEL))]
async fn show<E: Entity>(State(state): State<AppState>, Id(id): Id) -> Result<Envelope<E>, ApiError> {
    let conn = state.pool.get().await?;
    Ok(Envelope::data(Store::<E>::new().fetch(&conn, id).await?))
}

#[tracing::instrument(skip_all, fields(entity = E::LABEL))]
async fn update<E: Entity>(
    State(state): State<AppState>,
    Id(id): Id,
    Valid(fields): Valid<E::Fields>,
) -> Result<Envelope<E>, ApiError> {
    let conn = state.pool.get().await?;
    let store = Store::<E>::new();
    if store.update(&conn, id, &fields).await? == 0 {
        return Err(not_found::<E>(id));
    }
    Ok(Envelope::data(store.fetch(&conn, id).await?).with_message(format!("{} updated", E::LABEL)))
}

#[tracing::instrument(skip_all, fields(entity = E::LABEL))]
async fn remove<E: Entity>(State(state): State<AppState>, Id(id): Id) -> Result<Envelope, ApiError> {
    let conn = state.pool.get().await?;
    if Store::<E>::new().remove(&conn, id).await? == 0 {
        return Err(not_found::<E>(id));
    }
    Ok(Envelope::message(format!("{} {id} deleted", E::LABEL)))
}

fn not_found<E: Entity>(id: i64) -> ApiError {
    innkeep::Error::NotFound { entity: E::LABEL, id }.into()
}
