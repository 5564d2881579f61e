//! Account routes under `/auth`.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use innkeep::model::User;
use innkeep::{Accounts, Credentials, ProfileUpdate, Registration};

use super::envelope::{Created, Envelope};
use super::error::ApiError;
use super::extract::{Body, Id, Valid};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/:id", get(show).put(update).delete(remove))
}

async fn register(
    State(state): State<AppState>,
    Valid(registration): Valid<Registration>,
) -> Result<(StatusCode, Envelope<Created>), ApiError> {
    let conn = state.pool.get().await?;
    let id = Accounts::new().register(&conn, &registration).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::data(Created { id }).with_message("account created"),
    ))
}

async fn login(
    State(state): State<AppState>,
    Body(credentials): Body<Credentials>,
) -> Result<Envelope<User>, ApiError> {
    let conn = state.pool.get().await?;
    let user = Accounts::new().login(&conn, &credentials).await?;
    Ok(Envelope::data(user).with_message("login successful"))
}

async fn list(State(state): State<AppState>) -> Result<Envelope<Vec<User>>, ApiError> {
    let conn = state.pool.get().await?;
    Ok(Envelope::data(Accounts::new().get_all(&conn).await?))
}

async fn show(State(state): State<AppState>, Id(id): Id) -> Result<Envelope<User>, ApiError> {
    let conn = state.pool.get().await?;
    let user = Accounts::new().get_by_id(&conn, id).await?;
    user.map(Envelope::data).ok_or_else(|| not_found(id))
}

async fn update(
    State(state): State<AppState>,
    Id(id): Id,
    Body(update): Body<ProfileUpdate>,
) -> Result<Envelope<User>, ApiError> {
    let conn = state.pool.get().await?;
    let user = Accounts::new().update(&conn, id, update).await?;
    Ok(Envelope::data(user).with_message("account updated"))
}

async fn remove(State(state): State<AppState>, Id(id): Id) -> Result<Envelope, ApiError> {
    let conn = state.pool.get().await?;
    if Accounts::new().remove(&conn, id).await? == 0 {
        return Err(not_found(id));
    }
    Ok(Envelope::message(format!("user {id} deleted")))
}

fn not_found(id: i64) -> ApiError {
    innkeep::Error::NotFound { entity: "user", id }.into()
}
