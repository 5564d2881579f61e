//! Whole-property routes backed by the [`Aggregator`](innkeep::Aggregator).

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use innkeep::model::{BasicInfo, BasicInfoFields, PropertyType};
use innkeep::{Accounts, Entity, ProfilePatch, PropertyDetail, PropertyProfile, Store};
use serde::Deserialize;

use super::envelope::{Created, Envelope};
use super::error::ApiError;
use super::extract::{Body, Id};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/:id", post(create))
        .route("/properties", get(list))
        .route("/property/:id", get(show).put(update).delete(remove))
}

/// Basic info for a new property; the owner comes from the path.
#[derive(Debug, Deserialize)]
pub struct NewProperty {
    pub property_name: String,
    pub property_type: PropertyType,
    #[serde(default)]
    pub star_rating: Option<i32>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl NewProperty {
    fn into_fields(self, user_id: i64) -> BasicInfoFields {
        BasicInfoFields {
            star_rating: self.star_rating,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            ..BasicInfoFields::new(user_id, self.property_name, self.property_type)
        }
    }
}

#[tracing::instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    Id(user_id): Id,
    Body(property): Body<NewProperty>,
) -> Result<(StatusCode, Envelope<Created>), ApiError> {
    let fields = property.into_fields(user_id);
    validator::Validate::validate(&fields)?;

    let conn = state.pool.get().await?;
    if Accounts::new().get_by_id(&conn, user_id).await?.is_none() {
        return Err(innkeep::Error::NotFound { entity: "user", id: user_id }.into());
    }
    let id = Store::<BasicInfo>::new().create(&conn, &fields).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::data(Created { id }).with_message("property created"),
    ))
}

async fn list(State(state): State<AppState>) -> Result<Envelope<Vec<PropertyProfile>>, ApiError> {
    Ok(Envelope::data(state.aggregator.get_all_combined().await?))
}

async fn show(State(state): State<AppState>, Id(id): Id) -> Result<Envelope<PropertyDetail>, ApiError> {
    let detail = state.aggregator.get_combined_by_id(id).await?;
    detail.map(Envelope::data).ok_or_else(|| not_found(id))
}

async fn update(
    State(state): State<AppState>,
    Id(id): Id,
    Body(patch): Body<ProfilePatch>,
) -> Result<Envelope<PropertyDetail>, ApiError> {
    let detail = state.aggregator.update_profile(id, patch).await?;
    detail
        .map(|d| Envelope::data(d).with_message("property updated"))
        .ok_or_else(|| not_found(id))
}

async fn remove(State(state): State<AppState>, Id(id): Id) -> Result<Envelope, ApiError> {
    if !state.aggregator.delete_profile(id).await? {
        return Err(not_found(id));
    }
    Ok(Envelope::message(format!("property {id} deleted")))
}

fn not_found(id: i64) -> ApiError {
    innkeep::Error::NotFound {
        entity: BasicInfo::LABEL,
        id,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_property_takes_owner_from_path() {
        let property: NewProperty = serde_json::from_str(
            r#"{"property_name":"Sea View Villa","property_type":"Villa","star_rating":4}"#,
        )
        .unwrap();
        let fields = property.into_fields(7);
        assert_eq!(fields.user_id, 7);
        assert_eq!(fields.property_type, PropertyType::Villa);
        assert_eq!(fields.star_rating, Some(4));
        assert_eq!(fields.contact_email, None);
    }
}
