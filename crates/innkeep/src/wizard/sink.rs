use std::future::Future;

use super::draft::{HouseRules, StepData};
use crate::aggregate::reconcile_rooms;
use crate::model::{
    AccessibilityRules, AccessibilityRulesFields, BasicInfo, BasicInfoFields, FoodRules,
    FoodRulesFields, GuestProfileRules, GuestProfileRulesFields, IdProof, IdProofFields, Location,
    LocationFields, PetRules, PetRulesFields, PropertyRules, PropertyRulesFields, Room, RoomImage,
    RoomImageFields, RoomPricing, RoomPricingFields, SmokingRules, SmokingRulesFields,
};
use crate::pool::Pool;
use crate::store::Store;
use crate::traced::Connection;
use crate::{Entity, Error, Result};

/// Who a step is saved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub user_id: i64,
    /// `None` only while basic info has not been saved yet.
    pub property_id: Option<i64>,
}

/// What a successful save produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Basic info was written; later steps hang off this property id.
    Property(i64),
    /// Rooms were written; their ids in draft order.
    Rooms(Vec<i64>),
    Saved,
}

/// Persists one wizard step.
pub trait StepSink: Send + Sync {
    fn save(&self, owner: Owner, data: StepData<'_>) -> impl Future<Output = Result<SaveOutcome>> + Send;
}

/// Fields types that carry the owner columns of a property sub-record.
trait OwnedFields: Clone {
    fn owned_by(&self, user_id: i64, property_id: i64) -> Self;
}

macro_rules! owned_fields {
    ($($ty:ty),* $(,)?) => {
        $(
            impl OwnedFields for $ty {
                fn owned_by(&self, user_id: i64, property_id: i64) -> Self {
                    Self { user_id, property_id, ..self.clone() }
                }
            }
        )*
    };
}

owned_fields!(
    LocationFields,
    RoomPricingFields,
    PropertyRulesFields,
    AccessibilityRulesFields,
    FoodRulesFields,
    PetRulesFields,
    SmokingRulesFields,
    GuestProfileRulesFields,
    RoomImageFields,
);

/// [`StepSink`] writing through the entity stores. Each step is saved in
/// its own transaction: one-to-one rows are upserted by property, rooms are
/// reconciled by id, and pricing, ID proofs and images are replaced as a
/// set.
#[derive(Clone)]
pub struct StoreSink {
    pool: Pool,
}

impl StoreSink {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl StepSink for StoreSink {
    async fn save(&self, owner: Owner, data: StepData<'_>) -> Result<SaveOutcome> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        let outcome = save_step(&tx, owner, data).await?;
        tx.commit().await?;
        Ok(outcome)
    }
}

async fn save_step<C: Connection + ?Sized>(conn: &C, owner: Owner, data: StepData<'_>) -> Result<SaveOutcome> {
    let user_id = owner.user_id;
    let property = || {
        owner.property_id.ok_or(Error::Validation {
            fields: vec!["property_id".to_string()],
        })
    };

    match data {
        StepData::BasicInfo(fields) => {
            let store = Store::<BasicInfo>::new();
            let fields = BasicInfoFields {
                user_id,
                ..fields.clone()
            };
            return match owner.property_id {
                Some(id) => {
                    if store.update(conn, id, &fields).await? == 0 {
                        return Err(Error::NotFound {
                            entity: BasicInfo::LABEL,
                            id,
                        });
                    }
                    Ok(SaveOutcome::Property(id))
                }
                None => Ok(SaveOutcome::Property(store.create(conn, &fields).await?)),
            };
        }
        StepData::Location(fields) => {
            let property_id = property()?;
            Store::<Location>::new()
                .upsert_for_property(conn, property_id, &fields.owned_by(user_id, property_id))
                .await?;
        }
        StepData::Rooms(rooms) => {
            let ids = reconcile_rooms(conn, user_id, property()?, rooms.to_vec()).await?;
            return Ok(SaveOutcome::Rooms(ids));
        }
        StepData::Pricing(rows) => {
            let property_id = property()?;
            let owned: Vec<i64> = Store::<Room>::new()
                .list_for_property(conn, property_id)
                .await?
                .iter()
                .map(|r| r.id)
                .collect();
            if let Some(id) = foreign_room(&owned, rows) {
                return Err(Error::NotFound {
                    entity: Room::LABEL,
                    id,
                });
            }
            let store = Store::<RoomPricing>::new();
            store.remove_for_property(conn, property_id).await?;
            for row in rows {
                store.create(conn, &row.owned_by(user_id, property_id)).await?;
            }
        }
        StepData::PropertyRules(fields) => {
            let property_id = property()?;
            Store::<PropertyRules>::new()
                .upsert_for_property(conn, property_id, &fields.owned_by(user_id, property_id))
                .await?;
        }
        StepData::HouseRules(rules) => save_house_rules(conn, user_id, property()?, rules).await?,
        StepData::GuestProfile(fields) => {
            let property_id = property()?;
            Store::<GuestProfileRules>::new()
                .upsert_for_property(conn, property_id, &fields.owned_by(user_id, property_id))
                .await?;
        }
        StepData::IdProofs(proofs) => {
            let property_id = property()?;
            let store = Store::<IdProof>::new();
            store.remove_for_property(conn, property_id).await?;
            for proof_type in proofs {
                let fields = IdProofFields {
                    user_id,
                    property_id,
                    proof_type: *proof_type,
                };
                store.create(conn, &fields).await?;
            }
        }
        StepData::Images(images) => {
            let property_id = property()?;
            let store = Store::<RoomImage>::new();
            store.remove_for_property(conn, property_id).await?;
            for image in images {
                store.create(conn, &image.owned_by(user_id, property_id)).await?;
            }
        }
    }
    Ok(SaveOutcome::Saved)
}

/// First priced room that is not one of the property's rooms.
fn foreign_room(owned: &[i64], rows: &[RoomPricingFields]) -> Option<i64> {
    rows.iter().map(|r| r.room_id).find(|id| !owned.contains(id))
}

async fn save_house_rules<C: Connection + ?Sized>(
    conn: &C,
    user_id: i64,
    property_id: i64,
    rules: &HouseRules,
) -> Result<()> {
    if let Some(fields) = &rules.accessibility {
        Store::<AccessibilityRules>::new()
            .upsert_for_property(conn, property_id, &fields.owned_by(user_id, property_id))
            .await?;
    }
    if let Some(fields) = &rules.food {
        Store::<FoodRules>::new()
            .upsert_for_property(conn, property_id, &fields.owned_by(user_id, property_id))
            .await?;
    }
    if let Some(fields) = &rules.pets {
        Store::<PetRules>::new()
            .upsert_for_property(conn, property_id, &fields.owned_by(user_id, property_id))
            .await?;
    }
    if let Some(fields) = &rules.smoking {
        Store::<SmokingRules>::new()
            .upsert_for_property(conn, property_id, &fields.owned_by(user_id, property_id))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(room_id: i64) -> RoomPricingFields {
        serde_json::from_value(serde_json::json!({
            "user_id": 7, "property_id": 1, "room_id": room_id, "room_type": "Deluxe",
            "base_price": "2500", "available_units": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_pricing_must_target_own_rooms() {
        assert_eq!(foreign_room(&[10, 11], &[priced(10), priced(11)]), None);
        assert_eq!(foreign_room(&[10, 11], &[priced(10), priced(99), priced(98)]), Some(99));
        assert_eq!(foreign_room(&[], &[priced(10)]), Some(10));
        assert_eq!(foreign_room(&[], &[]), None);
    }
}
