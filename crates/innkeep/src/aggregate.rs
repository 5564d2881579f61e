//! Combined property profiles.
//!
//! The [`Aggregator`] composes the per-table stores into the two read
//! models the listing and detail pages need, and applies partial profile
//! updates. Every multi-statement operation runs in one transaction.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{
    AccessibilityRules, BasicInfo, FoodRules, GuestProfileRules, IdProof, Location, LocationPatch,
    PetRules, PropertyRules, Room, RoomFields, RoomImage, RoomPricing, SmokingRules,
};
use crate::pool::Pool;
use crate::store::Store;
use crate::traced::Connection;
use crate::{Entity, Error, Result};

/// Listing view of a property: the anchor row, its address and its rooms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyProfile {
    pub basic_info: BasicInfo,
    pub location: Option<Location>,
    pub rooms: Vec<Room>,
}

/// Everything stored about one property. One-to-many tables are lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDetail {
    pub basic_info: BasicInfo,
    pub location: Option<Location>,
    pub rooms: Vec<Room>,
    pub pricing: Vec<RoomPricing>,
    pub property_rules: Option<PropertyRules>,
    pub accessibility_rules: Option<AccessibilityRules>,
    pub food_rules: Option<FoodRules>,
    pub pet_rules: Option<PetRules>,
    pub smoking_rules: Option<SmokingRules>,
    pub guest_profile_rules: Option<GuestProfileRules>,
    pub id_proofs: Vec<IdProof>,
    pub images: Vec<RoomImage>,
}

/// A room as submitted by a client: `id` is set for rooms that already
/// exist, absent for new ones. Owner columns come from the property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub floor: i32,
    pub room_type: String,
    pub room_count: i32,
    pub capacity: i32,
    pub bed_type: String,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl RoomInput {
    pub fn into_fields(self, user_id: i64, property_id: i64) -> RoomFields {
        RoomFields {
            user_id,
            property_id,
            floor: self.floor,
            room_type: self.room_type,
            room_count: self.room_count,
            capacity: self.capacity,
            bed_type: self.bed_type,
            amenities: self.amenities,
        }
    }
}

impl From<&Room> for RoomInput {
    fn from(room: &Room) -> Self {
        Self {
            id: Some(room.id),
            floor: room.floor,
            room_type: room.room_type.clone(),
            room_count: room.room_count,
            capacity: room.capacity,
            bed_type: room.bed_type.clone(),
            amenities: room.amenities.clone(),
        }
    }
}

/// A partial profile update. Absent or empty parts leave the stored data
/// alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub location: Option<LocationPatch>,
    /// When non-empty, the complete new room set.
    #[serde(default)]
    pub rooms: Vec<RoomInput>,
}

/// What to do with one submitted room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoomAction {
    Update(i64),
    Insert,
}

/// Reconciliation of a stored room set against a submitted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RoomPlan {
    /// One action per submitted room, in submission order.
    pub actions: Vec<RoomAction>,
    /// Stored rooms absent from the submission.
    pub delete: Vec<i64>,
}

/// Match submitted room ids against the stored ones. An id that is not one
/// of the property's rooms, or that appears twice, is rejected.
pub(crate) fn plan_rooms(existing: &[i64], submitted: &[Option<i64>]) -> Result<RoomPlan> {
    let known: HashSet<i64> = existing.iter().copied().collect();
    let mut kept = HashSet::new();
    let mut actions = Vec::with_capacity(submitted.len());

    for id in submitted {
        match *id {
            Some(id) if !known.contains(&id) => {
                return Err(Error::NotFound { entity: Room::LABEL, id });
            }
            Some(id) if !kept.insert(id) => {
                return Err(Error::Validation {
                    fields: vec!["rooms".to_string()],
                });
            }
            Some(id) => actions.push(RoomAction::Update(id)),
            None => actions.push(RoomAction::Insert),
        }
    }

    let delete = existing
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();
    Ok(RoomPlan { actions, delete })
}

/// Make the property's room set equal to `rooms`. Removed rooms take their
/// pricing rows with them. Returns the room ids in submission order.
pub async fn reconcile_rooms<C: Connection + ?Sized>(
    conn: &C,
    user_id: i64,
    property_id: i64,
    rooms: Vec<RoomInput>,
) -> Result<Vec<i64>> {
    let store = Store::<Room>::new();
    let existing: Vec<i64> = store
        .list_for_property(conn, property_id)
        .await?
        .iter()
        .map(|r| r.id)
        .collect();
    let submitted: Vec<Option<i64>> = rooms.iter().map(|r| r.id).collect();
    let plan = plan_rooms(&existing, &submitted)?;

    for id in &plan.delete {
        Store::<RoomPricing>::new()
            .remove_where(conn, "room_id", id)
            .await?;
        store.remove(conn, *id).await?;
    }

    let mut ids = Vec::with_capacity(rooms.len());
    for (room, action) in rooms.into_iter().zip(plan.actions) {
        let fields = room.into_fields(user_id, property_id);
        match action {
            RoomAction::Update(id) => {
                store.update(conn, id, &fields).await?;
                ids.push(id);
            }
            RoomAction::Insert => ids.push(store.create(conn, &fields).await?),
        }
    }
    tracing::debug!(property_id, removed = plan.delete.len(), kept = ids.len(), "rooms reconciled");
    Ok(ids)
}

/// Left-join locations and rooms onto basic info by `property_id`. Every
/// basic info row yields one profile, in input order; children of unknown
/// properties are dropped.
pub fn combine(basics: Vec<BasicInfo>, locations: Vec<Location>, rooms: Vec<Room>) -> Vec<PropertyProfile> {
    let mut profiles: IndexMap<i64, PropertyProfile> = basics
        .into_iter()
        .map(|basic_info| {
            let profile = PropertyProfile {
                basic_info,
                location: None,
                rooms: Vec::new(),
            };
            (profile.basic_info.id, profile)
        })
        .collect();

    for location in locations {
        if let Some(profile) = profiles.get_mut(&location.property_id) {
            profile.location.get_or_insert(location);
        }
    }
    for room in rooms {
        if let Some(profile) = profiles.get_mut(&room.property_id) {
            profile.rooms.push(room);
        }
    }
    profiles.into_values().collect()
}

/// Read every part of property `id`, or `None` without a basic info row.
async fn load_detail<C: Connection + ?Sized>(conn: &C, id: i64) -> Result<Option<PropertyDetail>> {
    let Some(basic_info) = Store::<BasicInfo>::new().get_by_id(conn, id).await? else {
        return Ok(None);
    };
    Ok(Some(PropertyDetail {
        basic_info,
        location: Store::<Location>::new().find_for_property(conn, id).await?,
        rooms: Store::<Room>::new().list_for_property(conn, id).await?,
        pricing: Store::<RoomPricing>::new().list_for_property(conn, id).await?,
        property_rules: Store::<PropertyRules>::new().find_for_property(conn, id).await?,
        accessibility_rules: Store::<AccessibilityRules>::new().find_for_property(conn, id).await?,
        food_rules: Store::<FoodRules>::new().find_for_property(conn, id).await?,
        pet_rules: Store::<PetRules>::new().find_for_property(conn, id).await?,
        smoking_rules: Store::<SmokingRules>::new().find_for_property(conn, id).await?,
        guest_profile_rules: Store::<GuestProfileRules>::new().find_for_property(conn, id).await?,
        id_proofs: Store::<IdProof>::new().list_for_property(conn, id).await?,
        images: Store::<RoomImage>::new().list_for_property(conn, id).await?,
    }))
}

/// Delete every child row of property `id`, dependents first.
async fn delete_children<C: Connection + ?Sized>(conn: &C, id: i64) -> Result<()> {
    Store::<RoomPricing>::new().remove_for_property(conn, id).await?;
    Store::<Room>::new().remove_for_property(conn, id).await?;
    Store::<RoomImage>::new().remove_for_property(conn, id).await?;
    Store::<IdProof>::new().remove_for_property(conn, id).await?;
    Store::<PropertyRules>::new().remove_for_property(conn, id).await?;
    Store::<AccessibilityRules>::new().remove_for_property(conn, id).await?;
    Store::<FoodRules>::new().remove_for_property(conn, id).await?;
    Store::<PetRules>::new().remove_for_property(conn, id).await?;
    Store::<SmokingRules>::new().remove_for_property(conn, id).await?;
    Store::<GuestProfileRules>::new().remove_for_property(conn, id).await?;
    Store::<Location>::new().remove_for_property(conn, id).await?;
    Ok(())
}

/// Profile-level reads and writes over a [`Pool`].
#[derive(Clone)]
pub struct Aggregator {
    pool: Pool,
}

impl Aggregator {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Every property with its location and rooms, ordered by property id.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_combined(&self) -> Result<Vec<PropertyProfile>> {
        let mut conn = self.pool.get().await?;
        let tx = conn.snapshot().await?;
        let basics = Store::<BasicInfo>::new().get_all(&tx).await?;
        let locations = Store::<Location>::new().get_all(&tx).await?;
        let rooms = Store::<Room>::new().get_all(&tx).await?;
        tx.commit().await?;
        Ok(combine(basics, locations, rooms))
    }

    /// The full profile of one property, read from a single snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn get_combined_by_id(&self, id: i64) -> Result<Option<PropertyDetail>> {
        let mut conn = self.pool.get().await?;
        let tx = conn.snapshot().await?;
        let detail = load_detail(&tx, id).await?;
        tx.commit().await?;
        Ok(detail)
    }

    /// Apply `patch` atomically and return the updated profile, or `None`
    /// if the property does not exist.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_profile(&self, id: i64, patch: ProfilePatch) -> Result<Option<PropertyDetail>> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;

        let basic_store = Store::<BasicInfo>::new();
        let Some(basic) = basic_store.get_by_id(&tx, id).await? else {
            return Ok(None);
        };

        if let Some(name) = patch.property_name.filter(|n| *n != basic.property_name) {
            let mut fields = basic.fields();
            fields.property_name = name;
            basic_store.update(&tx, id, &fields).await?;
        }

        if let Some(location) = patch.location.filter(|l| !l.is_empty()) {
            let store = Store::<Location>::new();
            match store.find_for_property(&tx, id).await? {
                Some(existing) => {
                    store
                        .update(&tx, existing.id, &location.apply(existing.fields()))
                        .await?;
                }
                None => {
                    store
                        .create(&tx, &location.into_fields(basic.user_id, id))
                        .await?;
                }
            }
        }

        if !patch.rooms.is_empty() {
            reconcile_rooms(&tx, basic.user_id, id, patch.rooms).await?;
        }

        let detail = load_detail(&tx, id).await?;
        tx.commit().await?;
        Ok(detail)
    }

    /// Delete a property and everything hanging off it. `false` if it did
    /// not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_profile(&self, id: i64) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;

        if Store::<BasicInfo>::new().get_by_id(&tx, id).await?.is_none() {
            return Ok(false);
        }
        delete_children(&tx, id).await?;
        Store::<BasicInfo>::new().remove(&tx, id).await?;
        tx.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::model::PropertyType;

    fn basic(id: i64, name: &str) -> BasicInfo {
        BasicInfo {
            id,
            user_id: 7,
            property_name: name.into(),
            property_type: PropertyType::Villa,
            star_rating: None,
            contact_phone: None,
            contact_email: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn location(id: i64, property_id: i64, city: &str) -> Location {
        Location {
            id,
            user_id: 7,
            property_id,
            address_line1: "1 Main St".into(),
            address_line2: None,
            city: city.into(),
            state: "Goa".into(),
            country: "India".into(),
            postal_code: "403001".into(),
        }
    }

    fn room(id: i64, property_id: i64) -> Room {
        Room {
            id,
            user_id: 7,
            property_id,
            floor: 1,
            room_type: "Deluxe".into(),
            room_count: 2,
            capacity: 2,
            bed_type: "King".into(),
            amenities: vec![],
        }
    }

    #[test]
    fn test_combine_joins_by_property_id() {
        // Location ids deliberately differ from the property ids they belong to.
        let profiles = combine(
            vec![basic(1, "Sea View Villa"), basic(2, "Hill Top")],
            vec![location(10, 2, "Manali"), location(11, 1, "Goa")],
            vec![room(5, 2), room(6, 2), room(7, 1)],
        );
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].basic_info.id, 1);
        assert_eq!(profiles[0].location.as_ref().map(|l| l.city.as_str()), Some("Goa"));
        assert_eq!(profiles[0].rooms.iter().map(|r| r.id).collect::<Vec<_>>(), [7]);
        assert_eq!(profiles[1].location.as_ref().map(|l| l.city.as_str()), Some("Manali"));
        assert_eq!(profiles[1].rooms.iter().map(|r| r.id).collect::<Vec<_>>(), [5, 6]);
    }

    #[test]
    fn test_property_without_rooms_is_listed() {
        let profiles = combine(vec![basic(3, "Bare Plot")], vec![], vec![room(1, 99)]);
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].location.is_none());
        assert!(profiles[0].rooms.is_empty());
    }

    #[test]
    fn test_first_location_wins() {
        let profiles = combine(
            vec![basic(1, "Twice Located")],
            vec![location(4, 1, "First"), location(9, 1, "Second")],
            vec![],
        );
        assert_eq!(profiles[0].location.as_ref().map(|l| l.id), Some(4));
    }

    #[test]
    fn test_plan_rooms() {
        let plan = plan_rooms(&[1, 2, 3], &[Some(2), None, Some(3)]).unwrap();
        assert_eq!(
            plan.actions,
            [RoomAction::Update(2), RoomAction::Insert, RoomAction::Update(3)]
        );
        assert_eq!(plan.delete, [1]);
    }

    #[test]
    fn test_plan_rooms_rejects_foreign_and_duplicate_ids() {
        assert!(matches!(
            plan_rooms(&[1], &[Some(42)]),
            Err(Error::NotFound { entity: "room", id: 42 })
        ));
        assert!(matches!(
            plan_rooms(&[1], &[Some(1), Some(1)]),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_patch_from_json_defaults() {
        let patch: ProfilePatch = serde_json::from_str(r#"{"property_name":"New Name"}"#).unwrap();
        assert_eq!(patch.property_name.as_deref(), Some("New Name"));
        assert!(patch.location.is_none());
        assert!(patch.rooms.is_empty());
    }

    proptest! {
        #[test]
        fn plan_partitions_existing_rooms(
            existing in proptest::collection::btree_set(1i64..50, 0..10),
            picks in proptest::collection::vec(any::<bool>(), 10),
            inserts in 0usize..4,
        ) {
            let existing: Vec<i64> = existing.into_iter().collect();
            let mut submitted: Vec<Option<i64>> = existing
                .iter()
                .zip(&picks)
                .filter(|(_, keep)| **keep)
                .map(|(id, _)| Some(*id))
                .collect();
            submitted.extend(std::iter::repeat_n(None, inserts));

            let plan = plan_rooms(&existing, &submitted).unwrap();
            prop_assert_eq!(plan.actions.len(), submitted.len());

            let mut covered: Vec<i64> = plan
                .actions
                .iter()
                .filter_map(|a| match a {
                    RoomAction::Update(id) => Some(*id),
                    RoomAction::Insert => None,
                })
                .chain(plan.delete.iter().copied())
                .collect();
            covered.sort();
            prop_assert_eq!(covered, existing);
        }
    }
}
