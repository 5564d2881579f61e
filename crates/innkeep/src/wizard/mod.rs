//! Host onboarding wizard.
//!
//! A [`WizardSession`] is a plain value: every transition consumes the
//! session and hands back the next one. Each step owns a slice of the
//! [`Draft`]; saving a step persists that slice through a [`StepSink`] and
//! marks the step saved. Editing a slice un-marks it.
//!
//! ```ignore
//! let session = WizardSession::new(user_id)
//!     .with_basic_info(BasicInfoFields::new(user_id, "Sea View Villa", PropertyType::Villa));
//! let session = session.next(&sink).await?; // saves step 1, moves to step 2
//! ```

mod draft;
mod sink;
mod step;

use std::collections::BTreeSet;

use thiserror::Error;

pub use draft::{Draft, HouseRules, StepData};
pub use sink::{Owner, SaveOutcome, StepSink, StoreSink};
pub use step::Step;

use crate::aggregate::RoomInput;
use crate::model::{
    BasicInfoFields, GuestProfileRulesFields, IdProofType, LocationFields, PropertyRulesFields,
    RoomImageFields, RoomPricingFields,
};

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("basic info must be saved before {0}")]
    MissingProperty(Step),

    #[error("nothing entered for {0}")]
    EmptyStep(Step),

    #[error("already at the first step")]
    AtFirstStep,

    #[error("already at the last step")]
    AtLastStep,

    #[error("saving {step} failed: {source}")]
    Save {
        step: Step,
        #[source]
        source: crate::Error,
    },
}

/// A refused transition: the error plus the session exactly as it was.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    #[source]
    pub error: WizardError,
    pub session: WizardSession,
}

/// Outcome of a session transition.
pub type Transition = std::result::Result<WizardSession, Box<Rejected>>;

/// One host's progress through the onboarding steps.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSession {
    user_id: i64,
    step: Step,
    property_id: Option<i64>,
    saved: BTreeSet<Step>,
    draft: Draft,
}

impl WizardSession {
    /// A fresh session on step 1 with an empty draft.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            step: Step::FIRST,
            property_id: None,
            saved: BTreeSet::new(),
            draft: Draft::default(),
        }
    }

    /// Continue editing an existing property. Basic info resaves update it.
    pub fn resume(user_id: i64, property_id: i64, draft: Draft) -> Self {
        Self {
            property_id: Some(property_id),
            draft,
            ..Self::new(user_id)
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// The property created by step 1, once it has been saved.
    pub fn property_id(&self) -> Option<i64> {
        self.property_id
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_saved(&self, step: Step) -> bool {
        self.saved.contains(&step)
    }

    pub fn saved_steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.saved.iter().copied()
    }

    /// Every step is durably saved.
    pub fn is_complete(&self) -> bool {
        self.saved.len() == Step::ALL.len()
    }

    fn edited(mut self, step: Step, edit: impl FnOnce(&mut Draft)) -> Self {
        edit(&mut self.draft);
        self.saved.remove(&step);
        self
    }

    pub fn with_basic_info(self, fields: BasicInfoFields) -> Self {
        self.edited(Step::BasicInfo, |d| d.basic_info = Some(fields))
    }

    pub fn with_location(self, fields: LocationFields) -> Self {
        self.edited(Step::Location, |d| d.location = Some(fields))
    }

    pub fn with_rooms(self, rooms: Vec<RoomInput>) -> Self {
        self.edited(Step::RoomSetup, |d| d.rooms = rooms)
    }

    pub fn with_pricing(self, pricing: Vec<RoomPricingFields>) -> Self {
        self.edited(Step::RoomPricing, |d| d.pricing = pricing)
    }

    pub fn with_property_rules(self, fields: PropertyRulesFields) -> Self {
        self.edited(Step::PropertyRules, |d| d.property_rules = Some(fields))
    }

    pub fn with_house_rules(self, rules: HouseRules) -> Self {
        self.edited(Step::HouseRules, |d| d.house_rules = rules)
    }

    pub fn with_guest_profile(self, fields: GuestProfileRulesFields) -> Self {
        self.edited(Step::GuestProfile, |d| d.guest_profile = Some(fields))
    }

    pub fn with_id_proofs(self, proofs: Vec<IdProofType>) -> Self {
        self.edited(Step::IdProofs, |d| d.id_proofs = proofs)
    }

    pub fn with_images(self, images: Vec<RoomImageFields>) -> Self {
        self.edited(Step::RoomImages, |d| d.images = images)
    }

    fn reject(self, error: WizardError) -> Transition {
        Err(Box::new(Rejected {
            error,
            session: self,
        }))
    }

    /// Persist the current step and mark it saved.
    pub async fn save<S: StepSink>(self, sink: &S) -> Transition {
        let step = self.step;
        if step != Step::BasicInfo && self.property_id.is_none() {
            return self.reject(WizardError::MissingProperty(step));
        }
        if matches!(step, Step::Review | Step::Payment) {
            let mut next = self;
            next.saved.insert(step);
            return Ok(next);
        }
        let Some(data) = self.draft.slice(step) else {
            return self.reject(WizardError::EmptyStep(step));
        };

        let owner = Owner {
            user_id: self.user_id,
            property_id: self.property_id,
        };
        let outcome = sink.save(owner, data).await;

        match outcome {
            Ok(outcome) => {
                let mut next = self;
                match outcome {
                    SaveOutcome::Property(id) => next.property_id = Some(id),
                    SaveOutcome::Rooms(ids) => {
                        for (room, id) in next.draft.rooms.iter_mut().zip(&ids) {
                            room.id = Some(*id);
                        }
                        // Removed rooms lost their stored prices.
                        let priced = next.draft.pricing.len();
                        next.draft.pricing.retain(|p| ids.contains(&p.room_id));
                        if next.draft.pricing.len() < priced {
                            next.saved.remove(&Step::RoomPricing);
                        }
                    }
                    SaveOutcome::Saved => {}
                }
                next.saved.insert(step);
                tracing::debug!(user_id = next.user_id, property_id = ?next.property_id, %step, "wizard step saved");
                Ok(next)
            }
            Err(source) => self.reject(WizardError::Save { step, source }),
        }
    }

    /// Save the current step if needed, then advance.
    pub async fn next<S: StepSink>(self, sink: &S) -> Transition {
        let Some(following) = self.step.next() else {
            return self.reject(WizardError::AtLastStep);
        };
        let mut session = if self.is_saved(self.step) {
            self
        } else {
            self.save(sink).await?
        };
        session.step = following;
        Ok(session)
    }

    /// Go back one step. Nothing is persisted.
    pub fn back(self) -> Transition {
        match self.step.prev() {
            Some(prev) => {
                let mut session = self;
                session.step = prev;
                Ok(session)
            }
            None => self.reject(WizardError::AtFirstStep),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveTime;

    use super::*;
    use crate::model::PropertyType;

    /// Records every save; fails for the configured step.
    #[derive(Default)]
    struct FakeSink {
        calls: Mutex<Vec<(Owner, Step)>>,
        fail_on: Option<Step>,
    }

    fn step_of(data: &StepData<'_>) -> Step {
        match data {
            StepData::BasicInfo(_) => Step::BasicInfo,
            StepData::Location(_) => Step::Location,
            StepData::Rooms(_) => Step::RoomSetup,
            StepData::Pricing(_) => Step::RoomPricing,
            StepData::PropertyRules(_) => Step::PropertyRules,
            StepData::HouseRules(_) => Step::HouseRules,
            StepData::GuestProfile(_) => Step::GuestProfile,
            StepData::IdProofs(_) => Step::IdProofs,
            StepData::Images(_) => Step::RoomImages,
        }
    }

    impl StepSink for FakeSink {
        async fn save(&self, owner: Owner, data: StepData<'_>) -> crate::Result<SaveOutcome> {
            let step = step_of(&data);
            self.calls.lock().unwrap().push((owner, step));
            if self.fail_on == Some(step) {
                return Err(crate::Error::Validation {
                    fields: vec!["property_name".into()],
                });
            }
            Ok(match data {
                StepData::BasicInfo(_) => SaveOutcome::Property(owner.property_id.unwrap_or(42)),
                StepData::Rooms(rooms) => {
                    SaveOutcome::Rooms((0..rooms.len() as i64).map(|i| 100 + i).collect())
                }
                _ => SaveOutcome::Saved,
            })
        }
    }

    impl FakeSink {
        fn steps(&self) -> Vec<Step> {
            self.calls.lock().unwrap().iter().map(|(_, s)| *s).collect()
        }
    }

    fn basic() -> BasicInfoFields {
        BasicInfoFields::new(7, "Sea View Villa", PropertyType::Villa)
    }

    fn room(room_type: &str) -> RoomInput {
        RoomInput {
            id: None,
            floor: 1,
            room_type: room_type.into(),
            room_count: 2,
            capacity: 2,
            bed_type: "Queen".into(),
            amenities: vec![],
        }
    }

    fn rules() -> PropertyRulesFields {
        PropertyRulesFields {
            user_id: 0,
            property_id: 0,
            check_in_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            check_out_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            min_guest_age: 18,
            smoking_allowed: false,
            alcohol_allowed: false,
            pets_allowed: false,
            outside_food_allowed: true,
            wheelchair_accessible: false,
            unmarried_couples_allowed: true,
            local_ids_allowed: true,
        }
    }

    #[tokio::test]
    async fn test_save_basic_info_yields_property() {
        let sink = FakeSink::default();
        let session = WizardSession::new(7).with_basic_info(basic());

        let session = session.save(&sink).await.unwrap();
        assert_eq!(session.property_id(), Some(42));
        assert!(session.is_saved(Step::BasicInfo));
        assert_eq!(session.step(), Step::BasicInfo);
    }

    #[tokio::test]
    async fn test_later_step_needs_property() {
        let sink = FakeSink::default();
        let session = WizardSession::new(7)
            .with_basic_info(basic())
            .with_location(LocationFields {
                user_id: 7,
                property_id: 0,
                address_line1: "1 Beach Rd".into(),
                address_line2: None,
                city: "Goa".into(),
                state: "Goa".into(),
                country: "India".into(),
                postal_code: "403001".into(),
            });
        let session = WizardSession { step: Step::Location, ..session };

        let rejected = session.clone().save(&sink).await.unwrap_err();
        assert!(matches!(rejected.error, WizardError::MissingProperty(Step::Location)));
        assert_eq!(rejected.session, session);
        assert!(sink.steps().is_empty());
    }

    #[tokio::test]
    async fn test_empty_step_is_rejected() {
        let sink = FakeSink::default();
        let rejected = WizardSession::new(7).save(&sink).await.unwrap_err();
        assert!(matches!(rejected.error, WizardError::EmptyStep(Step::BasicInfo)));
    }

    #[tokio::test]
    async fn test_next_saves_then_advances() {
        let sink = FakeSink::default();
        let session = WizardSession::new(7).with_basic_info(basic());

        let session = session.next(&sink).await.unwrap();
        assert_eq!(session.step(), Step::Location);
        assert_eq!(sink.steps(), [Step::BasicInfo]);

        // Going back and forward again does not resave an unchanged step.
        let session = session.back().unwrap().next(&sink).await.unwrap();
        assert_eq!(session.step(), Step::Location);
        assert_eq!(sink.steps(), [Step::BasicInfo]);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_session() {
        let sink = FakeSink {
            fail_on: Some(Step::BasicInfo),
            ..Default::default()
        };
        let session = WizardSession::new(7).with_basic_info(basic());

        let rejected = session.clone().next(&sink).await.unwrap_err();
        assert!(matches!(
            rejected.error,
            WizardError::Save {
                step: Step::BasicInfo,
                ..
            }
        ));
        assert_eq!(rejected.session, session);
        assert!(!rejected.session.is_saved(Step::BasicInfo));
    }

    #[tokio::test]
    async fn test_edit_unmarks_saved_step() {
        let sink = FakeSink::default();
        let session = WizardSession::new(7)
            .with_basic_info(basic())
            .save(&sink)
            .await
            .unwrap();
        assert!(session.is_saved(Step::BasicInfo));

        let mut renamed = basic();
        renamed.property_name = "Sea View Villa II".into();
        let session = session.with_basic_info(renamed);
        assert!(!session.is_saved(Step::BasicInfo));

        // Resaving updates the same property.
        let session = session.save(&sink).await.unwrap();
        assert_eq!(session.property_id(), Some(42));
        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls[1].0.property_id, Some(42));
    }

    #[tokio::test]
    async fn test_saved_rooms_take_their_ids() {
        let sink = FakeSink::default();
        let session = WizardSession::resume(7, 42, Draft::default())
            .with_rooms(vec![room("Deluxe"), room("Suite")]);
        let session = WizardSession { step: Step::RoomSetup, ..session };

        let session = session.save(&sink).await.unwrap();
        let ids: Vec<_> = session.draft().rooms.iter().map(|r| r.id).collect();
        assert_eq!(ids, [Some(100), Some(101)]);
    }

    fn price(room_id: i64) -> RoomPricingFields {
        serde_json::from_value(serde_json::json!({
            "user_id": 7, "property_id": 42, "room_id": room_id, "room_type": "Deluxe",
            "base_price": "3000", "available_units": 2
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_dropping_a_room_drops_its_pricing() {
        let sink = FakeSink::default();
        let session = WizardSession::resume(7, 42, Draft::default())
            .with_rooms(vec![room("Deluxe"), room("Suite")]);
        let session = WizardSession { step: Step::RoomSetup, ..session };
        let session = session.next(&sink).await.unwrap();

        let session = session.with_pricing(vec![price(100), price(101)]);
        let session = session.save(&sink).await.unwrap();
        assert!(session.is_saved(Step::RoomPricing));

        let kept = session.draft().rooms[..1].to_vec();
        let session = session.back().unwrap().with_rooms(kept);
        let session = session.save(&sink).await.unwrap();

        assert!(session.is_saved(Step::RoomSetup));
        assert!(!session.is_saved(Step::RoomPricing));
        let priced: Vec<_> = session.draft().pricing.iter().map(|p| p.room_id).collect();
        assert_eq!(priced, [100]);
    }

    #[tokio::test]
    async fn test_resaving_same_rooms_keeps_pricing_saved() {
        let sink = FakeSink::default();
        let session = WizardSession::resume(7, 42, Draft::default())
            .with_rooms(vec![room("Deluxe")])
            .with_pricing(vec![price(100)]);
        let session = WizardSession { step: Step::RoomPricing, ..session };
        let session = session.save(&sink).await.unwrap();

        let session = WizardSession { step: Step::RoomSetup, ..session };
        let session = session.save(&sink).await.unwrap();
        assert!(session.is_saved(Step::RoomPricing));
        assert_eq!(session.draft().pricing.len(), 1);
    }

    #[tokio::test]
    async fn test_back_and_last_step_bounds() {
        let rejected = WizardSession::new(7).back().unwrap_err();
        assert!(matches!(rejected.error, WizardError::AtFirstStep));

        let sink = FakeSink::default();
        let at_payment = WizardSession {
            step: Step::Payment,
            ..WizardSession::resume(7, 42, Draft::default())
        };
        let rejected = at_payment.next(&sink).await.unwrap_err();
        assert!(matches!(rejected.error, WizardError::AtLastStep));
        assert_eq!(rejected.session.step(), Step::Payment);
    }

    #[tokio::test]
    async fn test_full_walk_completes() {
        let sink = FakeSink::default();
        let mut session = WizardSession::new(7)
            .with_basic_info(basic())
            .with_location(LocationFields {
                user_id: 7,
                property_id: 0,
                address_line1: "1 Beach Rd".into(),
                address_line2: None,
                city: "Goa".into(),
                state: "Goa".into(),
                country: "India".into(),
                postal_code: "403001".into(),
            })
            .with_rooms(vec![room("Deluxe")])
            .with_pricing(vec![serde_json::from_value(serde_json::json!({
                "user_id": 7, "property_id": 0, "room_id": 100, "room_type": "Deluxe",
                "base_price": "3000", "available_units": 2
            }))
            .unwrap()])
            .with_property_rules(rules())
            .with_house_rules(HouseRules {
                smoking: Some(crate::model::SmokingRulesFields {
                    user_id: 7,
                    property_id: 0,
                    smoking_allowed: false,
                    designated_area: true,
                    smoking_in_rooms: false,
                }),
                ..Default::default()
            })
            .with_guest_profile(GuestProfileRulesFields {
                user_id: 7,
                property_id: 0,
                unmarried_couples_allowed: true,
                local_ids_allowed: true,
                male_only_groups_allowed: false,
                min_age: 18,
            })
            .with_id_proofs(vec![IdProofType::Passport])
            .with_images(vec![RoomImageFields {
                user_id: 7,
                property_id: 0,
                room_id: None,
                image_path: "uploads/room_images/a.jpg".into(),
                original_name: Some("a.jpg".into()),
                content_type: "image/jpeg".into(),
                size_bytes: 1024,
            }]);

        while session.step() != Step::LAST {
            session = session.next(&sink).await.unwrap();
        }
        let session = session.save(&sink).await.unwrap();

        assert!(session.is_complete());
        assert_eq!(sink.steps().len(), 9);
        assert!(
            sink.calls
                .lock()
                .unwrap()
                .iter()
                .skip(1)
                .all(|(owner, _)| owner.property_id == Some(42))
        );
    }
}
