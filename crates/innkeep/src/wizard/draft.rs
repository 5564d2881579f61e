use serde::{Deserialize, Serialize};

use super::Step;
use crate::aggregate::RoomInput;
use crate::model::{
    AccessibilityRulesFields, BasicInfoFields, FoodRulesFields, GuestProfileRulesFields,
    IdProofType, LocationFields, PetRulesFields, PropertyRulesFields, RoomImageFields,
    RoomPricingFields, SmokingRulesFields,
};

/// The per-topic rule rows edited together on the house-rules step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseRules {
    #[serde(default)]
    pub accessibility: Option<AccessibilityRulesFields>,
    #[serde(default)]
    pub food: Option<FoodRulesFields>,
    #[serde(default)]
    pub pets: Option<PetRulesFields>,
    #[serde(default)]
    pub smoking: Option<SmokingRulesFields>,
}

impl HouseRules {
    pub fn is_empty(&self) -> bool {
        self.accessibility.is_none() && self.food.is_none() && self.pets.is_none() && self.smoking.is_none()
    }
}

/// Everything entered so far. Owner columns (`user_id`, `property_id`) in
/// the slices are overwritten on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub basic_info: Option<BasicInfoFields>,
    pub location: Option<LocationFields>,
    pub rooms: Vec<RoomInput>,
    pub pricing: Vec<RoomPricingFields>,
    pub property_rules: Option<PropertyRulesFields>,
    pub house_rules: HouseRules,
    pub guest_profile: Option<GuestProfileRulesFields>,
    pub id_proofs: Vec<IdProofType>,
    pub images: Vec<RoomImageFields>,
}

/// One step's slice of the draft, as handed to a
/// [`StepSink`](super::StepSink).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepData<'a> {
    BasicInfo(&'a BasicInfoFields),
    Location(&'a LocationFields),
    Rooms(&'a [RoomInput]),
    Pricing(&'a [RoomPricingFields]),
    PropertyRules(&'a PropertyRulesFields),
    HouseRules(&'a HouseRules),
    GuestProfile(&'a GuestProfileRulesFields),
    IdProofs(&'a [IdProofType]),
    Images(&'a [RoomImageFields]),
}

impl Draft {
    /// The slice owned by `step`. `None` when nothing was entered, and for
    /// the review and payment steps which own nothing.
    pub fn slice(&self, step: Step) -> Option<StepData<'_>> {
        fn non_empty<T>(items: &[T]) -> Option<&[T]> {
            (!items.is_empty()).then_some(items)
        }
        match step {
            Step::BasicInfo => self.basic_info.as_ref().map(StepData::BasicInfo),
            Step::Location => self.location.as_ref().map(StepData::Location),
            Step::RoomSetup => non_empty(&self.rooms).map(StepData::Rooms),
            Step::RoomPricing => non_empty(&self.pricing).map(StepData::Pricing),
            Step::PropertyRules => self.property_rules.as_ref().map(StepData::PropertyRules),
            Step::HouseRules => {
                (!self.house_rules.is_empty()).then_some(StepData::HouseRules(&self.house_rules))
            }
            Step::GuestProfile => self.guest_profile.as_ref().map(StepData::GuestProfile),
            Step::IdProofs => non_empty(&self.id_proofs).map(StepData::IdProofs),
            Step::RoomImages => non_empty(&self.images).map(StepData::Images),
            Step::Review | Step::Payment => None,
        }
    }
}
