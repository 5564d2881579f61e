use std::fmt;

use serde::{Deserialize, Serialize};

/// The onboarding steps, in order. Numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    BasicInfo = 1,
    Location,
    RoomSetup,
    RoomPricing,
    PropertyRules,
    HouseRules,
    GuestProfile,
    IdProofs,
    RoomImages,
    Review,
    Payment,
}

impl Step {
    pub const ALL: [Step; 11] = [
        Step::BasicInfo,
        Step::Location,
        Step::RoomSetup,
        Step::RoomPricing,
        Step::PropertyRules,
        Step::HouseRules,
        Step::GuestProfile,
        Step::IdProofs,
        Step::RoomImages,
        Step::Review,
        Step::Payment,
    ];

    pub const FIRST: Step = Step::BasicInfo;
    pub const LAST: Step = Step::Payment;

    /// 1-based position.
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Step> {
        Step::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        Step::from_number(self.number() - 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::BasicInfo => "Basic info",
            Step::Location => "Location",
            Step::RoomSetup => "Room setup",
            Step::RoomPricing => "Room pricing",
            Step::PropertyRules => "Property rules",
            Step::HouseRules => "House rules",
            Step::GuestProfile => "Guest profile",
            Step::IdProofs => "ID proofs",
            Step::RoomImages => "Room images",
            Step::Review => "Review",
            Step::Payment => "Payment",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering() {
        for (i, step) in Step::ALL.iter().enumerate() {
            assert_eq!(usize::from(step.number()), i + 1);
            assert_eq!(Step::from_number(step.number()), Some(*step));
        }
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(12), None);
    }

    #[test]
    fn test_ends() {
        assert_eq!(Step::FIRST.prev(), None);
        assert_eq!(Step::LAST.next(), None);
        assert_eq!(Step::Review.next(), Some(Step::Payment));
        assert_eq!(Step::Location.to_string(), "step 2 (Location)");
    }
}
