use super::table;
use crate::entity::text_enum;

text_enum! {
    /// Identity documents a property accepts at check-in.
    pub enum IdProofType {
        Passport => "Passport",
        DrivingLicence => "Driving Licence",
        NationalId => "National ID",
        VoterId => "Voter ID",
        Aadhaar => "Aadhaar",
        Other => "Other",
    }
}

table! {
    #[table = "id_proofs", label = "id proof"]
    pub struct IdProof {
        #[validate(range(min = 1))]
        pub user_id: i64,
        #[validate(range(min = 1))]
        pub property_id: i64,
        pub proof_type: IdProofType,
    }

    pub struct IdProofFields;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_type_round_trips_through_text() {
        for proof in IdProofType::ALL {
            assert_eq!(proof.as_str().parse::<IdProofType>(), Ok(*proof));
        }
    }

    #[test]
    fn test_unknown_proof_type_rejected_in_json() {
        let result: Result<IdProofFields, _> = serde_json::from_str(
            r#"{"user_id":7,"property_id":3,"proof_type":"Library Card"}"#,
        );
        assert!(result.is_err());
    }
}
