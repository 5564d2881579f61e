//! Custom field checks used by the `Fields` validators.

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::jsonb::Jsonb;

use super::pricing::{OccupancyAdjustment, RefundTier};

/// Most refund tiers a pricing row may carry.
pub const MAX_REFUND_TIERS: usize = 3;

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub(crate) fn no_blank_items(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ValidationError::new("blank_item"));
    }
    Ok(())
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

pub(crate) fn optional_non_negative(value: &Option<Decimal>) -> Result<(), ValidationError> {
    value.as_ref().map_or(Ok(()), non_negative)
}

pub(crate) fn refund_tiers(tiers: &Jsonb<Vec<RefundTier>>) -> Result<(), ValidationError> {
    if tiers.len() > MAX_REFUND_TIERS {
        return Err(ValidationError::new("too_many_tiers"));
    }
    let in_range = tiers
        .iter()
        .all(|t| t.days_before >= 0 && (0..=100).contains(&t.refund_percent));
    if !in_range {
        return Err(ValidationError::new("tier_out_of_range"));
    }
    Ok(())
}

pub(crate) fn occupancy(adjustments: &Jsonb<Vec<OccupancyAdjustment>>) -> Result<(), ValidationError> {
    if adjustments.iter().any(|a| a.guests < 1) {
        return Err(ValidationError::new("guests"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(refund_percent: i32) -> RefundTier {
        RefundTier {
            enabled: true,
            days_before: 7,
            refund_percent,
        }
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Sea View").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_non_negative_accepts_zero() {
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_optional_non_negative() {
        assert!(optional_non_negative(&None).is_ok());
        assert!(optional_non_negative(&Some(Decimal::new(500, 0))).is_ok());
        assert!(optional_non_negative(&Some(Decimal::new(-5, 0))).is_err());
    }

    #[test]
    fn test_refund_tiers_limits() {
        assert!(refund_tiers(&Jsonb(vec![tier(100), tier(50), tier(0)])).is_ok());
        assert!(refund_tiers(&Jsonb(vec![tier(100); 4])).is_err());
        assert!(refund_tiers(&Jsonb(vec![tier(101)])).is_err());
        assert!(refund_tiers(&Jsonb(vec![tier(-1)])).is_err());
    }
}
