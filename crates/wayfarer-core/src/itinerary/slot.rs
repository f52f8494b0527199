//! Time-slot keys.
//!
//! Diffing and reconciliation identify activities only through
//! [`slot_key`]. Two activities sharing a time are indistinguishable; a
//! composite key (time plus title similarity) can replace this function
//! without touching the diff or reconcile call sites.

use super::activity::Activity;
use crate::error::ValidationError;

/// Matching key of an activity within one day.
pub fn slot_key(activity: &Activity) -> &str {
    &activity.time
}

/// Whether `value` is a zero-padded 24-hour "HH:MM" string.
///
/// Only this form sorts correctly as plain text, which the diff relies on.
pub fn is_valid_time_slot(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hours = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minutes = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hours < 24 && minutes < 60
}

pub fn validate_time_slot(value: &str) -> Result<(), ValidationError> {
    if is_valid_time_slot(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTimeSlot(value.to_string()))
    }
}
