//! Common type definitions.
//!
//! - [`QueryId`]: identifier of a stored query history record
//! - [`abbrev_uuid`]: abbreviate UUIDs to first 8 chars for logging
//! - [`mask_phone_number`]: keep subscriber numbers out of logs

use uuid::Uuid;

pub type QueryId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Mask all but the last four characters of a phone number.
/// Example: "+12040000065" -> "+*******0065"
pub fn mask_phone_number(phone_number: &str) -> String {
    let count = phone_number.chars().count();
    phone_number
        .chars()
        .enumerate()
        .map(|(i, c)| if i == 0 && c == '+' { c } else if i + 4 < count { '*' } else { c })
        .collect()
}
