//! ID generation for chat messages.

use uuid::Uuid;

/// Generates a new time-ordered message identifier.
///
/// UUID v7 sorts by creation time, which keeps a transcript's ids in
/// the order the messages were written.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
