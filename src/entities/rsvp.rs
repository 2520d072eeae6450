//! Rsvp entity - a user's response to a dinner invitation

use super::enums::ObjectState;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Rsvp {
    #[sqlx(rename = "RsvpID")]
    pub rsvp_id: i64,
    /// Owning dinner. Non-owning back-reference: only the id is kept.
    #[sqlx(rename = "DinnerID")]
    pub dinner_id: i64,
    /// Display name (local username, or a federated alias).
    #[sqlx(rename = "AttendeeName")]
    pub attendee_name: String,
    /// Stable identity of federated logins; absent for legacy rows.
    #[sqlx(rename = "AttendeeNameId")]
    pub attendee_name_id: Option<String>,
    #[sqlx(skip)]
    #[serde(skip)]
    pub state: ObjectState,
}

impl Rsvp {
    /// New transient RSVP for `dinner_id`, to be inserted on the next save.
    pub fn new(dinner_id: i64) -> Self {
        Self {
            rsvp_id: 0,
            dinner_id,
            attendee_name: String::new(),
            attendee_name_id: None,
            state: ObjectState::Added,
        }
    }

    /// Identity the attendee is matched on: `attendee_name_id`, or
    /// `attendee_name` when no id was recorded.
    pub fn attendee_identity(&self) -> &str {
        self.attendee_name_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.attendee_name)
    }
}
