//! Dinner entity - a hosted dinner event and its RSVPs

use super::enums::ObjectState;
use super::rsvp::Rsvp;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Dinner {
    #[sqlx(rename = "DinnerID")]
    pub dinner_id: i64,
    #[sqlx(rename = "Title")]
    pub title: String,
    #[sqlx(rename = "EventDate")]
    pub event_date: DateTime<Utc>,
    #[sqlx(rename = "Description")]
    pub description: String,
    /// Display name of the host.
    #[sqlx(rename = "HostedBy")]
    pub hosted_by: String,
    /// Stable identity of the host; absent on legacy rows.
    #[sqlx(rename = "HostedById")]
    pub hosted_by_id: Option<String>,
    #[sqlx(rename = "ContactPhone")]
    pub contact_phone: String,
    #[sqlx(rename = "Address")]
    pub address: String,
    #[sqlx(rename = "Country")]
    pub country: String,
    #[sqlx(rename = "Latitude")]
    pub latitude: f64,
    #[sqlx(rename = "Longitude")]
    pub longitude: f64,
    /// Derived by list queries. Not a column of `Dinners`.
    #[sqlx(rename = "RsvpCount", default)]
    pub rsvp_count: Option<i64>,
    /// Fully materialized by `find`; left empty by list reads.
    #[sqlx(skip)]
    pub rsvps: Vec<Rsvp>,
    #[sqlx(skip)]
    #[serde(skip)]
    pub state: ObjectState,
}

impl Dinner {
    /// New transient dinner scheduled one week from now, to be inserted on
    /// the next save.
    pub fn new() -> Self {
        Self {
            dinner_id: 0,
            title: String::new(),
            event_date: Utc::now() + Duration::days(7),
            description: String::new(),
            hosted_by: String::new(),
            hosted_by_id: None,
            contact_phone: String::new(),
            address: String::new(),
            country: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            rsvp_count: None,
            rsvps: Vec::new(),
            state: ObjectState::Added,
        }
    }

    /// Ordinal comparison against `hosted_by_id`, or `hosted_by` when no id
    /// was recorded.
    pub fn is_hosted_by(&self, name: &str) -> bool {
        let host = self
            .hosted_by_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.hosted_by);
        host == name
    }

    pub fn is_user_registered(&self, name: &str) -> bool {
        self.rsvps.iter().any(|r| r.attendee_identity() == name)
    }

    /// RSVP belonging to `name`, if the user is registered.
    pub fn rsvp_for(&self, name: &str) -> Option<&Rsvp> {
        self.rsvps.iter().find(|r| r.attendee_identity() == name)
    }
}

impl Default for Dinner {
    fn default() -> Self {
        Self::new()
    }
}
