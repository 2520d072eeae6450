//! Dinner DTOs - dinner details, edit forms and list pages

use crate::entities::{Dinner, ObjectState, Rsvp};
use crate::repositories::PagedList;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Digits with optional `+`, spaces, dots, dashes and parentheses.
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ().\-]{3,20}$").unwrap();
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RsvpDTO {
    pub rsvp_id: i64,
    pub attendee_name: String,
}

impl From<Rsvp> for RsvpDTO {
    fn from(value: Rsvp) -> Self {
        Self {
            rsvp_id: value.rsvp_id,
            attendee_name: value.attendee_name,
        }
    }
}

/// Dinner as shown to clients. Host and attendee ids stay server side.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DinnerDTO {
    pub dinner_id: i64,
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub description: String,
    pub hosted_by: String,
    pub contact_phone: String,
    pub address: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rsvp_count: i64,
    pub rsvps: Vec<RsvpDTO>,
}

impl From<Dinner> for DinnerDTO {
    fn from(value: Dinner) -> Self {
        let rsvp_count = value.rsvp_count.unwrap_or(value.rsvps.len() as i64);
        Self {
            dinner_id: value.dinner_id,
            title: value.title,
            event_date: value.event_date,
            description: value.description,
            hosted_by: value.hosted_by,
            contact_phone: value.contact_phone,
            address: value.address,
            country: value.country,
            latitude: value.latitude,
            longitude: value.longitude,
            rsvp_count,
            rsvps: value.rsvps.into_iter().map(RsvpDTO::from).collect(),
        }
    }
}

/// Editable fields of a dinner, as submitted by create and edit.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct DinnerFormDTO {
    #[validate(length(min = 1, max = 50, message = "Title is required (50 characters max)"))]
    pub title: String,
    pub event_date: DateTime<Utc>,
    #[validate(length(min = 1, max = 256, message = "Description is required (256 characters max)"))]
    pub description: String,
    #[validate(length(min = 1, max = 50, message = "Address is required (50 characters max)"))]
    pub address: String,
    #[validate(length(min = 1, max = 30, message = "Country is required (30 characters max)"))]
    pub country: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Phone number is not valid"))]
    pub contact_phone: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
}

impl DinnerFormDTO {
    /// Copies the form onto `dinner`. A persisted dinner becomes `Modified`.
    pub fn apply_to(&self, dinner: &mut Dinner) {
        dinner.title = self.title.clone();
        dinner.event_date = self.event_date;
        dinner.description = self.description.clone();
        dinner.address = self.address.clone();
        dinner.country = self.country.clone();
        dinner.contact_phone = self.contact_phone.clone();
        dinner.latitude = self.latitude;
        dinner.longitude = self.longitude;
        if dinner.state != ObjectState::Added {
            dinner.state = ObjectState::Modified;
        }
    }

    /// New unsaved dinner carrying the form's fields.
    pub fn to_new_dinner(&self) -> Dinner {
        let mut dinner = Dinner::new();
        self.apply_to(&mut dinner);
        dinner
    }
}

impl From<&Dinner> for DinnerFormDTO {
    fn from(value: &Dinner) -> Self {
        Self {
            title: value.title.clone(),
            event_date: value.event_date,
            description: value.description.clone(),
            address: value.address.clone(),
            country: value.country.clone(),
            contact_phone: value.contact_phone.clone(),
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

/// Sent back with a 422 when a submitted form could not be saved.
#[derive(Serialize, Deserialize, Debug)]
pub struct FormRedisplayDTO {
    pub error: String,
    pub dinner_id: i64,
    pub form: DinnerFormDTO,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DinnerDeletedDTO {
    pub dinner_id: i64,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PagedDinnersDTO {
    pub dinners: Vec<DinnerDTO>,
    pub page_number: u32,
    pub page_count: u32,
    pub total_count: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl From<PagedList<Dinner>> for PagedDinnersDTO {
    fn from(value: PagedList<Dinner>) -> Self {
        let has_previous_page = value.has_previous_page();
        let has_next_page = value.has_next_page();
        let page = value.map(DinnerDTO::from);
        Self {
            dinners: page.items,
            page_number: page.page_number,
            page_count: page.page_count,
            total_count: page.total_count,
            has_previous_page,
            has_next_page,
        }
    }
}

/// Short titled list of dinners for embedding elsewhere.
#[derive(Serialize, Deserialize, Debug)]
pub struct WebSliceDTO {
    pub title: String,
    pub dinners: Vec<DinnerDTO>,
}

/// Compact dinner used by the search endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonDinnerDTO {
    #[serde(rename = "DinnerID")]
    pub dinner_id: i64,
    #[serde(rename = "EventDate")]
    pub event_date: DateTime<Utc>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "RSVPCount")]
    pub rsvp_count: i64,
    #[serde(rename = "Url")]
    pub url: String,
}

impl From<Dinner> for JsonDinnerDTO {
    fn from(value: Dinner) -> Self {
        Self {
            url: format!("/{}", value.dinner_id),
            dinner_id: value.dinner_id,
            event_date: value.event_date,
            title: value.title,
            latitude: value.latitude,
            longitude: value.longitude,
            description: value.description,
            rsvp_count: value.rsvp_count.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> DinnerFormDTO {
        DinnerFormDTO {
            title: "Pizza Night".to_string(),
            event_date: Utc::now(),
            description: "Slices and code".to_string(),
            address: "1 Main St".to_string(),
            country: "USA".to_string(),
            contact_phone: "(425) 555-0100".to_string(),
            latitude: 47.64,
            longitude: -122.13,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_form_rejects_blank_title_and_bad_phone() {
        let mut f = form();
        f.title = String::new();
        f.contact_phone = "call me".to_string();

        let errors = f.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("contact_phone"));
        assert!(!fields.contains_key("description"));
    }

    #[test]
    fn test_form_rejects_out_of_range_coordinates() {
        let mut f = form();
        f.latitude = 91.0;
        f.longitude = -181.0;

        let errors = f.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("latitude"));
        assert!(errors.field_errors().contains_key("longitude"));
    }

    #[test]
    fn test_apply_marks_persisted_dinner_modified() {
        let mut dinner = Dinner::new();
        dinner.state = ObjectState::Unchanged;
        form().apply_to(&mut dinner);
        assert_eq!(dinner.state, ObjectState::Modified);
        assert_eq!(dinner.title, "Pizza Night");

        let fresh = form().to_new_dinner();
        assert_eq!(fresh.state, ObjectState::Added);
    }

    #[test]
    fn test_json_dinner_uses_pretty_url_and_pascal_case_keys() {
        let mut dinner = form().to_new_dinner();
        dinner.dinner_id = 12;
        dinner.rsvp_count = Some(3);

        let value = serde_json::to_value(JsonDinnerDTO::from(dinner)).unwrap();
        assert_eq!(value["DinnerID"], 12);
        assert_eq!(value["RSVPCount"], 3);
        assert_eq!(value["Url"], "/12");
        assert!(value.get("dinner_id").is_none());
    }
}
