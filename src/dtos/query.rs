//! Query DTOs - query strings and search bodies

use serde::{Deserialize, Serialize};

/// `GET /dinners?q=&page=&order=`
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DinnerIndexQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    /// Sort column, e.g. `Title` or `EventDate desc`.
    #[serde(default)]
    pub order: Option<String>,
}

/// `POST /search/popular?limit=`
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PopularQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Body of `POST /search/location`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct LocationSearchDTO {
    pub latitude: f64,
    pub longitude: f64,
}
