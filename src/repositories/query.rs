//! SQL construction for paged dinner lists
//!
//! A list query is a filter predicate plus a sort column plus a page. The
//! predicate only ever reaches SQL through bind parameters and the sort
//! column is one of the fixed [`DinnerOrder`] fragments.

use super::paging::PageRequest;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

/// Column list of `Dinners` as selected by every dinner read, aliased `d`.
pub const DINNER_COLUMNS: &str = "d.DinnerID AS DinnerID, d.Title AS Title, \
    d.EventDate AS EventDate, d.Description AS Description, d.HostedBy AS HostedBy, \
    d.HostedById AS HostedById, d.ContactPhone AS ContactPhone, d.Address AS Address, \
    d.Country AS Country, d.Latitude AS Latitude, d.Longitude AS Longitude";

/// Radius of a location search, in miles.
pub const SEARCH_RADIUS_MILES: f64 = 1000.0;

const MILES_PER_DEGREE_LATITUDE: f64 = 69.0934;

/// Sortable columns of a dinner list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DinnerOrder {
    #[default]
    DinnerId,
    EventDate,
    EventDateDesc,
    RsvpCount,
    RsvpCountDesc,
    Title,
}

impl DinnerOrder {
    /// `ORDER BY` fragment. `DinnerID` breaks ties so pages never overlap.
    pub fn as_sql(self) -> &'static str {
        match self {
            DinnerOrder::DinnerId => "DinnerID",
            DinnerOrder::EventDate => "EventDate, DinnerID",
            DinnerOrder::EventDateDesc => "EventDate DESC, DinnerID",
            DinnerOrder::RsvpCount => "RsvpCount, DinnerID",
            DinnerOrder::RsvpCountDesc => "RsvpCount DESC, DinnerID",
            DinnerOrder::Title => "Title, DinnerID",
        }
    }

    /// Parses a column name with an optional direction, e.g. `"EventDate"`,
    /// `"rsvpcount desc"`. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let mut words = value.split_whitespace();
        let column = words.next()?.to_ascii_lowercase();
        let descending = match words.next().map(|w| w.to_ascii_lowercase()) {
            None => false,
            Some(dir) if dir == "asc" => false,
            Some(dir) if dir == "desc" => true,
            Some(_) => return None,
        };
        if words.next().is_some() {
            return None;
        }

        match (column.as_str(), descending) {
            ("dinnerid", false) => Some(DinnerOrder::DinnerId),
            ("eventdate", false) => Some(DinnerOrder::EventDate),
            ("eventdate", true) => Some(DinnerOrder::EventDateDesc),
            ("rsvpcount", false) => Some(DinnerOrder::RsvpCount),
            ("rsvpcount", true) => Some(DinnerOrder::RsvpCountDesc),
            ("title", false) => Some(DinnerOrder::Title),
            _ => None,
        }
    }
}

/// Which dinners a list query selects.
#[derive(Debug, Clone, PartialEq)]
pub enum DinnerFilter {
    /// Dinners on or after the given instant.
    UpcomingFrom(DateTime<Utc>),
    /// Substring of title, description or host name.
    Text(String),
    /// Upcoming dinners within [`SEARCH_RADIUS_MILES`] of a point.
    Near {
        latitude: f64,
        longitude: f64,
        from: DateTime<Utc>,
    },
}

impl DinnerFilter {
    fn push_predicate(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            DinnerFilter::UpcomingFrom(from) => {
                qb.push("d.EventDate >= ").push_bind(*from);
            }
            DinnerFilter::Text(text) => {
                let pattern = format!("%{}%", escape_like(text));
                qb.push("(d.Title LIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR d.Description LIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR d.HostedBy LIKE ")
                    .push_bind(pattern)
                    .push(" ESCAPE '\\')");
            }
            DinnerFilter::Near {
                latitude,
                longitude,
                from,
            } => {
                qb.push("d.EventDate >= ").push_bind(*from).push(" AND ");
                GeoWindow::around(*latitude, *longitude).push_within_radius(qb);
            }
        }
    }
}

/// Flat-earth projection centred on the search point.
///
/// The cosine of the search latitude is computed here and bound as a
/// parameter, so the SQL side is plain arithmetic.
struct GeoWindow {
    latitude: f64,
    longitude: f64,
    miles_per_degree_longitude: f64,
}

impl GeoWindow {
    fn around(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            miles_per_degree_longitude: MILES_PER_DEGREE_LATITUDE * latitude.to_radians().cos(),
        }
    }

    fn push_within_radius(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let lat = MILES_PER_DEGREE_LATITUDE;
        let long = self.miles_per_degree_longitude;

        qb.push("((d.Latitude - ")
            .push_bind(self.latitude)
            .push(") * ")
            .push_bind(lat)
            .push(") * ((d.Latitude - ")
            .push_bind(self.latitude)
            .push(") * ")
            .push_bind(lat)
            .push(") + (");
        self.push_longitude_gap(qb);
        qb.push(" * ").push_bind(long).push(") * (");
        self.push_longitude_gap(qb);
        qb.push(" * ")
            .push_bind(long)
            .push(") < ")
            .push_bind(SEARCH_RADIUS_MILES * SEARCH_RADIUS_MILES);
    }

    /// Degrees of longitude between the row and the centre, taking the
    /// short way round across the 180th meridian.
    fn push_longitude_gap(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push("MIN(ABS(d.Longitude - ")
            .push_bind(self.longitude)
            .push("), 360.0 - ABS(d.Longitude - ")
            .push_bind(self.longitude)
            .push("))");
    }
}

/// Escapes LIKE wildcards so `text` matches literally (escape char `\`).
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// One page of dinners with their RSVP count, numbered by `order`.
pub fn paged_dinners<'args>(
    filter: &DinnerFilter,
    order: DinnerOrder,
    page: PageRequest,
) -> QueryBuilder<'args, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT * FROM (SELECT X.*, ROW_NUMBER() OVER (ORDER BY ");
    qb.push(order.as_sql());
    qb.push(") AS RowNumber FROM (SELECT ");
    qb.push(DINNER_COLUMNS);
    qb.push(
        ", COUNT(r.RsvpID) AS RsvpCount \
         FROM Dinners d LEFT OUTER JOIN RSVP r ON d.DinnerID = r.DinnerID WHERE ",
    );
    filter.push_predicate(&mut qb);
    qb.push(" GROUP BY d.DinnerID) AS X) AS Y WHERE RowNumber BETWEEN ");
    qb.push_bind(page.start());
    qb.push(" AND ");
    qb.push_bind(page.finish());
    qb.push(" ORDER BY RowNumber");
    qb
}

/// Number of dinners matching `filter`, for the page count.
pub fn dinner_count<'args>(filter: &DinnerFilter) -> QueryBuilder<'args, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM Dinners d WHERE ");
    filter.push_predicate(&mut qb);
    qb
}
