//! DinnerRepository - dinners and their RSVPs

use super::paging::{PageRequest, PagedList};
use super::query::{self, DINNER_COLUMNS, DinnerFilter, DinnerOrder};
use super::{Delete, Read, Save};
use crate::entities::{Dinner, ObjectState, Rsvp};
use chrono::{DateTime, Utc};
use sqlx::{Error, SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

const RSVP_COLUMNS: &str = "RsvpID, DinnerID, AttendeeName, AttendeeNameId";

pub struct DinnerRepository {
    connection_pool: SqlitePool,
}

impl DinnerRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Dinners from now on.
    pub async fn find_upcoming(
        &self,
        order: DinnerOrder,
        page: PageRequest,
    ) -> Result<PagedList<Dinner>, Error> {
        self.find_upcoming_from(Utc::now(), order, page).await
    }

    /// Dinners on or after `from`.
    pub async fn find_upcoming_from(
        &self,
        from: DateTime<Utc>,
        order: DinnerOrder,
        page: PageRequest,
    ) -> Result<PagedList<Dinner>, Error> {
        self.find_dinners(DinnerFilter::UpcomingFrom(from), order, page)
            .await
    }

    /// Dinners whose title, description or host contains `text`.
    pub async fn find_by_text(
        &self,
        text: &str,
        order: DinnerOrder,
        page: PageRequest,
    ) -> Result<PagedList<Dinner>, Error> {
        self.find_dinners(DinnerFilter::Text(text.to_string()), order, page)
            .await
    }

    /// Upcoming dinners within the search radius of a point.
    pub async fn find_by_location(
        &self,
        latitude: f64,
        longitude: f64,
        order: DinnerOrder,
        page: PageRequest,
    ) -> Result<PagedList<Dinner>, Error> {
        let filter = DinnerFilter::Near {
            latitude,
            longitude,
            from: Utc::now(),
        };
        self.find_dinners(filter, order, page).await
    }

    /// Page of dinners plus total count, on one connection.
    ///
    /// RSVP lists are left empty; `rsvp_count` is filled in.
    #[instrument(skip(self), fields(page = page.page(), page_size = page.page_size()))]
    pub async fn find_dinners(
        &self,
        filter: DinnerFilter,
        order: DinnerOrder,
        page: PageRequest,
    ) -> Result<PagedList<Dinner>, Error> {
        debug!("Running paged dinner query");
        let mut conn = self.connection_pool.acquire().await?;

        let mut select = query::paged_dinners(&filter, order, page);
        let dinners = select
            .build_query_as::<Dinner>()
            .fetch_all(&mut *conn)
            .await?;

        let mut count = query::dinner_count(&filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        debug!("Fetched {} of {} dinners", dinners.len(), total);
        Ok(PagedList::new(dinners, page, total))
    }

    /// Every dinner `name` hosts or has an RSVP for, by event date.
    ///
    /// Both identity fields are matched on each side. RSVP lists are left empty.
    #[instrument(skip(self))]
    pub async fn all_by_user(&self, name: &str) -> Result<Vec<Dinner>, Error> {
        debug!("Fetching dinners for user");
        let sql = format!(
            "SELECT DISTINCT {DINNER_COLUMNS}, \
             (SELECT COUNT(*) FROM RSVP c WHERE c.DinnerID = d.DinnerID) AS RsvpCount \
             FROM Dinners d LEFT OUTER JOIN RSVP r ON d.DinnerID = r.DinnerID \
             WHERE d.HostedById = ? OR d.HostedBy = ? OR r.AttendeeNameId = ? OR r.AttendeeName = ? \
             ORDER BY d.EventDate, d.DinnerID"
        );

        let dinners = sqlx::query_as::<_, Dinner>(&sql)
            .bind(name)
            .bind(name)
            .bind(name)
            .bind(name)
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(dinners)
    }

    /// Removes a single RSVP by id.
    #[instrument(skip(self, rsvp), fields(rsvp_id = %rsvp.rsvp_id))]
    pub async fn delete_rsvp(&self, rsvp: &Rsvp) -> Result<(), Error> {
        debug!("Deleting RSVP");
        sqlx::query("DELETE FROM RSVP WHERE RsvpID = ?")
            .bind(rsvp.rsvp_id)
            .execute(&self.connection_pool)
            .await?;

        info!("RSVP deleted successfully");
        Ok(())
    }
}

impl Read<Dinner, i64> for DinnerRepository {
    /// Dinner with its full RSVP list, read on one connection.
    #[instrument(skip(self), fields(dinner_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Dinner>, Error> {
        debug!("Reading dinner");
        let mut conn = self.connection_pool.acquire().await?;

        let sql = format!("SELECT {DINNER_COLUMNS} FROM Dinners d WHERE d.DinnerID = ?");
        let dinner = sqlx::query_as::<_, Dinner>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(mut dinner) = dinner else {
            debug!("Dinner not found");
            return Ok(None);
        };

        let sql = format!("SELECT {RSVP_COLUMNS} FROM RSVP WHERE DinnerID = ? ORDER BY RsvpID");
        dinner.rsvps = sqlx::query_as::<_, Rsvp>(&sql)
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;
        dinner.rsvp_count = Some(dinner.rsvps.len() as i64);

        Ok(Some(dinner))
    }
}

impl Save<Dinner> for DinnerRepository {
    /// Writes the dinner row, then each RSVP by its own state, in one
    /// transaction. Added RSVPs are attached to the dinner's id.
    #[instrument(skip(self, dinner), fields(dinner_id = %dinner.dinner_id, state = ?dinner.state))]
    async fn save(&self, dinner: &mut Dinner) -> Result<(), Error> {
        debug!("Saving dinner");
        let mut tx = self.connection_pool.begin().await?;
        let deleted = dinner.state == ObjectState::Deleted;

        match dinner.state {
            ObjectState::Added => {
                dinner.dinner_id = insert_dinner(&mut tx, dinner).await?;
            }
            ObjectState::Modified => update_dinner(&mut tx, dinner).await?,
            ObjectState::Deleted => delete_dinner_rows(&mut tx, dinner.dinner_id).await?,
            ObjectState::Unchanged => {}
        }

        if !deleted {
            for rsvp in dinner.rsvps.iter_mut() {
                if rsvp.state == ObjectState::Added {
                    rsvp.dinner_id = dinner.dinner_id;
                }
                save_rsvp_row(&mut tx, rsvp).await?;
            }
        }

        tx.commit().await?;

        dinner.state = ObjectState::Unchanged;
        if deleted {
            dinner.rsvps.clear();
        }
        dinner.rsvps.retain(|r| r.state != ObjectState::Deleted);
        for rsvp in dinner.rsvps.iter_mut() {
            rsvp.state = ObjectState::Unchanged;
        }

        info!("Dinner {} saved successfully", dinner.dinner_id);
        Ok(())
    }
}

impl Save<Rsvp> for DinnerRepository {
    #[instrument(skip(self, rsvp), fields(dinner_id = %rsvp.dinner_id, state = ?rsvp.state))]
    async fn save(&self, rsvp: &mut Rsvp) -> Result<(), Error> {
        debug!("Saving RSVP");
        let mut conn = self.connection_pool.acquire().await?;
        save_rsvp_row(&mut conn, rsvp).await?;
        rsvp.state = ObjectState::Unchanged;

        info!("RSVP {} saved successfully", rsvp.rsvp_id);
        Ok(())
    }
}

impl Delete<i64> for DinnerRepository {
    /// Removes the dinner's RSVPs, then the dinner, in one transaction.
    #[instrument(skip(self), fields(dinner_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        debug!("Deleting dinner");
        let mut tx = self.connection_pool.begin().await?;
        delete_dinner_rows(&mut tx, *id).await?;
        tx.commit().await?;

        info!("Dinner deleted successfully");
        Ok(())
    }
}

async fn insert_dinner(conn: &mut SqliteConnection, dinner: &Dinner) -> Result<i64, Error> {
    let result = sqlx::query(
        "INSERT INTO Dinners \
         (Title, EventDate, Description, HostedBy, ContactPhone, Address, Country, Latitude, Longitude, HostedById) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&dinner.title)
    .bind(dinner.event_date)
    .bind(&dinner.description)
    .bind(&dinner.hosted_by)
    .bind(&dinner.contact_phone)
    .bind(&dinner.address)
    .bind(&dinner.country)
    .bind(dinner.latitude)
    .bind(dinner.longitude)
    .bind(&dinner.hosted_by_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn update_dinner(conn: &mut SqliteConnection, dinner: &Dinner) -> Result<(), Error> {
    let result = sqlx::query(
        "UPDATE Dinners SET Title = ?, EventDate = ?, Description = ?, HostedBy = ?, \
         ContactPhone = ?, Address = ?, Country = ?, Latitude = ?, Longitude = ?, HostedById = ? \
         WHERE DinnerID = ?",
    )
    .bind(&dinner.title)
    .bind(dinner.event_date)
    .bind(&dinner.description)
    .bind(&dinner.hosted_by)
    .bind(&dinner.contact_phone)
    .bind(&dinner.address)
    .bind(&dinner.country)
    .bind(dinner.latitude)
    .bind(dinner.longitude)
    .bind(&dinner.hosted_by_id)
    .bind(dinner.dinner_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::RowNotFound);
    }
    Ok(())
}

/// RSVPs first: the foreign key forbids orphaned rows.
async fn delete_dinner_rows(conn: &mut SqliteConnection, dinner_id: i64) -> Result<(), Error> {
    sqlx::query("DELETE FROM RSVP WHERE DinnerID = ?")
        .bind(dinner_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM Dinners WHERE DinnerID = ?")
        .bind(dinner_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn save_rsvp_row(conn: &mut SqliteConnection, rsvp: &mut Rsvp) -> Result<(), Error> {
    match rsvp.state {
        ObjectState::Added => {
            let result = sqlx::query(
                "INSERT INTO RSVP (DinnerID, AttendeeName, AttendeeNameId) VALUES (?, ?, ?)",
            )
            .bind(rsvp.dinner_id)
            .bind(&rsvp.attendee_name)
            .bind(&rsvp.attendee_name_id)
            .execute(&mut *conn)
            .await?;
            rsvp.rsvp_id = result.last_insert_rowid();
        }
        ObjectState::Modified => {
            let result = sqlx::query(
                "UPDATE RSVP SET DinnerID = ?, AttendeeName = ?, AttendeeNameId = ? WHERE RsvpID = ?",
            )
            .bind(rsvp.dinner_id)
            .bind(&rsvp.attendee_name)
            .bind(&rsvp.attendee_name_id)
            .bind(rsvp.rsvp_id)
            .execute(&mut *conn)
            .await?;
            if result.rows_affected() == 0 {
                return Err(Error::RowNotFound);
            }
        }
        ObjectState::Deleted => {
            sqlx::query("DELETE FROM RSVP WHERE RsvpID = ?")
                .bind(rsvp.rsvp_id)
                .execute(&mut *conn)
                .await?;
        }
        ObjectState::Unchanged => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database;
    use chrono::Duration;

    async fn repo() -> DinnerRepository {
        let pool = database::connect("sqlite::memory:", 1).await.unwrap();
        database::run_migrations(&pool).await.unwrap();
        DinnerRepository::new(pool)
    }

    fn dinner(title: &str, days_from_now: i64, host: &str) -> Dinner {
        let mut dinner = Dinner::new();
        dinner.title = title.to_string();
        dinner.event_date = Utc::now() + Duration::days(days_from_now);
        dinner.description = format!("{title} description");
        dinner.hosted_by = host.to_string();
        dinner.hosted_by_id = Some(host.to_string());
        dinner.contact_phone = "555-0100".to_string();
        dinner.address = "1 Main St".to_string();
        dinner.country = "USA".to_string();
        dinner.latitude = 47.64;
        dinner.longitude = -122.13;
        dinner
    }

    fn seed_rsvp(name: &str) -> Rsvp {
        let mut rsvp = Rsvp::new(0);
        rsvp.attendee_name = name.to_string();
        rsvp.attendee_name_id = Some(name.to_string());
        rsvp
    }

    async fn insert(repo: &DinnerRepository, mut d: Dinner, attendees: &[&str]) -> Dinner {
        d.rsvps = attendees.iter().map(|a| seed_rsvp(a)).collect();
        repo.save(&mut d).await.unwrap();
        d
    }

    #[tokio::test]
    async fn test_insert_then_find_returns_seed_rsvp() {
        let repo = repo().await;
        let saved = insert(&repo, dinner("Pizza Night", 7, "alice"), &["alice"]).await;

        assert!(saved.dinner_id > 0);
        assert_eq!(saved.state, ObjectState::Unchanged);
        assert_eq!(saved.rsvps[0].dinner_id, saved.dinner_id);
        assert_eq!(saved.rsvps[0].state, ObjectState::Unchanged);

        let found = repo.read(&saved.dinner_id).await.unwrap().unwrap();
        assert_eq!(found.title, "Pizza Night");
        assert_eq!(found.event_date, saved.event_date);
        assert_eq!(found.description, saved.description);
        assert_eq!(found.hosted_by_id, saved.hosted_by_id);
        assert_eq!(found.latitude, saved.latitude);
        assert_eq!(found.rsvps.len(), 1);
        assert_eq!(found.rsvps[0].attendee_name, "alice");
        assert_eq!(found.rsvps[0].rsvp_id, saved.rsvps[0].rsvp_id);
        assert_eq!(found.rsvp_count, Some(1));
    }

    #[tokio::test]
    async fn test_find_missing_dinner_returns_none() {
        let repo = repo().await;
        assert!(repo.read(&42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_modified_dinner_is_updated_in_place() {
        let repo = repo().await;
        let mut saved = insert(&repo, dinner("Tacos", 3, "alice"), &["alice"]).await;

        saved.title = "Tacos Tuesday".to_string();
        saved.state = ObjectState::Modified;
        repo.save(&mut saved).await.unwrap();

        let found = repo.read(&saved.dinner_id).await.unwrap().unwrap();
        assert_eq!(found.title, "Tacos Tuesday");
        assert_eq!(found.rsvps.len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_dinner_writes_nothing() {
        let repo = repo().await;
        let mut saved = insert(&repo, dinner("Soup", 3, "alice"), &[]).await;

        saved.title = "Not persisted".to_string();
        repo.save(&mut saved).await.unwrap();

        let found = repo.read(&saved.dinner_id).await.unwrap().unwrap();
        assert_eq!(found.title, "Soup");
    }

    #[tokio::test]
    async fn test_update_of_unknown_dinner_fails() {
        let repo = repo().await;
        let mut ghost = dinner("Ghost", 1, "alice");
        ghost.dinner_id = 999;
        ghost.state = ObjectState::Modified;

        let result = repo.save(&mut ghost).await;
        assert!(matches!(result, Err(Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_delete_removes_all_rsvps() {
        let repo = repo().await;
        let saved = insert(&repo, dinner("Curry", 5, "alice"), &["alice", "bob", "carol"]).await;

        repo.delete(&saved.dinner_id).await.unwrap();

        assert!(repo.read(&saved.dinner_id).await.unwrap().is_none());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM RSVP WHERE DinnerID = ?")
            .bind(saved.dinner_id)
            .fetch_one(&repo.connection_pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_deleted_state_cascades_on_save() {
        let repo = repo().await;
        let mut saved = insert(&repo, dinner("Brunch", 5, "alice"), &["alice"]).await;

        saved.state = ObjectState::Deleted;
        repo.save(&mut saved).await.unwrap();

        assert!(saved.rsvps.is_empty());
        assert!(repo.read(&saved.dinner_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rsvp_insert_and_delete() {
        let repo = repo().await;
        let saved = insert(&repo, dinner("Sushi", 2, "alice"), &["alice"]).await;

        let mut rsvp = Rsvp::new(saved.dinner_id);
        rsvp.attendee_name = "bob".to_string();
        repo.save(&mut rsvp).await.unwrap();
        assert!(rsvp.rsvp_id > 0);

        let found = repo.read(&saved.dinner_id).await.unwrap().unwrap();
        assert_eq!(found.rsvps.len(), 2);
        assert!(found.is_user_registered("bob"));

        repo.delete_rsvp(&rsvp).await.unwrap();
        let found = repo.read(&saved.dinner_id).await.unwrap().unwrap();
        assert_eq!(found.rsvps.len(), 1);
        assert!(!found.is_user_registered("bob"));
    }

    #[tokio::test]
    async fn test_modified_rsvp_is_updated_by_its_own_id() {
        let repo = repo().await;
        let first = insert(&repo, dinner("One", 2, "alice"), &["alice"]).await;
        let second = insert(&repo, dinner("Two", 2, "bob"), &["bob"]).await;

        let mut rsvp = first.rsvps[0].clone();
        rsvp.attendee_name = "Alice Liddell".to_string();
        rsvp.state = ObjectState::Modified;
        repo.save(&mut rsvp).await.unwrap();

        let first = repo.read(&first.dinner_id).await.unwrap().unwrap();
        let second = repo.read(&second.dinner_id).await.unwrap().unwrap();
        assert_eq!(first.rsvps[0].attendee_name, "Alice Liddell");
        assert_eq!(second.rsvps[0].attendee_name, "bob");
    }

    #[tokio::test]
    async fn test_upcoming_excludes_past_dinners_and_pages() {
        let repo = repo().await;
        insert(&repo, dinner("Past", -3, "alice"), &[]).await;
        for day in 1..=5 {
            insert(&repo, dinner(&format!("Future {day}"), day, "alice"), &[]).await;
        }

        let page = repo
            .find_upcoming(DinnerOrder::EventDate, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.page_count, 3);
        let titles: Vec<_> = page.items.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Future 1", "Future 2"]);

        let last = repo
            .find_upcoming(DinnerOrder::EventDate, PageRequest::new(3, 2))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].title, "Future 5");

        let beyond = repo
            .find_upcoming(DinnerOrder::EventDate, PageRequest::new(4, 2))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.page_count, 3);
    }

    #[tokio::test]
    async fn test_list_reads_carry_rsvp_count_without_rsvps() {
        let repo = repo().await;
        insert(&repo, dinner("Quiet", 2, "alice"), &["alice"]).await;
        insert(&repo, dinner("Popular", 3, "bob"), &["bob", "carol", "dave"]).await;
        insert(&repo, dinner("Empty", 4, "erin"), &[]).await;

        let page = repo
            .find_upcoming(DinnerOrder::RsvpCountDesc, PageRequest::default())
            .await
            .unwrap();
        let counts: Vec<_> = page
            .items
            .iter()
            .map(|d| (d.title.as_str(), d.rsvp_count))
            .collect();
        assert_eq!(
            counts,
            vec![("Popular", Some(3)), ("Quiet", Some(1)), ("Empty", Some(0))]
        );
        assert!(page.items.iter().all(|d| d.rsvps.is_empty()));
    }

    #[tokio::test]
    async fn test_text_search_matches_description_only_substring() {
        let repo = repo().await;
        let mut d = dinner("Plain title", 2, "alice");
        d.description = "Bring your own chopsticks".to_string();
        insert(&repo, d, &[]).await;
        insert(&repo, dinner("Other", 2, "bob"), &[]).await;

        let page = repo
            .find_by_text("chopstick", DinnerOrder::DinnerId, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].title, "Plain title");
    }

    #[tokio::test]
    async fn test_text_search_treats_wildcards_literally() {
        let repo = repo().await;
        insert(&repo, dinner("Half off", 2, "alice"), &[]).await;
        let mut d = dinner("Deal", 2, "bob");
        d.description = "50% off".to_string();
        insert(&repo, d, &[]).await;

        let page = repo
            .find_by_text("%", DinnerOrder::DinnerId, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].title, "Deal");
    }

    #[tokio::test]
    async fn test_location_search_uses_radius() {
        let repo = repo().await;
        let mut near = dinner("Redmond", 2, "alice");
        near.latitude = 47.67;
        near.longitude = -122.12;
        insert(&repo, near, &[]).await;

        let mut far = dinner("Sydney", 2, "bob");
        far.latitude = -33.86;
        far.longitude = 151.2;
        insert(&repo, far, &[]).await;

        let mut past = dinner("Seattle last week", -7, "carol");
        past.latitude = 47.6;
        past.longitude = -122.3;
        insert(&repo, past, &[]).await;

        let page = repo
            .find_by_location(47.6, -122.3, DinnerOrder::DinnerId, PageRequest::default())
            .await
            .unwrap();
        let titles: Vec<_> = page.items.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Redmond"]);
    }

    #[tokio::test]
    async fn test_location_search_wraps_across_the_date_line() {
        let repo = repo().await;
        let mut fiji = dinner("Taveuni", 2, "alice");
        fiji.latitude = -17.0;
        fiji.longitude = -179.9;
        insert(&repo, fiji, &[]).await;

        let page = repo
            .find_by_location(-17.0, 179.9, DinnerOrder::DinnerId, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].title, "Taveuni");
    }

    #[tokio::test]
    async fn test_all_by_user_covers_hosted_and_attended() {
        let repo = repo().await;
        insert(&repo, dinner("Hosted", 3, "alice"), &["alice", "bob"]).await;
        insert(&repo, dinner("Attended", 1, "bob"), &["bob", "alice"]).await;
        insert(&repo, dinner("Unrelated", 2, "carol"), &["carol"]).await;

        let dinners = repo.all_by_user("alice").await.unwrap();
        let titles: Vec<_> = dinners.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Attended", "Hosted"]);
        assert_eq!(dinners[1].rsvp_count, Some(2));
    }
}
