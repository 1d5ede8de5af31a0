use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use serde::{Deserialize, Serialize};

use crate::schema::events;

/// Database model for the events table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub creator: Option<String>,
    pub icon_url: Option<String>,
    pub show_market_icons: bool,
    pub rules: Option<String>,
    pub active_markets_count: i32,
    pub total_markets_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New event for database insertion
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub slug: String,
    pub title: String,
    pub creator: Option<String>,
    pub icon_url: Option<String>,
    pub show_market_icons: bool,
    pub rules: Option<String>,
}

impl Event {
    /// Look up an event by its unique slug
    pub fn find_by_slug(
        conn: &mut PgConnection,
        event_slug: &str,
    ) -> Result<Option<Self>, DieselError> {
        use crate::schema::events::dsl::*;

        events.filter(slug.eq(event_slug)).first(conn).optional()
    }

    /// Insert a new event
    pub fn insert(conn: &mut PgConnection, new_event: &NewEvent) -> Result<Self, DieselError> {
        use crate::schema::events::dsl::*;

        diesel::insert_into(events)
            .values(new_event)
            .returning(Event::as_returning())
            .get_result(conn)
    }

    /// Bump the per-event market counters after a market is attached.
    /// `total_markets_count` always moves; `active_markets_count` only for
    /// active markets.
    pub fn increment_market_counters(
        conn: &mut PgConnection,
        event_id: i32,
        market_is_active: bool,
    ) -> Result<usize, DieselError> {
        use crate::schema::events::dsl::*;

        let active_delta: i32 = if market_is_active { 1 } else { 0 };
        diesel::update(events.find(event_id))
            .set((
                total_markets_count.eq(total_markets_count + 1),
                active_markets_count.eq(active_markets_count + active_delta),
                updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
    }
}
