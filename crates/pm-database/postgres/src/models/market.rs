use std::collections::HashSet;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use serde::{Deserialize, Serialize};

use crate::schema::markets;

/// Database model for the markets table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = markets)]
#[diesel(primary_key(condition_id))]
pub struct Market {
    pub condition_id: String,
    pub event_id: i32,
    pub title: String,
    pub slug: String,
    pub short_title: Option<String>,
    pub icon_url: Option<String>,
    pub is_active: bool,
    pub is_resolved: bool,
    pub metadata: Option<serde_json::Value>,
    pub volume_24h: Option<BigDecimal>,
    pub volume_total: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New market for database insertion
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = markets)]
pub struct NewMarket {
    pub condition_id: String,
    pub event_id: i32,
    pub title: String,
    pub slug: String,
    pub short_title: Option<String>,
    pub icon_url: Option<String>,
    pub is_active: bool,
    pub is_resolved: bool,
    pub metadata: Option<serde_json::Value>,
}

impl Market {
    /// Whether a market row exists for this condition
    pub fn exists(conn: &mut PgConnection, cid: &str) -> Result<bool, DieselError> {
        use crate::schema::markets::dsl::*;

        diesel::select(diesel::dsl::exists(markets.filter(condition_id.eq(cid))))
            .get_result(conn)
    }

    /// Insert a market. A conflict on the primary key or on `(event_id, slug)`
    /// means the market is already present and the insert is a no-op; returns
    /// the number of rows written (0 or 1).
    pub fn insert_if_absent(
        conn: &mut PgConnection,
        new_market: &NewMarket,
    ) -> Result<usize, DieselError> {
        use crate::schema::markets::dsl::*;

        diesel::insert_into(markets)
            .values(new_market)
            .on_conflict_do_nothing()
            .execute(conn)
    }

    /// Which of `candidate_ids` already have a committed market row.
    /// Batched to keep bind-parameter counts well under the Postgres limit.
    pub fn existing_condition_ids(
        conn: &mut PgConnection,
        candidate_ids: &[String],
    ) -> Result<HashSet<String>, DieselError> {
        use crate::schema::markets::dsl::*;

        const BATCH_SIZE: usize = 5000;

        let mut found = HashSet::new();
        for chunk in candidate_ids.chunks(BATCH_SIZE) {
            let rows: Vec<String> =
                markets.filter(condition_id.eq_any(chunk)).select(condition_id).load(conn)?;
            found.extend(rows);
        }
        Ok(found)
    }

    /// Creation timestamp of the newest condition that has a committed market.
    /// This is the resume cursor: markets are only written after their
    /// condition, so everything at or before this instant is durable.
    pub fn latest_creation_cursor(
        conn: &mut PgConnection,
    ) -> Result<Option<DateTime<Utc>>, DieselError> {
        use crate::schema::{conditions, markets};

        markets::table
            .inner_join(conditions::table)
            .select(diesel::dsl::max(conditions::created_at))
            .first(conn)
    }
}
