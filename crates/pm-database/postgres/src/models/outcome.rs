use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use serde::{Deserialize, Serialize};

use crate::schema::outcomes;

/// Database model for the outcomes table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = outcomes)]
pub struct Outcome {
    pub id: i32,
    pub condition_id: String,
    pub outcome_text: String,
    pub outcome_index: i32,
    pub token_id: String,
    pub price: Option<BigDecimal>,
    pub volume: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
}

/// New outcome for database insertion
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = outcomes)]
pub struct NewOutcome {
    pub condition_id: String,
    pub outcome_text: String,
    pub outcome_index: i32,
    pub token_id: String,
    pub price: Option<BigDecimal>,
    pub volume: Option<BigDecimal>,
}

impl Outcome {
    /// Insert a batch of outcomes. Conflicts on `(condition_id, outcome_index)`
    /// or `token_id` are skipped, so re-processing a condition is idempotent.
    pub fn insert_batch(
        conn: &mut PgConnection,
        new_outcomes: &[NewOutcome],
    ) -> Result<usize, DieselError> {
        use crate::schema::outcomes::dsl::*;

        diesel::insert_into(outcomes)
            .values(new_outcomes)
            .on_conflict_do_nothing()
            .execute(conn)
    }
}
