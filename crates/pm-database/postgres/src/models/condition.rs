use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use serde::{Deserialize, Serialize};

use crate::schema::conditions;

/// Database model for the conditions table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = conditions)]
pub struct Condition {
    pub id: String,
    pub oracle: String,
    pub question_id: String,
    pub resolved: bool,
    pub arweave_hash: String,
    pub creator: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New condition for database insertion
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = conditions)]
pub struct NewCondition {
    pub id: String,
    pub oracle: String,
    pub question_id: String,
    pub resolved: bool,
    pub arweave_hash: String,
    pub creator: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Condition {
    /// Upsert a condition (insert, or refresh mutable fields on conflict)
    pub fn upsert(conn: &mut PgConnection, new: &NewCondition) -> Result<Self, DieselError> {
        use crate::schema::conditions::dsl::*;

        diesel::insert_into(conditions)
            .values(new)
            .on_conflict(id)
            .do_update()
            .set((
                oracle.eq(&new.oracle),
                question_id.eq(&new.question_id),
                resolved.eq(new.resolved),
                arweave_hash.eq(&new.arweave_hash),
                creator.eq(&new.creator),
                updated_at.eq(diesel::dsl::now),
            ))
            .returning(Condition::as_returning())
            .get_result(conn)
    }
}
