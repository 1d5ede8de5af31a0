use diesel::prelude::*;
use diesel::result::Error as DieselError;
use serde::{Deserialize, Serialize};

use crate::schema::{event_tags, tags};

/// Database model for the tags table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = tags)]
pub struct Tag {
    pub id: i32,
    pub slug: String,
    pub label: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tags)]
pub struct NewTag<'a> {
    pub slug: &'a str,
    pub label: &'a str,
}

/// Link row between an event and a tag
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = event_tags)]
pub struct EventTag {
    pub event_id: i32,
    pub tag_id: i32,
}

impl Tag {
    /// Find an existing tag by slug or create a new one
    pub fn find_or_create(
        conn: &mut PgConnection,
        tag_slug: &str,
        tag_label: &str,
    ) -> Result<Self, DieselError> {
        use crate::schema::tags::dsl::*;

        // Try to find existing
        match tags.filter(slug.eq(tag_slug)).first::<Tag>(conn).optional()? {
            Some(tag) => Ok(tag),
            None => {
                // Create new
                diesel::insert_into(tags)
                    .values(NewTag { slug: tag_slug, label: tag_label })
                    .get_result(conn)
            }
        }
    }
}

impl EventTag {
    /// Link an event to a tag; re-linking is a no-op
    pub fn link(conn: &mut PgConnection, event: i32, tag: i32) -> Result<usize, DieselError> {
        use crate::schema::event_tags::dsl::*;

        diesel::insert_into(event_tags)
            .values(EventTag { event_id: event, tag_id: tag })
            .on_conflict_do_nothing()
            .execute(conn)
    }
}
