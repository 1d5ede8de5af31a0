pub mod condition;
pub mod event;
pub mod market;
pub mod outcome;
pub mod sync_status;
pub mod tag;

// Re-export commonly used types
pub use condition::{Condition, NewCondition};
pub use event::{Event, NewEvent};
pub use market::{Market, NewMarket};
pub use outcome::{NewOutcome, Outcome};
pub use sync_status::{run_status, NewSyncStatus, SyncStatus};
pub use tag::{EventTag, NewTag, Tag};
