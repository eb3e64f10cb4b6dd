//! Harvester core: pure job model, email extraction and request validation.
mod extract;
mod request;
mod state;
mod view_model;

pub use extract::extract_emails;
pub use request::{urls_from_request, ValidationError};
pub use state::{
    is_absolute_url, EntryOutcome, Job, JobId, JobStatus, ResultEntry, INVALID_URL_MESSAGE,
};
pub use view_model::JobSnapshot;
