//! API endpoint implementations.

mod events;
mod workflows;

pub use events::EventsApi;
pub use workflows::WorkflowsApi;
