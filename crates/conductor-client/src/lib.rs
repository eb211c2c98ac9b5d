//! HTTP client SDK for the Conductor workflow orchestration server.
//!
//! This crate provides a typed client for the parts of the Conductor REST API
//! used by the SDK test-automation wrappers.
//!
//! # Example
//!
//! ```no_run
//! use conductor_client::{ConductorClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = ConductorClient::builder()
//!     .base_url("http://localhost:8080/api")
//!     .build()?;
//!
//! // List every registered event handler
//! let handlers = client.events().list().await?;
//! println!("{} handlers", handlers.len());
//!
//! // Fetch a workflow execution, tasks included
//! let workflow = client.workflows().get("wf-123", Some(true)).await?;
//! println!("{} is {:?}", workflow.workflow_id, workflow.status);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Events**: add, update, list, list by event, remove event handlers
//! - **Workflows**: execution status, start, terminate

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, ConductorClient};
pub use error::{Error, Result};
pub use types::*;

pub use api::{EventsApi, WorkflowsApi};
