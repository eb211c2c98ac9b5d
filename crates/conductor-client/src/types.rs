//! Request and response types for the Conductor API.
//!
//! These types mirror the server's JSON (camelCase). Fields this crate does not
//! model are kept in `extra` so a value read from the server re-serializes
//! without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// Event handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Action type that starts a workflow.
pub const START_WORKFLOW_ACTION: &str = "start_workflow";

/// A named rule that runs actions when an event is received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHandler {
    /// Unique handler name.
    #[serde(default)]
    pub name: String,
    /// Event the handler listens to, e.g. `kafka:orders`.
    #[serde(default)]
    pub event: String,
    /// Optional condition evaluated against the event payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Actions executed when the handler fires.
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Whether the handler is active.
    #[serde(default)]
    pub active: bool,
    /// Evaluator used for `condition`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator_type: Option<String>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single event handler action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action type, e.g. `start_workflow`.
    pub action: String,
    /// Workflow to start for `start_workflow` actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_workflow: Option<StartWorkflow>,
    /// Whether inline JSON in the event payload is expanded.
    #[serde(rename = "expandInlineJSON", default)]
    pub expand_inline_json: bool,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    /// Build a `start_workflow` action.
    pub fn start_workflow(start: StartWorkflow) -> Self {
        Self {
            action: START_WORKFLOW_ACTION.to_string(),
            start_workflow: Some(start),
            ..Default::default()
        }
    }
}

/// Workflow started by an event handler action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflow {
    /// Workflow definition name.
    pub name: String,
    /// Workflow definition version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    /// Correlation id attached to the started workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Workflow input.
    #[serde(default)]
    pub input: Map<String, Value>,
    /// Task to domain mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_to_domain: Option<HashMap<String, String>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflows
// ─────────────────────────────────────────────────────────────────────────────

/// Workflow execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Running,
    Completed,
    Failed,
    TimedOut,
    Terminated,
    Paused,
}

/// A workflow execution as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Execution id.
    pub workflow_id: String,
    /// Definition name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    /// Definition version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_version: Option<i32>,
    /// Current status.
    pub status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub input: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub output: Map<String, Value>,
    /// Task executions; empty unless tasks were requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Value>,
    /// Start time, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// End time, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_incompletion: Option<String>,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to start a workflow execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowRequest {
    /// Workflow definition name.
    pub name: String,
    /// Definition version; the latest when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub input: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Key pair exchanged for an access token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenRequest {
    pub key_id: String,
    pub key_secret: String,
}

/// Access token response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}
