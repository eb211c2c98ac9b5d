//! Parsing of `(resource, operation, parameters)` into a typed [`Operation`].
//!
//! All validation happens here, before a client exists. Parameter structs read
//! camelCase keys, ignore unknown keys, and fall back to documented defaults
//! for missing ones.

use std::fmt;

use conductor_client::{Action, EventHandler, StartWorkflow, StartWorkflowRequest};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{Result, WrapperError};

/// Workflow started by every event handler this wrapper creates.
pub const HANDLER_WORKFLOW_NAME: &str = "test_workflow";

/// Version of [`HANDLER_WORKFLOW_NAME`] started by handlers.
pub const HANDLER_WORKFLOW_VERSION: i32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Invocation
// ─────────────────────────────────────────────────────────────────────────────

/// Raw CLI input for one run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub resource: String,
    pub operation: String,
    pub parameters: String,
}

impl Invocation {
    pub fn new(
        resource: impl Into<String>,
        operation: impl Into<String>,
        parameters: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            operation: operation.into(),
            parameters: parameters.into(),
        }
    }

    /// Validate the invocation and build the operation it names.
    pub fn parse(&self) -> Result<Operation> {
        let parameters = match serde_json::from_str::<Value>(&self.parameters)
            .map_err(WrapperError::InvalidParameters)?
        {
            Value::Object(map) => map,
            other => {
                return Err(WrapperError::Validation(format!(
                    "parameters must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        let resource = Resource::parse(&self.resource)?;
        Operation::parse(resource, &self.operation, parameters)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level routing key selecting which operations apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Event,
    Workflow,
}

impl Resource {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "event" => Ok(Resource::Event),
            "workflow" => Ok(Resource::Workflow),
            other => Err(WrapperError::Validation(format!(
                "Unknown resource: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Event => "event",
            Resource::Workflow => "workflow",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation
// ─────────────────────────────────────────────────────────────────────────────

/// One supported SDK operation with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddEvent(EventHandlerParams),
    GetEvents,
    GetEventsByName(EventQueryParams),
    UpdateEvent(EventHandlerParams),
    DeleteEvent(DeleteEventParams),
    GetWorkflow(GetWorkflowParams),
    StartWorkflow(StartWorkflowParams),
    TerminateWorkflow(TerminateWorkflowParams),
}

impl Operation {
    /// Look up `name` in the operation table of `resource`.
    pub fn parse(resource: Resource, name: &str, parameters: Map<String, Value>) -> Result<Self> {
        let operation = match (resource, name) {
            (Resource::Event, "add-event") => Operation::AddEvent(params(name, parameters)?),
            (Resource::Event, "get-event") => Operation::GetEvents,
            (Resource::Event, "get-event-by-name") => {
                Operation::GetEventsByName(params(name, parameters)?)
            }
            (Resource::Event, "update-event") => Operation::UpdateEvent(params(name, parameters)?),
            (Resource::Event, "delete-event") => Operation::DeleteEvent(params(name, parameters)?),
            (Resource::Workflow, "get-workflow") => {
                Operation::GetWorkflow(params(name, parameters)?)
            }
            (Resource::Workflow, "start-workflow") => {
                Operation::StartWorkflow(params(name, parameters)?)
            }
            (Resource::Workflow, "terminate-workflow") => {
                Operation::TerminateWorkflow(params(name, parameters)?)
            }
            (resource, other) => {
                return Err(WrapperError::Validation(format!(
                    "Unknown {} operation: {}",
                    resource, other
                )));
            }
        };
        Ok(operation)
    }

    /// CLI name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddEvent(_) => "add-event",
            Operation::GetEvents => "get-event",
            Operation::GetEventsByName(_) => "get-event-by-name",
            Operation::UpdateEvent(_) => "update-event",
            Operation::DeleteEvent(_) => "delete-event",
            Operation::GetWorkflow(_) => "get-workflow",
            Operation::StartWorkflow(_) => "start-workflow",
            Operation::TerminateWorkflow(_) => "terminate-workflow",
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Operation::AddEvent(_)
            | Operation::GetEvents
            | Operation::GetEventsByName(_)
            | Operation::UpdateEvent(_)
            | Operation::DeleteEvent(_) => Resource::Event,
            Operation::GetWorkflow(_)
            | Operation::StartWorkflow(_)
            | Operation::TerminateWorkflow(_) => Resource::Workflow,
        }
    }
}

fn params<P: DeserializeOwned>(operation: &str, parameters: Map<String, Value>) -> Result<P> {
    serde_json::from_value(Value::Object(parameters)).map_err(|e| {
        WrapperError::Validation(format!("invalid parameters for {}: {}", operation, e))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters of `add-event` and `update-event`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventHandlerParams {
    pub name: String,
    pub event: String,
    /// Defaults to `false`.
    #[serde(deserialize_with = "lenient_bool")]
    pub active: Option<bool>,
}

impl EventHandlerParams {
    /// Build the handler request: one action starting the fixed test workflow.
    pub fn to_handler(&self) -> EventHandler {
        EventHandler {
            name: self.name.clone(),
            event: self.event.clone(),
            active: self.active.unwrap_or(false),
            actions: vec![Action::start_workflow(StartWorkflow {
                name: HANDLER_WORKFLOW_NAME.to_string(),
                version: Some(HANDLER_WORKFLOW_VERSION),
                input: Map::new(),
                ..Default::default()
            })],
            ..Default::default()
        }
    }
}

/// Parameters of `get-event-by-name`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventQueryParams {
    pub event: String,
    /// `None` means no filter.
    #[serde(deserialize_with = "lenient_bool")]
    pub active_only: Option<bool>,
}

/// Parameters of `delete-event`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteEventParams {
    pub name: String,
}

/// Parameters of `get-workflow`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetWorkflowParams {
    pub workflow_id: String,
    /// `None` leaves the choice to the server.
    #[serde(deserialize_with = "lenient_bool")]
    pub include_tasks: Option<bool>,
}

/// Parameters of `start-workflow`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StartWorkflowParams {
    pub name: String,
    pub version: Option<i32>,
    pub correlation_id: Option<String>,
    pub input: Map<String, Value>,
}

impl StartWorkflowParams {
    pub fn to_request(&self) -> StartWorkflowRequest {
        StartWorkflowRequest {
            name: self.name.clone(),
            version: self.version,
            correlation_id: self.correlation_id.clone(),
            input: self.input.clone(),
        }
    }
}

/// Parameters of `terminate-workflow`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerminateWorkflowParams {
    pub workflow_id: String,
    pub reason: Option<String>,
}

/// Accept JSON booleans and the strings `"true"` / `"false"`.
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(other) => Err(D::Error::custom(format!(
            "expected a boolean, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(resource: &str, operation: &str, parameters: &str) -> Result<Operation> {
        Invocation::new(resource, operation, parameters).parse()
    }

    #[test]
    fn test_every_table_entry_parses() {
        let table = [
            ("event", "add-event", r#"{"name":"h1","event":"e"}"#),
            ("event", "get-event", "{}"),
            ("event", "get-event-by-name", r#"{"event":"e"}"#),
            ("event", "update-event", r#"{"name":"h1","event":"e"}"#),
            ("event", "delete-event", r#"{"name":"h1"}"#),
            ("workflow", "get-workflow", r#"{"workflowId":"wf-1"}"#),
            ("workflow", "start-workflow", r#"{"name":"checkout"}"#),
            ("workflow", "terminate-workflow", r#"{"workflowId":"wf-1"}"#),
        ];

        for (resource, operation, parameters) in table {
            let parsed = parse(resource, operation, parameters).unwrap();
            assert_eq!(parsed.name(), operation);
            assert_eq!(parsed.resource().as_str(), resource);
        }
    }

    #[test]
    fn test_unknown_resource() {
        let err = parse("task", "get-event", "{}").unwrap_err();
        assert_eq!(err.to_string(), "Unknown resource: task");
    }

    #[test]
    fn test_operation_from_other_resource_is_unknown() {
        let err = parse("workflow", "get-event", "{}").unwrap_err();
        assert_eq!(err.to_string(), "Unknown workflow operation: get-event");

        let err = parse("event", "get-workflow", "{}").unwrap_err();
        assert_eq!(err.to_string(), "Unknown event operation: get-workflow");
    }

    #[test]
    fn test_invalid_json_parameters() {
        let err = parse("event", "get-event", "{not json").unwrap_err();
        assert!(matches!(err, WrapperError::InvalidParameters(_)));
    }

    #[test]
    fn test_parameters_must_be_an_object() {
        let err = parse("event", "get-event", "[1,2]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameters must be a JSON object, got an array"
        );
    }

    #[test]
    fn test_active_defaults_to_false() {
        let Operation::AddEvent(params) =
            parse("event", "add-event", r#"{"name":"h1","event":"e"}"#).unwrap()
        else {
            panic!("expected add-event");
        };
        assert_eq!(params.active, None);
        assert!(!params.to_handler().active);
    }

    #[test]
    fn test_handler_has_single_fixed_action() {
        let params = EventHandlerParams {
            name: "h1".to_string(),
            event: "kafka:orders".to_string(),
            active: Some(true),
        };
        let handler = params.to_handler();

        assert_eq!(handler.name, "h1");
        assert_eq!(handler.event, "kafka:orders");
        assert!(handler.active);
        assert_eq!(handler.actions.len(), 1);

        let action = &handler.actions[0];
        assert_eq!(action.action, "start_workflow");
        let start = action.start_workflow.as_ref().unwrap();
        assert_eq!(start.name, "test_workflow");
        assert_eq!(start.version, Some(1));
        assert!(start.input.is_empty());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let Operation::DeleteEvent(params) = parse("event", "delete-event", "{}").unwrap() else {
            panic!("expected delete-event");
        };
        assert_eq!(params.name, "");
    }

    #[test]
    fn test_active_only_omitted_is_none() {
        let Operation::GetEventsByName(params) =
            parse("event", "get-event-by-name", r#"{"event":"e"}"#).unwrap()
        else {
            panic!("expected get-event-by-name");
        };
        assert_eq!(params.active_only, None);
    }

    #[test]
    fn test_booleans_accept_strings() {
        let Operation::GetEventsByName(params) = parse(
            "event",
            "get-event-by-name",
            r#"{"event":"e","activeOnly":"TRUE"}"#,
        )
        .unwrap() else {
            panic!("expected get-event-by-name");
        };
        assert_eq!(params.active_only, Some(true));

        let Operation::UpdateEvent(params) =
            parse("event", "update-event", r#"{"name":"h","active":"false"}"#).unwrap()
        else {
            panic!("expected update-event");
        };
        assert_eq!(params.active, Some(false));
    }

    #[test]
    fn test_badly_typed_boolean_is_rejected() {
        let err = parse("event", "add-event", r#"{"name":"h","active":3}"#).unwrap_err();
        assert!(matches!(err, WrapperError::Validation(_)));
        assert!(err.to_string().starts_with("invalid parameters for add-event"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let parsed = parse(
            "workflow",
            "get-workflow",
            r#"{"workflowId":"wf-1","includeTasks":true,"extra":1}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Operation::GetWorkflow(GetWorkflowParams {
                workflow_id: "wf-1".to_string(),
                include_tasks: Some(true),
            })
        );
    }

    #[test]
    fn test_start_workflow_request() {
        let Operation::StartWorkflow(params) = parse(
            "workflow",
            "start-workflow",
            r#"{"name":"checkout","version":2,"correlationId":"c-1","input":{"sku":"A1"}}"#,
        )
        .unwrap() else {
            panic!("expected start-workflow");
        };

        let request = params.to_request();
        assert_eq!(request.name, "checkout");
        assert_eq!(request.version, Some(2));
        assert_eq!(request.correlation_id.as_deref(), Some("c-1"));
        assert_eq!(request.input.get("sku"), Some(&Value::from("A1")));
    }
}
