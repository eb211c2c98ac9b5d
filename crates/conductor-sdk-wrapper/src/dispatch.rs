//! Dispatch of a parsed [`Operation`] to the SDK.

use async_trait::async_trait;
use conductor_client::{ConductorClient, EventHandler, StartWorkflowRequest, Workflow};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::operation::Operation;

/// The SDK calls the wrapper makes.
///
/// Implemented by [`ConductorClient`]; tests substitute a recording mock.
#[async_trait]
pub trait ConductorApi: Send + Sync {
    async fn add_event_handler(&self, handler: &EventHandler) -> conductor_client::Result<()>;

    async fn update_event_handler(&self, handler: &EventHandler) -> conductor_client::Result<()>;

    async fn event_handlers(&self) -> conductor_client::Result<Vec<EventHandler>>;

    async fn event_handlers_for_event(
        &self,
        event: &str,
        active_only: Option<bool>,
    ) -> conductor_client::Result<Vec<EventHandler>>;

    async fn remove_event_handler(&self, name: &str) -> conductor_client::Result<()>;

    async fn workflow_status(
        &self,
        workflow_id: &str,
        include_tasks: Option<bool>,
    ) -> conductor_client::Result<Workflow>;

    async fn start_workflow(
        &self,
        request: &StartWorkflowRequest,
    ) -> conductor_client::Result<String>;

    async fn terminate_workflow(
        &self,
        workflow_id: &str,
        reason: Option<&str>,
    ) -> conductor_client::Result<()>;
}

#[async_trait]
impl ConductorApi for ConductorClient {
    async fn add_event_handler(&self, handler: &EventHandler) -> conductor_client::Result<()> {
        self.events().add(handler).await
    }

    async fn update_event_handler(&self, handler: &EventHandler) -> conductor_client::Result<()> {
        self.events().update(handler).await
    }

    async fn event_handlers(&self) -> conductor_client::Result<Vec<EventHandler>> {
        self.events().list().await
    }

    async fn event_handlers_for_event(
        &self,
        event: &str,
        active_only: Option<bool>,
    ) -> conductor_client::Result<Vec<EventHandler>> {
        self.events().list_for_event(event, active_only).await
    }

    async fn remove_event_handler(&self, name: &str) -> conductor_client::Result<()> {
        self.events().remove(name).await
    }

    async fn workflow_status(
        &self,
        workflow_id: &str,
        include_tasks: Option<bool>,
    ) -> conductor_client::Result<Workflow> {
        self.workflows().get(workflow_id, include_tasks).await
    }

    async fn start_workflow(
        &self,
        request: &StartWorkflowRequest,
    ) -> conductor_client::Result<String> {
        self.workflows().start(request).await
    }

    async fn terminate_workflow(
        &self,
        workflow_id: &str,
        reason: Option<&str>,
    ) -> conductor_client::Result<()> {
        self.workflows().terminate(workflow_id, reason).await
    }
}

/// Run `operation` against `api` and return the value reported as `data`.
pub async fn execute(api: &dyn ConductorApi, operation: Operation) -> Result<Value> {
    debug!(
        resource = %operation.resource(),
        operation = operation.name(),
        "dispatching"
    );

    let data = match operation {
        Operation::AddEvent(params) => {
            api.add_event_handler(&params.to_handler()).await?;
            Value::Null
        }
        Operation::GetEvents => serde_json::to_value(api.event_handlers().await?)
            .map_err(conductor_client::Error::from)?,
        Operation::GetEventsByName(params) => serde_json::to_value(
            api.event_handlers_for_event(&params.event, params.active_only)
                .await?,
        )
        .map_err(conductor_client::Error::from)?,
        Operation::UpdateEvent(params) => {
            api.update_event_handler(&params.to_handler()).await?;
            Value::Null
        }
        Operation::DeleteEvent(params) => {
            api.remove_event_handler(&params.name).await?;
            Value::Null
        }
        Operation::GetWorkflow(params) => serde_json::to_value(
            api.workflow_status(&params.workflow_id, params.include_tasks)
                .await?,
        )
        .map_err(conductor_client::Error::from)?,
        Operation::StartWorkflow(params) => {
            let workflow_id = api.start_workflow(&params.to_request()).await?;
            info!(%workflow_id, "workflow started");
            Value::String(workflow_id)
        }
        Operation::TerminateWorkflow(params) => {
            api.terminate_workflow(&params.workflow_id, params.reason.as_deref())
                .await?;
            Value::Null
        }
    };

    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use conductor_client::{Error, WorkflowStatus};
    use serde_json::json;

    use super::*;
    use crate::operation::Invocation;
    use crate::response::SdkResponse;

    /// A recorded SDK call.
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Add(EventHandler),
        Update(EventHandler),
        List,
        ListForEvent(String, Option<bool>),
        Remove(String),
        Workflow(String, Option<bool>),
        Start(StartWorkflowRequest),
        Terminate(String, Option<String>),
    }

    /// Mock SDK that records calls and optionally fails them all.
    #[derive(Default)]
    struct MockApi {
        calls: Mutex<Vec<Call>>,
        failure: Option<String>,
        handlers: Vec<EventHandler>,
    }

    impl MockApi {
        fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Default::default()
            }
        }

        fn with_handlers(handlers: Vec<EventHandler>) -> Self {
            Self {
                handlers,
                ..Default::default()
            }
        }

        fn record(&self, call: Call) -> conductor_client::Result<()> {
            self.calls.lock().unwrap().push(call);
            match &self.failure {
                Some(message) => Err(Error::NotFound(message.clone())),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConductorApi for MockApi {
        async fn add_event_handler(&self, handler: &EventHandler) -> conductor_client::Result<()> {
            self.record(Call::Add(handler.clone()))
        }

        async fn update_event_handler(
            &self,
            handler: &EventHandler,
        ) -> conductor_client::Result<()> {
            self.record(Call::Update(handler.clone()))
        }

        async fn event_handlers(&self) -> conductor_client::Result<Vec<EventHandler>> {
            self.record(Call::List)?;
            Ok(self.handlers.clone())
        }

        async fn event_handlers_for_event(
            &self,
            event: &str,
            active_only: Option<bool>,
        ) -> conductor_client::Result<Vec<EventHandler>> {
            self.record(Call::ListForEvent(event.to_string(), active_only))?;
            Ok(self
                .handlers
                .iter()
                .filter(|h| h.event == event && active_only.is_none_or(|a| h.active == a))
                .cloned()
                .collect())
        }

        async fn remove_event_handler(&self, name: &str) -> conductor_client::Result<()> {
            self.record(Call::Remove(name.to_string()))
        }

        async fn workflow_status(
            &self,
            workflow_id: &str,
            include_tasks: Option<bool>,
        ) -> conductor_client::Result<Workflow> {
            self.record(Call::Workflow(workflow_id.to_string(), include_tasks))?;
            Ok(serde_json::from_value(json!({
                "workflowId": workflow_id,
                "workflowName": "checkout",
                "status": "RUNNING"
            }))?)
        }

        async fn start_workflow(
            &self,
            request: &StartWorkflowRequest,
        ) -> conductor_client::Result<String> {
            self.record(Call::Start(request.clone()))?;
            Ok("wf-new".to_string())
        }

        async fn terminate_workflow(
            &self,
            workflow_id: &str,
            reason: Option<&str>,
        ) -> conductor_client::Result<()> {
            self.record(Call::Terminate(
                workflow_id.to_string(),
                reason.map(String::from),
            ))
        }
    }

    async fn respond(
        api: &MockApi,
        resource: &str,
        operation: &str,
        parameters: &str,
    ) -> SdkResponse {
        let result = match Invocation::new(resource, operation, parameters).parse() {
            Ok(operation) => execute(api, operation).await,
            Err(err) => Err(err),
        };
        SdkResponse::from_result(result)
    }

    fn handler(name: &str, event: &str, active: bool) -> EventHandler {
        EventHandler {
            name: name.to_string(),
            event: event.to_string(),
            active,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_every_operation_succeeds() {
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
            let api = MockApi::default();
            let response = respond(&api, resource, operation, parameters).await;
            assert!(response.success, "{operation} failed: {response:?}");
            assert_eq!(response.status_code, 200);
            assert_eq!(response.error_message, "");
            assert_eq!(api.calls().len(), 1, "{operation} should make one SDK call");
        }
    }

    #[tokio::test]
    async fn test_delete_event_envelope() {
        let api = MockApi::default();
        let response = respond(&api, "event", "delete-event", r#"{"name":"h1"}"#).await;

        assert_eq!(
            response.to_json_line(),
            r#"{"statusCode":200,"success":true,"data":null,"content":"","errorMessage":""}"#
        );
        assert_eq!(api.calls(), vec![Call::Remove("h1".to_string())]);
    }

    #[tokio::test]
    async fn test_sdk_error_envelope() {
        let api = MockApi::failing("not found");
        let response =
            respond(&api, "workflow", "get-workflow", r#"{"workflowId":"wf-123"}"#).await;

        assert_eq!(
            response.to_json_line(),
            r#"{"statusCode":500,"success":false,"data":null,"content":"","errorMessage":"not found"}"#
        );
        assert_eq!(api.calls(), vec![Call::Workflow("wf-123".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_validation_errors_make_no_sdk_call() {
        let cases = [
            ("event", "get-event", "{oops"),
            ("event", "get-workflow", "{}"),
            ("workflow", "add-event", "{}"),
            ("task", "get-event", "{}"),
        ];

        for (resource, operation, parameters) in cases {
            let api = MockApi::default();
            let response = respond(&api, resource, operation, parameters).await;
            assert!(!response.success);
            assert_eq!(response.status_code, 500);
            assert!(!response.error_message.is_empty());
            assert!(api.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_add_event_defaults_active_to_false() {
        let api = MockApi::default();
        respond(&api, "event", "add-event", r#"{"name":"h1","event":"kafka:orders"}"#).await;

        let calls = api.calls();
        let [Call::Add(sent)] = calls.as_slice() else {
            panic!("unexpected calls: {calls:?}");
        };
        assert!(!sent.active);
        assert_eq!(sent.actions.len(), 1);
        assert_eq!(
            sent.actions[0].start_workflow.as_ref().map(|s| s.name.as_str()),
            Some("test_workflow")
        );
    }

    #[tokio::test]
    async fn test_update_event_builds_same_handler_as_add() {
        let api = MockApi::default();
        let parameters = r#"{"name":"h1","event":"kafka:orders","active":true}"#;
        respond(&api, "event", "add-event", parameters).await;
        respond(&api, "event", "update-event", parameters).await;

        let calls = api.calls();
        let [Call::Add(added), Call::Update(updated)] = calls.as_slice() else {
            panic!("unexpected calls: {calls:?}");
        };
        assert_eq!(added, updated);
        assert!(updated.active);
    }

    #[tokio::test]
    async fn test_get_event_by_name_passes_no_filter_when_omitted() {
        let api = MockApi::with_handlers(vec![
            handler("h1", "e", true),
            handler("h2", "e", false),
            handler("h3", "other", true),
        ]);
        let response = respond(&api, "event", "get-event-by-name", r#"{"event":"e"}"#).await;

        assert_eq!(api.calls(), vec![Call::ListForEvent("e".to_string(), None)]);
        assert_eq!(response.data.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_get_event_by_name_with_filter() {
        let api = MockApi::with_handlers(vec![handler("h1", "e", true), handler("h2", "e", false)]);
        let response = respond(
            &api,
            "event",
            "get-event-by-name",
            r#"{"event":"e","activeOnly":false}"#,
        )
        .await;

        assert_eq!(
            api.calls(),
            vec![Call::ListForEvent("e".to_string(), Some(false))]
        );
        assert_eq!(response.data[0]["name"], "h2");
    }

    #[tokio::test]
    async fn test_list_data_and_content_agree() {
        let api = MockApi::with_handlers(vec![handler("h1", "e", true)]);
        let response = respond(&api, "event", "get-event", "{}").await;

        assert!(response.data.is_array());
        assert_eq!(serde_json::to_string(&response.data).unwrap(), response.content);
        let from_content: Value = serde_json::from_str(&response.content).unwrap();
        assert_eq!(from_content, response.data);
    }

    #[tokio::test]
    async fn test_get_workflow_returns_object() {
        let api = MockApi::default();
        let response = respond(
            &api,
            "workflow",
            "get-workflow",
            r#"{"workflowId":"wf-9","includeTasks":true}"#,
        )
        .await;

        assert_eq!(api.calls(), vec![Call::Workflow("wf-9".to_string(), Some(true))]);
        assert_eq!(response.data["workflowId"], "wf-9");
        let workflow: Workflow = serde_json::from_value(response.data).unwrap();
        assert_eq!(workflow.status, WorkflowStatus::Running);
    }

    #[tokio::test]
    async fn test_start_and_terminate_workflow() {
        let api = MockApi::default();
        let started = respond(
            &api,
            "workflow",
            "start-workflow",
            r#"{"name":"checkout","version":1}"#,
        )
        .await;
        assert_eq!(started.data, json!("wf-new"));
        assert_eq!(started.content, r#""wf-new""#);

        let terminated = respond(
            &api,
            "workflow",
            "terminate-workflow",
            r#"{"workflowId":"wf-new","reason":"done"}"#,
        )
        .await;
        assert!(terminated.success);
        assert_eq!(
            api.calls()[1],
            Call::Terminate("wf-new".to_string(), Some("done".to_string()))
        );
    }
}
