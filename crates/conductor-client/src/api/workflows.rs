//! Workflow API.

use crate::client::ConductorClient;
use crate::error::Result;
use crate::types::{StartWorkflowRequest, Workflow};

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    include_tasks: Option<bool>,
}

#[derive(Debug, Default, serde::Serialize)]
struct TerminateQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Workflow API client.
pub struct WorkflowsApi {
    client: ConductorClient,
}

impl WorkflowsApi {
    pub(crate) fn new(client: ConductorClient) -> Self {
        Self { client }
    }

    /// Get the execution status of a workflow.
    ///
    /// With `include_tasks` of `None` the server default applies.
    pub async fn get(&self, workflow_id: &str, include_tasks: Option<bool>) -> Result<Workflow> {
        self.client
            .get_with_query(&["workflow", workflow_id], &WorkflowQuery { include_tasks })
            .await
    }

    /// Start a workflow and return the new execution id.
    pub async fn start(&self, request: &StartWorkflowRequest) -> Result<String> {
        let id = self.client.post_for_text(&["workflow"], request).await?;
        Ok(id.trim().trim_matches('"').to_string())
    }

    /// Terminate a running workflow.
    pub async fn terminate(&self, workflow_id: &str, reason: Option<&str>) -> Result<()> {
        self.client
            .delete_with_query(&["workflow", workflow_id], &TerminateQuery { reason })
            .await
    }
}
