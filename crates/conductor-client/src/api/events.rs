//! Event handler API.

use crate::client::ConductorClient;
use crate::error::Result;
use crate::types::EventHandler;

/// Query parameters for listing the handlers of one event.
#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct EventHandlersQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    active_only: Option<bool>,
}

/// Event handler API client.
pub struct EventsApi {
    client: ConductorClient,
}

impl EventsApi {
    pub(crate) fn new(client: ConductorClient) -> Self {
        Self { client }
    }

    /// Register a new event handler.
    pub async fn add(&self, handler: &EventHandler) -> Result<()> {
        self.client.post(&["event"], handler).await
    }

    /// Replace an existing event handler, matched by name.
    pub async fn update(&self, handler: &EventHandler) -> Result<()> {
        self.client.put(&["event"], handler).await
    }

    /// List all event handlers.
    pub async fn list(&self) -> Result<Vec<EventHandler>> {
        self.client.get(&["event"]).await
    }

    /// List the handlers registered for `event`.
    ///
    /// `active_only` of `None` sends no filter, so the server returns handlers
    /// regardless of their active flag.
    pub async fn list_for_event(
        &self,
        event: &str,
        active_only: Option<bool>,
    ) -> Result<Vec<EventHandler>> {
        self.client
            .get_with_query(&["event", event], &EventHandlersQuery { active_only })
            .await
    }

    /// Remove an event handler by name.
    pub async fn remove(&self, name: &str) -> Result<()> {
        self.client.delete(&["event", name]).await
    }
}
