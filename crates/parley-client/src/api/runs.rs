//! Runs API.

use crate::client::ParleyClient;
use crate::error::Result;
use crate::types::{
    CreateRunRequest, ListResponse, Run, RunStep, SubmitToolOutputsRequest, ToolOutput,
};

/// Runs API client.
pub struct RunsApi {
    client: ParleyClient,
}

impl RunsApi {
    pub(crate) fn new(client: ParleyClient) -> Self {
        Self { client }
    }

    /// Start a run against a thread.
    pub async fn create(&self, thread_id: &str, request: CreateRunRequest) -> Result<Run> {
        self.client
            .post(&format!("threads/{}/runs", thread_id), &request)
            .await
    }

    /// Fetch the current state of a run.
    pub async fn get(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.client
            .get(&format!("threads/{}/runs/{}", thread_id, run_id))
            .await
    }

    /// Resume a run paused on `requires_action` with one output per tool call.
    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_outputs: Vec<ToolOutput>,
    ) -> Result<Run> {
        self.client
            .post(
                &format!("threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
                &SubmitToolOutputsRequest { tool_outputs },
            )
            .await
    }

    /// List the steps of a run.
    pub async fn steps(&self, thread_id: &str, run_id: &str) -> Result<ListResponse<RunStep>> {
        self.client
            .get(&format!("threads/{}/runs/{}/steps", thread_id, run_id))
            .await
    }
}
