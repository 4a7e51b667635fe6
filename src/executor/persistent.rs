//! Durability decorator: persists run state before the step loop starts and
//! after it stops, so a run can be reloaded in another process and resumed
//! with identical semantics.

use std::sync::Arc;

use super::result::WorkflowResult;
use super::workflow_executor::{ExecutionContext, WorkflowExecutor};
use crate::error::WorkflowError;
use crate::graph::WorkflowDefinition;
use crate::repository::StateRepository;
use crate::state::{DataMap, WorkflowState};

pub struct PersistentWorkflowExecutor {
    inner: WorkflowExecutor,
    repository: Arc<dyn StateRepository>,
}

impl PersistentWorkflowExecutor {
    pub fn new(inner: WorkflowExecutor, repository: Arc<dyn StateRepository>) -> Self {
        PersistentWorkflowExecutor { inner, repository }
    }

    /// Save-before / save-after around a fresh run. Repository failures are
    /// surfaced as errors; the run itself still always yields a result.
    pub async fn execute(
        &self,
        definition: &WorkflowDefinition,
        input: DataMap,
        context: &ExecutionContext,
    ) -> Result<WorkflowResult, WorkflowError> {
        let state = self.inner.start_state(definition, &input, context);
        self.repository.save(&state).await?;
        tracing::debug!(run_id = %state.run_id, "initial state persisted");

        let result = self.inner.execute_prepared(definition, state, input).await;
        self.repository.save(&result.state).await?;
        Ok(result)
    }

    /// Resume from a caller-supplied snapshot.
    pub async fn resume(
        &self,
        definition: &WorkflowDefinition,
        state: WorkflowState,
        input: DataMap,
    ) -> Result<WorkflowResult, WorkflowError> {
        let state = self.inner.prepare_resume(state, &input)?;
        self.repository.save(&state).await?;

        let result = self.inner.resume_prepared(definition, state).await;
        self.repository.save(&result.state).await?;
        Ok(result)
    }

    /// Resume by run id: loads the persisted snapshot, rejecting missing
    /// runs and runs that are not suspended.
    pub async fn resume_run(
        &self,
        definition: &WorkflowDefinition,
        run_id: &str,
        input: DataMap,
    ) -> Result<WorkflowResult, WorkflowError> {
        let state = self
            .repository
            .find(run_id)
            .await?
            .ok_or_else(|| WorkflowError::WorkflowNotFound(run_id.to_string()))?;
        if !state.status.can_resume() {
            return Err(WorkflowError::WorkflowNotPaused {
                run_id: run_id.to_string(),
                status: state.status,
            });
        }
        self.resume(definition, state, input).await
    }

    pub fn repository(&self) -> &Arc<dyn StateRepository> {
        &self.repository
    }
}
