//! The step loop that drives a run: resolve the current node, execute it,
//! fold the result into state, determine the next node, repeat.

use std::time::Instant;

use chrono::Utc;

use super::events::{EventSender, WorkflowEvent};
use super::result::WorkflowResult;
use crate::error::WorkflowError;
use crate::graph::WorkflowDefinition;
use crate::nodes::{NodeResult, NEXT_NODE_KEY};
use crate::state::{DataMap, NodeExecutionRecord, WorkflowState};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Step-count circuit breaker; exhausting it fails the run.
    pub max_steps: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig { max_steps: 1000 }
    }
}

/// Per-call execution context supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Becomes the run id when set; otherwise a fresh UUID is generated.
    pub correlation_id: Option<String>,
    pub metadata: DataMap,
}

impl ExecutionContext {
    pub fn with_correlation_id(id: impl Into<String>) -> Self {
        ExecutionContext {
            correlation_id: Some(id.into()),
            metadata: DataMap::new(),
        }
    }
}

/// Drives workflow runs through the synchronous, single-threaded step loop.
/// Suspension only ever happens at a node boundary.
#[derive(Clone, Default)]
pub struct WorkflowExecutor {
    config: ExecutorConfig,
    events: Option<EventSender>,
}

impl WorkflowExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        WorkflowExecutor {
            config,
            events: None,
        }
    }

    /// Emit lifecycle events on `sender`; sends are fire-and-forget.
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Build the initial `Running` snapshot for a fresh run.
    pub fn start_state(
        &self,
        definition: &WorkflowDefinition,
        input: &DataMap,
        context: &ExecutionContext,
    ) -> WorkflowState {
        let run_id = context
            .correlation_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        WorkflowState::start(definition.id.clone(), run_id, definition.entry_node.clone())
            .merge(input)
    }

    /// Run a workflow from its entry node. Always returns a
    /// [`WorkflowResult`]; runtime failures are folded into it.
    pub async fn execute(
        &self,
        definition: &WorkflowDefinition,
        input: DataMap,
        context: &ExecutionContext,
    ) -> WorkflowResult {
        let state = self.start_state(definition, &input, context);
        self.execute_prepared(definition, state, input).await
    }

    pub(crate) async fn execute_prepared(
        &self,
        definition: &WorkflowDefinition,
        state: WorkflowState,
        input: DataMap,
    ) -> WorkflowResult {
        self.emit(WorkflowEvent::Started {
            run_id: state.run_id.clone(),
            workflow_id: state.workflow_id.clone(),
            timestamp: Utc::now(),
        });
        self.run(definition, state, input).await
    }

    /// Validate a resume request and produce the re-entry snapshot. Fails
    /// with `InvalidState` when the status cannot resume.
    pub(crate) fn prepare_resume(
        &self,
        state: WorkflowState,
        input: &DataMap,
    ) -> Result<WorkflowState, WorkflowError> {
        if !state.status.can_resume() {
            return Err(WorkflowError::InvalidState {
                run_id: state.run_id,
                status: state.status,
            });
        }
        Ok(state.resume().merge(input))
    }

    /// Re-enter a suspended run at the node that paused, with `input`
    /// merged in. Caller misuse (a non-resumable status) is an error, not
    /// a failed [`WorkflowResult`].
    pub async fn resume(
        &self,
        definition: &WorkflowDefinition,
        state: WorkflowState,
        input: DataMap,
    ) -> Result<WorkflowResult, WorkflowError> {
        let state = self.prepare_resume(state, &input)?;
        Ok(self.resume_prepared(definition, state).await)
    }

    pub(crate) async fn resume_prepared(
        &self,
        definition: &WorkflowDefinition,
        state: WorkflowState,
    ) -> WorkflowResult {
        self.emit(WorkflowEvent::Resumed {
            run_id: state.run_id.clone(),
            node_id: state.current_node.clone(),
            timestamp: Utc::now(),
        });
        // The paused node re-evaluates against the full accumulated data.
        let input = state.data.clone();
        self.run(definition, state, input).await
    }

    async fn run(
        &self,
        definition: &WorkflowDefinition,
        mut state: WorkflowState,
        mut input: DataMap,
    ) -> WorkflowResult {
        for _ in 0..self.config.max_steps {
            let Some(node_id) = state.current_node.clone() else {
                break;
            };
            let Some(node) = definition.node(&node_id) else {
                let error = WorkflowError::NodeNotFound(node_id).to_string();
                return self.finish_failed(state, error);
            };

            self.emit(WorkflowEvent::NodeEntered {
                run_id: state.run_id.clone(),
                node_id: node_id.clone(),
                timestamp: Utc::now(),
            });
            tracing::debug!(run_id = %state.run_id, node_id = %node_id, "executing node");

            let executed_at = Utc::now();
            let started = Instant::now();
            let outcome = node.execute(&input, &state).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let result = match outcome {
                Ok(result) => result,
                // The step loop never lets a node's error escape: it is
                // recorded and terminates the run as Failed.
                Err(e) => {
                    let error = e.to_string();
                    state = state.record_node_execution(NodeExecutionRecord {
                        node_id: node_id.clone(),
                        input: input.clone(),
                        output: DataMap::new(),
                        duration_ms,
                        executed_at,
                        success: false,
                        error: Some(error.clone()),
                    });
                    self.emit_node_exited(&state, &node_id, false);
                    return self.finish_failed(state, error);
                }
            };

            state = state.record_node_execution(NodeExecutionRecord {
                node_id: node_id.clone(),
                input: input.clone(),
                output: result.output.clone(),
                duration_ms,
                executed_at,
                success: result.success,
                error: result.error.clone(),
            });
            self.emit_node_exited(&state, &node_id, result.success);

            if !result.success {
                let error = result
                    .error
                    .unwrap_or_else(|| "Node execution failed".to_string());
                return self.finish_failed(state, error);
            }

            if result.should_pause {
                let reason = result
                    .pause_reason
                    .clone()
                    .unwrap_or_else(|| "Paused".to_string());
                state = state.pause(reason.clone());
                self.emit(WorkflowEvent::Paused {
                    run_id: state.run_id.clone(),
                    node_id: state.current_node.clone(),
                    reason,
                    timestamp: Utc::now(),
                });
                return WorkflowResult::paused(state);
            }

            state = state.merge(&result.output);
            for (key, value) in &result.output {
                input.insert(key.clone(), value.clone());
            }

            let next = Self::next_node(definition, &node_id, &result, &input);
            state = state.move_to(next);
        }

        if state.current_node.is_none() {
            state = state.complete();
            self.emit(WorkflowEvent::Completed {
                run_id: state.run_id.clone(),
                timestamp: Utc::now(),
            });
            return WorkflowResult::completed(state);
        }

        let error = WorkflowError::MaxStepsExceeded(self.config.max_steps).to_string();
        self.finish_failed(state, error)
    }

    /// Next-node precedence: explicit override, then the reserved
    /// `_next_node` output key, then the first matching outgoing edge by
    /// priority. A present-but-null `_next_node` pins the next node to
    /// none, ending the run.
    fn next_node(
        definition: &WorkflowDefinition,
        current: &str,
        result: &NodeResult,
        input: &DataMap,
    ) -> Option<String> {
        if let Some(next) = &result.next_node {
            return Some(next.clone());
        }
        if let Some(value) = result.output.get(NEXT_NODE_KEY) {
            return value.as_str().map(|s| s.to_string());
        }
        definition
            .edges_from(current)
            .into_iter()
            .find(|edge| edge.matches(input))
            .map(|edge| edge.to.clone())
    }

    fn finish_failed(&self, state: WorkflowState, error: String) -> WorkflowResult {
        let state = state.fail();
        self.emit(WorkflowEvent::Failed {
            run_id: state.run_id.clone(),
            error: error.clone(),
            timestamp: Utc::now(),
        });
        tracing::warn!(run_id = %state.run_id, error = %error, "workflow run failed");
        WorkflowResult::failed(state, error)
    }

    fn emit_node_exited(&self, state: &WorkflowState, node_id: &str, success: bool) {
        self.emit(WorkflowEvent::NodeExited {
            run_id: state.run_id.clone(),
            node_id: node_id.to_string(),
            success,
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}
