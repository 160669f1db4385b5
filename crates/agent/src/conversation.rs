use std::sync::Arc;

use tracing::{debug, warn};

use dineline_core::domain::transcript::Message;

use crate::llm::{AgentError, LlmClient};
use crate::prompt;
use crate::session::SessionState;
use crate::tools::ToolExecutor;

/// Per-turn phases. A turn re-enters `AwaitingReply` after every tool round
/// and finishes in `TurnComplete` once a reply carries no action requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingReply,
    ExecutingTools,
    TurnComplete,
}

/// Result of one completed turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    /// Reply text to surface to the caller. May be empty for tool-only
    /// closing rounds; callers must not synthesize empty text.
    pub reply: String,
    /// Number of tool rounds the turn needed (0 for a plain reply).
    pub tool_rounds: u32,
}

/// Upper bound on reasoning/tool rounds within one turn. A reasoning engine
/// that keeps requesting actions past this point is treated as unavailable.
const MAX_TOOL_ROUNDS: u32 = 8;

/// The turn-taking state machine: invoke the reasoning engine, route to
/// tool execution or terminate the turn, loop.
pub struct ConversationEngine {
    llm: Arc<dyn LlmClient>,
    tools: ToolExecutor,
}

impl ConversationEngine {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolExecutor) -> Self {
        Self { llm, tools }
    }

    pub fn tools(&self) -> &ToolExecutor {
        &self.tools
    }

    /// System-only priming turn run once at session start, before any user
    /// input: installs the behavioral policy into history.
    pub fn prime(&self, state: &mut SessionState) {
        state.history.push(Message::System(prompt::BEHAVIOR_POLICY.to_string()));
    }

    /// Runs exactly one turn for `user_text`. All action requests from a
    /// reply are executed in order before the engine is invoked again; the
    /// turn completes when a reply carries none.
    pub async fn run_turn(
        &self,
        state: &mut SessionState,
        user_text: &str,
    ) -> Result<TurnOutcome, AgentError> {
        state.history.push(Message::User(user_text.to_string()));

        let mut phase = TurnPhase::AwaitingReply;
        let mut tool_rounds = 0u32;

        loop {
            debug!(event_name = "agent.turn.invoke", phase = ?phase, "invoking reasoning engine");

            let instruction = prompt::system_instruction(&state.order);
            let reply = self.llm.complete(&instruction, &state.history).await?;

            state.history.push(Message::Assistant {
                text: reply.text.clone(),
                calls: reply.calls.clone(),
            });

            if reply.calls.is_empty() {
                phase = TurnPhase::TurnComplete;
                debug!(
                    event_name = "agent.turn.complete",
                    tool_rounds,
                    phase = ?phase,
                    "turn complete"
                );
                return Ok(TurnOutcome { reply: reply.text, tool_rounds });
            }

            phase = TurnPhase::ExecutingTools;
            tool_rounds += 1;
            debug!(
                event_name = "agent.turn.executing_tools",
                phase = ?phase,
                round = tool_rounds,
                requested = reply.calls.len(),
                "dispatching requested actions"
            );
            if tool_rounds > MAX_TOOL_ROUNDS {
                warn!(
                    event_name = "agent.turn.tool_loop_exceeded",
                    tool_rounds,
                    "tool loop exceeded cap; aborting turn"
                );
                return Err(AgentError::ReasoningUnavailable(format!(
                    "reply requested actions for more than {MAX_TOOL_ROUNDS} consecutive rounds"
                )));
            }

            for call in &reply.calls {
                let result_text = self.tools.execute(&mut state.order, &call.action);
                state
                    .history
                    .push(Message::ToolResult { call_id: call.id.clone(), text: result_text });
            }

            phase = TurnPhase::AwaitingReply;
        }
    }
}
