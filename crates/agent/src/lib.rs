//! Conversation runtime - the turn-taking "brain" of DineLine.
//!
//! This crate drives the reasoning engine through a bounded action set and
//! keeps per-call conversation state:
//! - **Turn loop** (`conversation`) - invoke engine → route to tools or
//!   finish the turn → loop until a reply requests no actions
//! - **Tool execution** (`tools`) - search the menu, add to the cart,
//!   request human handoff
//! - **Prompt assembly** (`prompt`) - fixed behavioral policy + rendered
//!   cart snapshot, rebuilt on every engine invocation
//! - **Session state** (`session`) - append-only history + order state
//!   behind one lock
//!
//! # Safety Principle
//!
//! The reasoning engine is strictly a conversationalist. It NEVER computes
//! prices or totals: every price it may utter comes from a `search_menu`
//! result, and every total comes from the cart snapshot rendered into its
//! instructions.

pub mod conversation;
pub mod llm;
pub mod openai;
pub mod prompt;
pub mod session;
pub mod tools;

pub use conversation::{ConversationEngine, TurnOutcome, TurnPhase};
pub use llm::{AgentError, AssistantReply, LlmClient};
pub use openai::OpenAiChatClient;
pub use session::{CallSession, SessionState};
pub use tools::ToolExecutor;
