use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use dineline_core::config::LlmConfig;
use dineline_core::domain::transcript::{ActionRequest, Message, ToolInvocation};

use crate::llm::{AgentError, AssistantReply, LlmClient};

/// Reasoning-engine adapter for OpenAI-compatible chat-completions
/// endpoints. Provider wire types stay private to this module.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, AgentError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AgentError::ReasoningUnavailable("llm.api_key is not configured".to_string())
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AgentError::ReasoningUnavailable(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[Message],
    ) -> Result<AssistantReply, AgentError> {
        let body = json!({
            "model": self.model,
            "temperature": 0.0,
            "messages": render_messages(system_instruction, history),
            "tools": tool_definitions(),
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|error| AgentError::ReasoningUnavailable(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::ReasoningUnavailable(format!(
                "chat completion returned status {status}"
            )));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|error| AgentError::ReasoningUnavailable(error.to_string()))?;

        let reply = parse_reply(wire)?;
        debug!(
            event_name = "agent.llm.reply",
            has_text = !reply.text.is_empty(),
            requested_actions = reply.calls.len(),
            "received reasoning engine reply"
        );
        Ok(reply)
    }
}

fn render_messages(system_instruction: &str, history: &[Message]) -> Vec<Value> {
    let mut messages = vec![json!({ "role": "system", "content": system_instruction })];

    for message in history {
        match message {
            // The instruction is rebuilt with a fresh cart snapshot on every
            // invocation; stored system turns are superseded by it.
            Message::System(_) => {}
            Message::User(text) => {
                messages.push(json!({ "role": "user", "content": text }));
            }
            Message::Assistant { text, calls } => {
                let mut rendered = json!({ "role": "assistant", "content": text });
                if !calls.is_empty() {
                    rendered["tool_calls"] = calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.action.tool_name(),
                                    "arguments": render_arguments(&call.action),
                                },
                            })
                        })
                        .collect();
                }
                messages.push(rendered);
            }
            Message::ToolResult { call_id, text } => {
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call_id,
                    "content": text,
                }));
            }
        }
    }

    messages
}

fn render_arguments(action: &ActionRequest) -> String {
    let value = match action {
        ActionRequest::SearchMenu { query } => json!({ "query": query }),
        ActionRequest::AddToCart { item_id, quantity } => {
            json!({ "item_id": item_id, "quantity": quantity })
        }
        ActionRequest::RequestHandoff { reason } => json!({ "reason": reason }),
    };
    value.to_string()
}

fn tool_definitions() -> Value {
    json!([
        {
            "type": "function",
            "function": {
                "name": "search_menu",
                "description": "Search the menu BEFORE quoting a price or adding an item to the cart.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Free-text search query" }
                    },
                    "required": ["query"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": "add_to_cart",
                "description": "Add an item to the cart. You MUST provide the exact id from a search_menu result.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "item_id": { "type": "string", "description": "Exact orderable id" },
                        "quantity": { "type": "integer", "description": "Positive number of units" }
                    },
                    "required": ["item_id", "quantity"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": "request_human_handoff",
                "description": "Use IMMEDIATELY if the caller is frustrated or asks for a human.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "reason": { "type": "string", "description": "Why the caller needs a human" }
                    },
                    "required": ["reason"]
                }
            }
        }
    ])
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct AddArgs {
    item_id: String,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
struct HandoffArgs {
    #[serde(default)]
    reason: String,
}

fn parse_reply(wire: WireResponse) -> Result<AssistantReply, AgentError> {
    let message = wire
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| AgentError::ReasoningUnavailable("reply carried no choices".to_string()))?;

    let mut calls = Vec::with_capacity(message.tool_calls.len());
    for tool_call in message.tool_calls {
        calls.push(ToolInvocation {
            action: parse_action(&tool_call.function)?,
            id: tool_call.id,
        });
    }

    Ok(AssistantReply { text: message.content.unwrap_or_default(), calls })
}

fn parse_action(function: &WireFunction) -> Result<ActionRequest, AgentError> {
    let malformed = |error: serde_json::Error| {
        AgentError::ReasoningUnavailable(format!(
            "malformed arguments for tool `{}`: {error}",
            function.name
        ))
    };

    match function.name.as_str() {
        "search_menu" => {
            let args: SearchArgs = serde_json::from_str(&function.arguments).map_err(malformed)?;
            Ok(ActionRequest::SearchMenu { query: args.query })
        }
        "add_to_cart" => {
            let args: AddArgs = serde_json::from_str(&function.arguments).map_err(malformed)?;
            Ok(ActionRequest::AddToCart { item_id: args.item_id, quantity: args.quantity })
        }
        "request_human_handoff" => {
            let args: HandoffArgs =
                serde_json::from_str(&function.arguments).map_err(malformed)?;
            Ok(ActionRequest::RequestHandoff { reason: args.reason })
        }
        other => Err(AgentError::ReasoningUnavailable(format!(
            "reply requested unknown tool `{other}`"
        ))),
    }
}
