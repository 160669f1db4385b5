/// The closed set of actions the reasoning engine may request. Typed
/// payloads keep the tool execution boundary an exhaustive match.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionRequest {
    SearchMenu { query: String },
    /// Quantity is carried as received from the wire; validation happens at
    /// execution time so a bad value becomes a recoverable tool result.
    AddToCart { item_id: String, quantity: i64 },
    RequestHandoff { reason: String },
}

impl ActionRequest {
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::SearchMenu { .. } => "search_menu",
            Self::AddToCart { .. } => "add_to_cart",
            Self::RequestHandoff { .. } => "request_human_handoff",
        }
    }
}

/// One requested tool call, tagged with the provider-assigned call id so the
/// result can be correlated in history.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub action: ActionRequest,
}

/// One entry of a session's conversation history. The history is
/// append-only and retained for the life of the call.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    System(String),
    User(String),
    Assistant { text: String, calls: Vec<ToolInvocation> },
    ToolResult { call_id: String, text: String },
}

impl Message {
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::Assistant { text: text.into(), calls: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionRequest, Message};

    #[test]
    fn tool_names_match_the_advertised_tool_set() {
        let search = ActionRequest::SearchMenu { query: "pizza".to_string() };
        let add = ActionRequest::AddToCart { item_id: "coke".to_string(), quantity: 1 };
        let handoff = ActionRequest::RequestHandoff { reason: "asked for manager".to_string() };

        assert_eq!(search.tool_name(), "search_menu");
        assert_eq!(add.tool_name(), "add_to_cart");
        assert_eq!(handoff.tool_name(), "request_human_handoff");
    }

    #[test]
    fn assistant_text_carries_no_calls() {
        let message = Message::assistant_text("Welcome!");
        assert!(matches!(message, Message::Assistant { ref calls, .. } if calls.is_empty()));
    }
}
