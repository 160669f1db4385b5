use std::sync::Arc;

use tracing::{debug, info};

use dineline_core::domain::menu::{Menu, MenuItem};
use dineline_core::domain::order::OrderState;
use dineline_core::domain::transcript::ActionRequest;
use dineline_core::errors::OrderError;

/// Executes the bounded action set against the shared menu and one
/// session's order state. Every failure is folded into the returned
/// result text; nothing here aborts a turn.
#[derive(Clone)]
pub struct ToolExecutor {
    menu: Arc<Menu>,
}

impl ToolExecutor {
    pub fn new(menu: Arc<Menu>) -> Self {
        Self { menu }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn execute(&self, order: &mut OrderState, action: &ActionRequest) -> String {
        debug!(event_name = "agent.tool.execute", tool = action.tool_name(), "executing tool");

        match action {
            ActionRequest::SearchMenu { query } => self.search(query),
            ActionRequest::AddToCart { item_id, quantity } => self.add(order, item_id, *quantity),
            ActionRequest::RequestHandoff { reason } => Self::handoff(order, reason),
        }
    }

    fn search(&self, query: &str) -> String {
        let matches = self.menu.search(query);
        if matches.is_empty() {
            return format!("System: No items found matching '{query}'.");
        }

        let mut reply = String::from("System: Available items:\n");
        for item in matches {
            reply.push_str(&describe_item(item));
            reply.push('\n');
        }
        reply.trim_end().to_string()
    }

    fn add(&self, order: &mut OrderState, item_id: &str, quantity: i64) -> String {
        let Some(orderable) = self.menu.resolve(item_id) else {
            return OrderError::InvalidReference { item_id: item_id.to_string() }
                .tool_result_text();
        };

        let name = orderable.name.clone();
        match order.add_line(orderable, quantity) {
            Ok(new_total) => {
                info!(
                    event_name = "agent.cart.line_added",
                    item_id,
                    quantity,
                    total = %new_total,
                    "cart line added"
                );
                format!("System: Added {quantity} x {name}. Order total is now ${new_total:.2}.")
            }
            Err(error) => error.tool_result_text(),
        }
    }

    fn handoff(order: &mut OrderState, reason: &str) -> String {
        let newly_set = order.request_handoff();
        if newly_set {
            info!(event_name = "agent.handoff.requested", reason, "human handoff requested");
        }
        "System: Handoff initiated. A human agent will take over this call.".to_string()
    }
}

/// One search-result line: display name, dietary/spice metadata, and every
/// orderable id with its authoritative price. These ids are the only
/// sanctioned input for `add_to_cart`.
fn describe_item(item: &MenuItem) -> String {
    let mut metadata = Vec::new();
    if item.vegetarian {
        metadata.push("vegetarian".to_string());
    }
    if let Some(spice) = item.spice_level {
        metadata.push(format!("spice: {}", spice.display_name()));
    }
    if !item.allergens.is_empty() {
        metadata.push(format!("contains {}", item.allergens.join(", ")));
    }

    let metadata = if metadata.is_empty() { String::new() } else {
        format!(" [{}]", metadata.join("; "))
    };

    if item.variants.is_empty() {
        let price = item.price.unwrap_or_default();
        return format!("- {}{}: id {}, ${:.2}", item.name, metadata, item.id.0, price);
    }

    let variants = item
        .variants
        .iter()
        .map(|variant| format!("{} (id {}, ${:.2})", variant.name, variant.id.0, variant.price))
        .collect::<Vec<_>>()
        .join(", ");
    format!("- {}{}: {}", item.name, metadata, variants)
}
