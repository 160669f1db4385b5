use dineline_core::domain::order::OrderState;

/// Fixed behavioral policy for the ordering assistant. Business rules live
/// here, not in code: pricing only via search, no goodbye until the caller
/// is done, immediate handoff on frustration.
pub const BEHAVIOR_POLICY: &str = "\
You are DineLine, an AI phone ordering assistant.
Rules:
1. Keep responses under 20 words. This is a voice call: plain text only, no markdown.
2. NEVER state a price you have not looked up with the `search_menu` tool in this call.
3. When the caller confirms an item, add it with the `add_to_cart` tool using the exact id \
from a `search_menu` result.
4. NEVER calculate prices yourself. The cart below is the only source of totals.
5. If the caller is frustrated or asks for a human, call `request_human_handoff` immediately \
and stop taking the order.
6. DO NOT say \"Goodbye\" or any closing phrase until the caller explicitly says they are \
finished ordering (e.g. \"that's all\", \"I'm done\").
7. When they are finished, tell them their total and say \"Goodbye\".";

/// Renders the cart so the reasoning engine never needs arithmetic memory
/// across turns.
pub fn render_order(order: &OrderState) -> String {
    if order.is_empty() {
        return format!("Current cart: empty\nTotal: ${:.2}", order.total());
    }

    let mut rendered = String::from("Current cart:\n");
    for line in order.lines() {
        rendered.push_str(&format!(
            "- {} x{} @ ${:.2} = ${:.2}\n",
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total()
        ));
    }
    rendered.push_str(&format!("Total: ${:.2}", order.total()));
    rendered
}

/// The per-invocation system instruction: fixed policy plus the current
/// cart snapshot.
pub fn system_instruction(order: &OrderState) -> String {
    format!("{BEHAVIOR_POLICY}\n\n{}", render_order(order))
}

#[cfg(test)]
mod tests {
    use dineline_core::domain::menu::Menu;
    use dineline_core::domain::order::OrderState;

    use super::{render_order, system_instruction, BEHAVIOR_POLICY};

    #[test]
    fn empty_cart_renders_zero_total() {
        let rendered = render_order(&OrderState::new());
        assert!(rendered.contains("empty"));
        assert!(rendered.contains("$0.00"));
    }

    #[test]
    fn snapshot_lists_lines_and_running_total() {
        let menu = Menu::builtin();
        let mut order = OrderState::new();
        order
            .add_line(menu.resolve("pepperoni_small").expect("resolves"), 2)
            .expect("valid quantity");

        let rendered = render_order(&order);
        assert!(rendered.contains("Pepperoni Pizza (Small) x2"));
        assert!(rendered.contains("$20.00"));
    }

    #[test]
    fn instruction_concatenates_policy_and_snapshot() {
        let instruction = system_instruction(&OrderState::new());
        assert!(instruction.starts_with(BEHAVIOR_POLICY));
        assert!(instruction.contains("Current cart"));
    }
}
