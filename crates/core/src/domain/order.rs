use rust_decimal::Decimal;

use crate::domain::menu::OrderableRef;
use crate::errors::OrderError;

/// One cart entry. Name and unit price are snapshots taken at insertion
/// time; the line total is always derived, never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Per-call cart and handoff flag. Append-only for the life of the call and
/// mutated exclusively by the tool execution engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderState {
    lines: Vec<CartLine>,
    handoff_requested: bool,
}

impl OrderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Running total, recomputed from the lines on every call so it can
    /// never drift from their sum.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Appends a line for a resolved orderable. Rejects non-positive
    /// quantities without touching the cart.
    pub fn add_line(&mut self, orderable: OrderableRef, quantity: i64) -> Result<Decimal, OrderError> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(OrderError::InvalidQuantity { quantity })?;

        self.lines.push(CartLine {
            item_id: orderable.id,
            name: orderable.name,
            quantity,
            unit_price: orderable.unit_price,
        });

        Ok(self.total())
    }

    /// Marks the session for human handoff. Monotonic: returns `true` only
    /// on the transition, and the flag can never be cleared afterwards.
    pub fn request_handoff(&mut self) -> bool {
        let newly_set = !self.handoff_requested;
        self.handoff_requested = true;
        newly_set
    }

    pub fn handoff_requested(&self) -> bool {
        self.handoff_requested
    }
}
