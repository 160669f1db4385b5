use thiserror::Error;

/// Recoverable cart/catalog failures. These never abort a conversation
/// turn; the tool execution engine folds them into ordinary tool-result
/// text so the reasoning engine can self-correct.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("unknown item or variant identifier `{item_id}`")]
    InvalidReference { item_id: String },
    #[error("quantity must be a positive integer, got {quantity}")]
    InvalidQuantity { quantity: i64 },
}

impl OrderError {
    /// Text reported back into conversation history when the action fails.
    pub fn tool_result_text(&self) -> String {
        match self {
            Self::InvalidReference { item_id } => format!(
                "Error: `{item_id}` is not a valid item id. Use search_menu to find the exact id."
            ),
            Self::InvalidQuantity { quantity } => {
                format!("Error: quantity must be a positive whole number, got {quantity}.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("orderable identifier `{id}` appears more than once in the menu")]
    DuplicateId { id: String },
    #[error("item `{item_id}` has no variants and no price")]
    MissingPrice { item_id: String },
    #[error("orderable `{id}` has a negative price")]
    NegativePrice { id: String },
    #[error("could not parse menu file: {0}")]
    Parse(#[source] toml::de::Error),
    #[error("could not read menu file `{path}`: {source}")]
    ReadFile { path: std::path::PathBuf, source: std::io::Error },
}
