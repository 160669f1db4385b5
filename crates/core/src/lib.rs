pub mod config;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::menu::{ItemId, Menu, MenuItem, OrderableRef, SpiceLevel, Variant, VariantId};
pub use domain::order::{CartLine, OrderState};
pub use domain::transcript::{ActionRequest, Message, ToolInvocation};
pub use errors::{MenuError, OrderError};
