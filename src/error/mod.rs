mod bag;
mod custom;
mod wrapped;

pub use bag::ErrorBag;
pub use custom::{CustomError, IntegrityError, ValidationError};
pub use wrapped::EngineError;

/// Export macros for creating errors
mod macros;
