mod bag;
mod custom;
mod wrapped;

pub use bag::ErrorBag;
pub use custom::CustomError;
pub use wrapped::PaymentError;

/// Export macros for creating errors
mod macros;
