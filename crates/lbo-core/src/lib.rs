pub mod assumptions;
pub mod cash_flow;
pub mod credit_ratios;
pub mod debt_schedule;
pub mod error;
pub mod income_statement;
pub mod model;
pub mod returns;
pub mod sensitivity;
pub mod sources_uses;
pub mod types;

pub use error::LboError;
pub use model::{calculate_model, Model};
pub use types::*;

/// Standard result type for all engine operations
pub type LboResult<T> = Result<T, LboError>;
