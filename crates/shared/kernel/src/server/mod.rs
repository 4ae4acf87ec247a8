mod health;
pub mod identity;
pub mod router;
mod state;

pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
