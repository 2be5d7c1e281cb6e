pub mod health;
pub mod subscriptions;

pub use health::*;
pub use subscriptions::*;
