// core.rs splits responsibilities into submodules for easier maintenance.
pub mod chain;
pub mod frame;
pub mod validation;

pub use chain::*;
pub use frame::*;
pub use validation::*;
