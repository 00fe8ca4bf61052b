pub mod clients;
pub mod error;
pub mod funnel;
pub mod promotion;
pub mod revenue;
pub mod scope;
pub mod tasks;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{CoreError, Result};
pub use scope::VisibilityScope;
