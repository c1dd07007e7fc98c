//! URA Development Control rules.

pub mod setback;

pub use setback::SetbackRule;
