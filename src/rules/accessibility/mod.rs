//! BCA Accessibility Code rules.

pub mod corridor_width;
pub mod door_clearance;

pub use corridor_width::CorridorWidthRule;
pub use door_clearance::DoorClearanceRule;
