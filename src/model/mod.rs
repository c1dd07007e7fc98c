pub mod element;
pub mod memory;
pub mod query;
pub mod value;

pub use element::Element;
pub use memory::InMemoryModel;
pub use query::{type_matches, ModelQuery};
pub use value::{PropertySet, PropertySets, PropertyValue};
