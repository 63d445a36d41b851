//! Field registry: immutable field descriptors of a form

mod definition;
mod field;
mod field_registry;
mod value;

pub use definition::{FieldDefinition, FormDefinition, RuleSpec, ValidationSpec};
pub use field::{FieldDescriptor, FieldKind, SelectOption};
pub use field_registry::FieldRegistry;
pub use value::FieldValue;
