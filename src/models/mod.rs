//! Model declarations
//!
//! Defines the `Model` and `RecordStore` traits, the declaration DSL and the
//! registry that maps model types to their index configuration.

mod dsl;
mod registry;
mod traits;

pub use dsl::{
    CategoryExtractor, Declaration, FieldDef, FieldExtractor, IndexConfig, IndexDsl,
    VariableExtractor,
};
pub use registry::ModelRegistry;
pub use traits::{Model, RecordStore};
