pub mod generator;
pub mod repository;
pub mod resolver;
pub mod types;

pub use repository::{DataRepository, InMemoryRepository};
pub use resolver::VariableResolver;
pub use types::{DataKind, DataVariable, RuntimeVariables, value_to_string};
