pub mod assertion;
pub mod chain;
pub mod config;
pub mod error;
pub mod http;
pub mod jsonpath;
pub mod logger;
pub mod variable;

// Re-export commonly used types
pub use chain::{ChainExecutor, ChainRequest, ChainResponse};
pub use error::{ChainpostError, Result};
