pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::{Client, RetryPolicy, Transport};
pub use error::{TransportError, TransportErrorKind};
pub use request::Request;
pub use response::{RawResponse, parse_body};
pub use types::Method;
