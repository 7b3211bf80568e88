//! Tower middleware for [`HttpTransport`](crate::transport::HttpTransport).
//!
//! ```ignore
//! use bytedance_sdk::middleware::LoggingMiddleware;
//! use bytedance_sdk::transport::HttpTransport;
//!
//! let transport = HttpTransport::builder()
//!     .with_middleware(LoggingMiddleware::new().verbose())
//!     .build_layered()?;
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;

pub use logging::LoggingMiddleware;
