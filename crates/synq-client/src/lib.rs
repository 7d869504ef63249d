//! # synq-client
//!
//! Blocking client for the monitor management service.
//!
//! - [`auth`]: credentials and the OAuth client-credentials exchange
//! - [`backend`]: the [`Backend`] trait, the HTTP implementation and an in-memory mock
//! - [`resolve`]: mapping user-written entity references to canonical paths and back
//! - [`sink`]: writing reconciled change sets through a backend
//!
//! ## Example
//!
//! ```
//! use synq_client::{MockBackend, PathResolver};
//!
//! let backend = MockBackend::new();
//! backend.add_entity("warehouse::sales::orders", "table");
//!
//! let resolved = PathResolver::new(&backend)
//!     .resolve(&["warehouse.sales.orders".to_string()])
//!     .unwrap();
//! assert_eq!(resolved["warehouse.sales.orders"], "warehouse::sales::orders");
//! ```

pub mod auth;
pub mod backend;
pub mod error;
pub mod resolve;
pub mod sink;
pub mod types;

// Re-export main types at crate root
pub use auth::{Credentials, Endpoint};
pub use backend::http::HttpBackend;
pub use backend::{Backend, MockBackend};
pub use error::{Error, ErrorCategory, Result};
pub use resolve::{PathResolver, ResolutionError, ResolveError, path_with_colons, path_with_dots};
pub use sink::RemoteSink;
pub use types::{
    CoordinateCandidate, CoordinateMatch, EntityInfo, MONITORABLE_TYPES, MonitorQuery,
    PathCoordinates, SourceFilter,
};
