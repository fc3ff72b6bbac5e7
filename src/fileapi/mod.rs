//! CMake File API client
//!
//! CMake is driven through an on-disk request/reply protocol: a query
//! descriptor is staged under the build folder before configuring, and the
//! generator answers with a tree of JSON documents under `reply/`. This
//! module owns staging the query and locating/loading reply documents.

pub mod error;
pub mod gateway;
pub mod query;

pub use error::FileApiError;
pub use gateway::{FileApi, ReplyLoader};
pub use query::{CLIENT_ID, Query, QueryRequest};
