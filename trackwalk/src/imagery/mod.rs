//! Street-level imagery lookup abstraction.
//!
//! The viewer synchronizer asks an [`ImageryLookup`] for the nearest
//! available imagery around a position. The answer arrives later as a
//! [`LookupResult`]; "no imagery here" is an ordinary status, not an error.
//!
//! # Dyn Compatibility
//!
//! [`ImageryLookup::find_nearest`] returns a boxed `'static` future so the
//! session can keep several lookups in flight without borrowing the lookup
//! and can hold the lookup as `Arc<dyn ImageryLookup>`.
//!
//! # Example
//!
//! ```ignore
//! use trackwalk::imagery::{ImageryLookup, LookupRequest, ReqwestClient, StreetViewClient};
//!
//! let client = StreetViewClient::new(ReqwestClient::new()?, api_key);
//! let result = client.find_nearest(request).await;
//! ```

mod http;
mod streetview;

pub use http::{AsyncHttpClient, ReqwestClient};
pub use streetview::{StreetViewClient, DEFAULT_METADATA_ENDPOINT};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::coord::Coordinate;

/// Default search radius around the requested position, in metres.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 50.0;

/// Default timeout for a single lookup request.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Transport-level failures inside a lookup implementation.
///
/// These never reach the navigation flow; lookups fold them into
/// [`LookupStatus::Unavailable`] after logging.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// The HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A request for imagery near a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupRequest {
    /// Position to search around.
    pub location: Coordinate,
    /// Search radius in metres.
    pub radius_m: f64,
    /// Heading the viewer should face once positioned.
    pub heading: f64,
    /// Sequence number of this lookup; newer lookups have larger values.
    pub generation: u64,
}

/// Imagery found by a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageryData {
    /// Provider identifier of the panorama, when known.
    pub pano_id: Option<String>,
    /// Where the imagery was actually captured.
    pub location: Coordinate,
    /// Capture date as reported by the provider (e.g. `2021-06`).
    pub date: Option<String>,
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupStatus {
    /// Imagery exists near the requested position.
    Ok(ImageryData),
    /// No imagery within the search radius.
    Unavailable,
}

impl LookupStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, LookupStatus::Ok(_))
    }
}

/// A completed lookup together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub request: LookupRequest,
    pub status: LookupStatus,
}

/// Finds street-level imagery near a position.
///
/// # Implementors
///
/// - `StreetViewClient` - Google Street View metadata endpoint
/// - Test doubles returning scripted statuses
pub trait ImageryLookup: Send + Sync {
    /// Look for imagery within `request.radius_m` of `request.location`.
    fn find_nearest(&self, request: LookupRequest) -> BoxFuture<'static, LookupResult>;
}
