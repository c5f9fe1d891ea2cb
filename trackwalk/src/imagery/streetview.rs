//! Google Street View imagery lookup.
//!
//! Uses the Street View Image Metadata endpoint, which answers whether a
//! panorama exists near a location without fetching any imagery. Requests
//! are restricted to outdoor panoramas.
//!
//! # API Endpoint
//!
//! `https://maps.googleapis.com/maps/api/streetview/metadata?location={lat},{lng}&radius={r}&source=outdoor&key={API_KEY}`
//!
//! The response carries a `status` field; `OK` means a panorama was found,
//! `ZERO_RESULTS` / `NOT_FOUND` mean there is none nearby. Every other
//! status and every transport failure is treated as unavailable.

use serde::Deserialize;

use super::{
    AsyncHttpClient, BoxFuture, ImageryData, ImageryLookup, LookupError, LookupRequest,
    LookupResult, LookupStatus,
};
use crate::coord::Coordinate;

/// Default Street View metadata endpoint.
pub const DEFAULT_METADATA_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/streetview/metadata";

#[derive(Debug, Deserialize)]
struct MetadataLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    status: String,
    #[serde(default)]
    pano_id: Option<String>,
    #[serde(default)]
    location: Option<MetadataLocation>,
    #[serde(default)]
    date: Option<String>,
}

/// Street View metadata lookup.
///
/// Requires a Google Maps Platform API key with the Street View Static API
/// enabled. Metadata requests are not billed, but they count against quota.
///
/// # Example
///
/// ```no_run
/// use trackwalk::imagery::{ReqwestClient, StreetViewClient};
///
/// let client = ReqwestClient::new().unwrap();
/// let lookup = StreetViewClient::new(client, "YOUR_API_KEY".to_string());
/// // Hand the lookup to a Session...
/// ```
pub struct StreetViewClient<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    endpoint: String,
}

impl<C: AsyncHttpClient> StreetViewClient<C> {
    /// Creates a lookup against the default metadata endpoint.
    pub fn new(http_client: C, api_key: String) -> Self {
        Self::with_endpoint(http_client, api_key, DEFAULT_METADATA_ENDPOINT.to_string())
    }

    /// Creates a lookup against a custom endpoint (proxies, test servers).
    pub fn with_endpoint(http_client: C, api_key: String, endpoint: String) -> Self {
        Self {
            http_client,
            api_key,
            endpoint,
        }
    }

    /// Builds the metadata URL for a request.
    fn build_url(&self, request: &LookupRequest) -> String {
        format!(
            "{}?location={:.6},{:.6}&radius={}&source=outdoor&key={}",
            self.endpoint,
            request.location.lat,
            request.location.lng,
            request.radius_m.round() as u64,
            self.api_key
        )
    }
}

/// Decode a metadata response body into a lookup status.
fn parse_metadata(body: &[u8], requested: Coordinate) -> Result<LookupStatus, LookupError> {
    let response: MetadataResponse = serde_json::from_slice(body)
        .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

    match response.status.as_str() {
        "OK" => {
            let location = response
                .location
                .map(|l| Coordinate::new(l.lat, l.lng))
                .unwrap_or(requested);
            Ok(LookupStatus::Ok(ImageryData {
                pano_id: response.pano_id,
                location,
                date: response.date,
            }))
        }
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(LookupStatus::Unavailable),
        other => {
            tracing::warn!(status = other, "Street View metadata request was not served");
            Ok(LookupStatus::Unavailable)
        }
    }
}

impl<C: AsyncHttpClient> ImageryLookup for StreetViewClient<C> {
    fn find_nearest(&self, request: LookupRequest) -> BoxFuture<'static, LookupResult> {
        let url = self.build_url(&request);
        let client = self.http_client.clone();

        Box::pin(async move {
            let status = match client.get(&url).await {
                Ok(body) => parse_metadata(&body, request.location),
                Err(e) => Err(e),
            }
            .unwrap_or_else(|e| {
                tracing::warn!(
                    location = %request.location,
                    error = %e,
                    "Street View lookup failed"
                );
                LookupStatus::Unavailable
            });

            LookupResult { request, status }
        })
    }
}
