use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::types::{GeocodeOutcome, Geocoder, NominatimPlace};

/// HTTP client for a Nominatim-compatible `/search` endpoint.
///
/// Every request asks for the single best match (`limit=1`) and carries the
/// configured `User-Agent`, as the public Nominatim usage policy requires.
/// The client never retries; pacing between lookups belongs to the caller.
pub struct NominatimClient {
    client: Client,
    base_url: Url,
}

impl NominatimClient {
    /// Creates a client pointed at `base_url` with the given timeout and
    /// identifying `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Ensure exactly one trailing slash so `join("search")` appends to the
        // base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Looks up the best match for a free-text address.
    ///
    /// Returns `Ok(None)` when the service answers with an empty result set.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::RateLimited`] on HTTP 429.
    /// - [`GeocodeError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GeocodeError::Http`] on network or TLS failure.
    /// - [`GeocodeError::Deserialize`] if the body is not a JSON place array.
    /// - [`GeocodeError::InvalidCoordinate`] if `lat`/`lon` are not finite numbers.
    pub async fn search(&self, address: &str) -> Result<Option<(f64, f64)>, GeocodeError> {
        let url = self.search_url(address)?;

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(GeocodeError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let places = serde_json::from_str::<Vec<NominatimPlace>>(&body).map_err(|e| {
            GeocodeError::Deserialize {
                context: format!("search results for \"{address}\""),
                source: e,
            }
        })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = parse_degrees("lat", &place.lat)?;
        let longitude = parse_degrees("lon", &place.lon)?;
        tracing::debug!(
            address,
            latitude,
            longitude,
            display_name = place.display_name.as_deref().unwrap_or(""),
            "geocoder match"
        );
        Ok(Some((latitude, longitude)))
    }

    /// Builds `{base}/search?q=..&format=json&limit=1` with the address
    /// percent-encoded.
    fn search_url(&self, address: &str) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        Ok(url)
    }
}

impl Geocoder for NominatimClient {
    async fn geocode(&self, address: &str) -> GeocodeOutcome {
        match self.search(address).await {
            Ok(Some((latitude, longitude))) => GeocodeOutcome::Found {
                latitude,
                longitude,
            },
            Ok(None) => GeocodeOutcome::NotFound,
            Err(e) => {
                tracing::warn!(address, error = %e, "geocoder lookup failed");
                GeocodeOutcome::TransportError(e.to_string())
            }
        }
    }
}

fn parse_degrees(field: &'static str, raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidCoordinate {
            field,
            value: raw.to_owned(),
        })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
