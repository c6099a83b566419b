//! HTTP client for the QRNG service
//!
//! Every accessor is a single round trip, apart from [`QrngClient::get_random_number`]
//! which keeps drawing until the sampler accepts a value. Transport and decode
//! failures are returned as-is; nothing is retried.

use crate::{
    config::ClientConfig,
    metrics::Metrics,
    protocol::{decode_envelope, HexType, RandomRequest, API_KEY_HEADER},
    reshape,
    sampler::BoundedSampler,
    Error, Result,
};
use reqwest::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Client for the ANU quantum random number API
#[derive(Debug, Clone)]
pub struct QrngClient {
    config: ClientConfig,
    http: Client,
    metrics: Metrics,
}

impl QrngClient {
    /// Client for the legacy endpoint (no API key)
    pub fn new() -> Result<Self> {
        Self::from_config(ClientConfig::legacy())
    }

    /// Client for the authenticated endpoint
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::with_api_key(api_key))
    }

    /// Create a client from a full configuration
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = ClientBuilder::new()
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("qrng-client/", env!("CARGO_PKG_VERSION")))
            .use_rustls_tls()
            .build()?;

        Ok(Self {
            config,
            http,
            metrics: Metrics::new(),
        })
    }

    /// Point the client at another endpoint
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.config.endpoint = endpoint.into();
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.set_endpoint(endpoint);
        self
    }

    /// Replace the transport. The configured timeout no longer applies; the new
    /// client's own settings do.
    pub fn set_http_client(&mut self, http: Client) {
        self.http = http;
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.set_http_client(http);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// `count` random bits (each 0 or 1), `count` in `[1, 8192]`
    pub async fn get_random_bits(&self, count: usize) -> Result<Vec<u8>> {
        check_count("numBits", count, crate::MAX_BITS)?;

        let bytes = self.get_random_uint8(count.div_ceil(8)).await?;
        Ok(reshape::extract_bits(&bytes, count))
    }

    /// `count` random bytes, `count` in `[1, 1024]`
    pub async fn get_random_uint8(&self, count: usize) -> Result<Vec<u8>> {
        check_count("numBytes", count, crate::MAX_UINT8_LENGTH)?;

        let values = self.request(RandomRequest::uint8(count)).await?;
        reshape::narrow_u8(&values)
    }

    /// `count` random 16-bit words, `count` in `[1, 1024]`
    pub async fn get_random_uint16(&self, count: usize) -> Result<Vec<u16>> {
        check_count("numShorts", count, crate::MAX_UINT16_LENGTH)?;

        let values = self.request(RandomRequest::uint16(count)).await?;
        reshape::narrow_u16(&values)
    }

    /// `block_count` lowercase hex strings
    ///
    /// `block_size` (bytes per block, `[1, 10]`) sets the width of `hex8` blocks;
    /// `hex16` blocks are always four digits.
    pub async fn get_random_hex(
        &self,
        block_count: usize,
        block_size: usize,
        hex_type: HexType,
    ) -> Result<Vec<String>> {
        reshape::check_block_size(block_size)?;
        check_count("blockCount", block_count, crate::MAX_HEX_BLOCKS)?;

        let values = self
            .request(RandomRequest::hex(block_count, hex_type, block_size))
            .await?;
        reshape::format_hex(&values, hex_type, block_size)
    }

    /// Uniformly distributed integer in `[min, max]`
    ///
    /// Each attempt consumes a fresh batch of bytes from the service. Gives up
    /// with [`Error::SamplingExhausted`] once the configured attempt cap is hit.
    pub async fn get_random_number(&self, min: i64, max: i64) -> Result<i64> {
        let sampler = BoundedSampler::new(min, max)?;
        let cap = self.config.max_sampling_attempts;
        let mut attempts = 0u32;

        loop {
            if cap.is_some_and(|cap| attempts >= cap) {
                warn!("No acceptable draw for [{}, {}] after {} attempts", min, max, attempts);
                return Err(Error::SamplingExhausted { attempts });
            }
            attempts += 1;

            let bytes = self.get_random_uint8(sampler.byte_len()).await?;
            match sampler.accept(&bytes) {
                Some(value) => {
                    self.metrics.record_draw(true);
                    if attempts > 1 {
                        debug!("Draw accepted after {} attempts", attempts);
                    }
                    return Ok(value);
                }
                None => {
                    self.metrics.record_draw(false);
                    debug!(
                        "Draw outside range of {} values, retrying",
                        sampler.range_size()
                    );
                }
            }
        }
    }

    /// One round trip: credential check, send, status check, decode
    #[instrument(skip(self))]
    async fn request(&self, request: RandomRequest) -> Result<Vec<u128>> {
        let credential = self.config.auth.credential()?;
        let url = self.build_request_url(&request)?;

        let started = Instant::now();
        match self.send(url, credential, request.length).await {
            Ok(values) => {
                self.metrics
                    .record_request(values.len(), started.elapsed().as_micros() as u64);
                Ok(values)
            }
            Err(e) => {
                self.metrics.record_request_failure();
                Err(e)
            }
        }
    }

    async fn send(&self, url: Url, credential: Option<&str>, requested: usize) -> Result<Vec<u128>> {
        debug!("Requesting {} values from {}", requested, url);

        let mut builder = self.http.get(url.clone());
        if let Some(key) = credential {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("Failed to fetch from {}: {}", url, e);
            Error::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("error reading body: {}", e),
            };
            warn!("HTTP error {}: {}", status, body);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let values = decode_envelope(&body, requested).map_err(|e| {
            warn!("Rejected response from {}: {}", url, e);
            e
        })?;

        debug!("Received {} values", values.len());
        Ok(values)
    }

    /// Endpoint with the request's query parameters appended
    fn build_request_url(&self, request: &RandomRequest) -> Result<Url> {
        let mut url = self.config.endpoint_url()?;
        request.apply_to(&mut url);
        Ok(url)
    }
}

fn check_count(name: &str, count: usize, max: usize) -> Result<()> {
    if count == 0 || count > max {
        return Err(Error::Validation(format!(
            "{} must be between 1 and {}",
            name, max
        )));
    }
    Ok(())
}
