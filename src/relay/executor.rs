//! Translates a relay description into one outbound call and captures the result.
//!
//! # Responsibilities
//! - Build the outbound request (method, URL, headers; never a body)
//! - Execute it through the shared client, no retries
//! - Read the full upstream body and store it in the registry
//! - Produce the summary returned to the caller
//!
//! # Design Decisions
//! - The registry is written only after the summary has been encoded, so a
//!   failed call never leaves an entry behind
//! - Repeated upstream header names collapse to their first value
//! - No deadline unless one is configured
//! - Caller headers that frame or route the message are dropped: the HTTP
//!   client owns Content-Length, Transfer-Encoding and Host

use axum::body::Bytes;
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client, Method,
};
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

use crate::config::UpstreamConfig;
use crate::registry::ResponseRegistry;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::types::{RelayRequest, RelayResponse};

/// A completed relay call: the summary and its JSON encoding.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub summary: RelayResponse,
    pub json: Bytes,
}

/// What came back from upstream, before it is registered.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

/// Executes relay calls against third-party servers.
///
/// Cheap to clone; clones share the HTTP client and the registry.
#[derive(Clone)]
pub struct RelayExecutor {
    client: Client,
    registry: ResponseRegistry,
}

impl RelayExecutor {
    /// Create an executor with a client built from `config`.
    pub fn new(config: &UpstreamConfig, registry: ResponseRegistry) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self::with_client(builder.build()?, registry))
    }

    pub fn with_client(client: Client, registry: ResponseRegistry) -> Self {
        Self { client, registry }
    }

    pub fn registry(&self) -> &ResponseRegistry {
        &self.registry
    }

    /// Run one relay call end to end.
    pub async fn relay(&self, request: RelayRequest) -> RelayResult<Relayed> {
        request.validate()?;

        let id = Uuid::new_v4().to_string();
        tracing::debug!(
            relay_id = %id,
            method = %request.method,
            url = %request.url,
            header_count = request.headers.len(),
            "Relaying request"
        );

        let outbound = self.build(&request)?;
        let upstream = self.execute(outbound).await?;

        let summary = RelayResponse {
            id: id.clone(),
            status: upstream.status,
            headers: upstream.headers,
            length: upstream.body.len(),
        };
        let json = serde_json::to_vec(&summary).map_err(RelayError::Encoding)?;

        self.registry.put(id, upstream.body);
        tracing::info!(
            relay_id = %summary.id,
            status = summary.status,
            length = summary.length,
            "Stored upstream response"
        );

        Ok(Relayed {
            summary,
            json: Bytes::from(json),
        })
    }

    /// Build the outbound request. It never carries a body.
    pub fn build(&self, request: &RelayRequest) -> RelayResult<reqwest::Request> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            RelayError::RequestConstruction(format!("invalid method {:?}", request.method))
        })?;

        let url = Url::parse(&request.url).map_err(|e| {
            RelayError::RequestConstruction(format!("invalid url {:?}: {}", request.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::RequestConstruction(format!(
                "unsupported url scheme {:?}",
                url.scheme()
            )));
        }

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                RelayError::RequestConstruction(format!("invalid header field name {:?}", name))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                RelayError::RequestConstruction(format!(
                    "invalid header field value for {:?}",
                    name
                ))
            })?;
            if is_client_managed(&header_name) {
                tracing::debug!(header = %header_name, "Dropping client-managed header");
                continue;
            }
            headers.insert(header_name, header_value);
        }

        self.client
            .request(method, url)
            .headers(headers)
            .build()
            .map_err(|e| RelayError::RequestConstruction(e.to_string()))
    }

    /// Send the request and read the whole body into memory.
    pub async fn execute(&self, outbound: reqwest::Request) -> RelayResult<UpstreamResponse> {
        let response = self.client.execute(outbound).await.map_err(|e| {
            if e.is_builder() {
                RelayError::RequestConstruction(e.to_string())
            } else {
                RelayError::Execution(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers = collapse_headers(response.headers());
        let body = response.bytes().await.map_err(RelayError::BodyRead)?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Headers the outbound client derives itself. A caller-supplied value would
/// announce a body that is never sent, or retarget the request.
fn is_client_managed(name: &HeaderName) -> bool {
    [header::CONTENT_LENGTH, header::TRANSFER_ENCODING, header::HOST].contains(name)
}

/// Keep the first value of every header name.
pub fn collapse_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .filter_map(|name| {
            headers.get(name).map(|value| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
        })
        .collect()
}
