//! The blocking HTTP round-trip behind `ApiSession`.

use std::time::Duration;

use carte_core::{ApiError, HttpRequest, HttpResponse};
use tracing::debug;

/// Executes one request. Non-2xx statuses are data, not errors; only a
/// failed round-trip is an `Err`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

fn transport_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::Transport(e.to_string())
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "api request");

        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(&request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = match request.body {
            Some(body) => self
                .agent
                .run(builder.body(body).map_err(transport_error)?),
            None => self.agent.run(builder.body(()).map_err(transport_error)?),
        }
        .map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
