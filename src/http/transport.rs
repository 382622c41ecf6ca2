//! Transport layer.
//!
//! # Responsibilities
//! - Put a decorated request on the wire and return whatever the server answered
//! - Turn replayable multipart bodies into a fresh form on every send
//! - Map network failures into `TransportError`
//!
//! Non-2xx statuses are not errors at this layer; the client decides what
//! they mean.

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use url::Url;

use crate::config::ClientConfig;
use crate::http::error::{ApiError, TransportError, TransportErrorKind};
use crate::http::request::{ApiRequest, MultipartBody, RequestBody};
use crate::http::response::ApiResponse;

/// Something that can send an [`ApiRequest`] to a URL.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        url: Url,
        request: &'a ApiRequest,
    ) -> BoxFuture<'a, Result<ApiResponse, TransportError>>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the configured timeouts and user agent.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(&self, url: Url, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;
                builder.body(bytes)
            }
            RequestBody::Multipart(body) => builder.multipart(build_form(body)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ApiResponse::from_bytes(status, headers, &body))
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        url: Url,
        request: &'a ApiRequest,
    ) -> BoxFuture<'a, Result<ApiResponse, TransportError>> {
        Box::pin(self.execute(url, request))
    }
}

fn build_form(body: &MultipartBody) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in &body.parts {
        let mut p = Part::bytes(part.bytes.clone());
        if let Some(file_name) = &part.file_name {
            p = p.file_name(file_name.clone());
        }
        if let Some(mime) = &part.mime {
            p = p
                .mime_str(mime)
                .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;
        }
        form = form.part(part.name.clone(), p);
    }
    Ok(form)
}
