use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{health_route, translate_route, HealthStatus, TranslationRequest, TranslationResponse},
};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod messages;
pub mod view;

pub use config::{load_settings, ClientSettings};
pub use controller::{FormSubmissionController, SubmissionOutcome, SubmitOptions, UiState};
pub use error::{ConfigError, ErrorCategory, SubmissionError, TransportError};
pub use events::{Disposer, FormEvents, SubmitEvent};
pub use messages::Locale;
pub use view::FormView;

#[async_trait]
pub trait TranslationApi: Send + Sync {
    /// POSTs the request and decodes the response envelope whatever the HTTP
    /// status; only transport or decoding problems are errors.
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TransportError>;
    async fn health(&self) -> Result<HealthStatus, TransportError>;
    async fn download_document(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Resolves a document link from a translation response against the server
/// base. Absolute links pass through unchanged.
pub fn resolve_document_url(base: &Url, raw: &str) -> Result<Url, url::ParseError> {
    as_directory(base).join(raw.trim())
}

/// Treats the base path as a directory so a prefix like `/translator` is kept
/// when routes are joined onto it.
fn as_directory(base: &Url) -> Url {
    let mut dir = base.clone();
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    dir
}

pub struct HttpTranslationApi {
    http: Client,
    base_url: Url,
}

impl HttpTranslationApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ConfigError> {
        let base_url = settings.server_base()?;
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ConfigError::HttpClient)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> Result<Url, TransportError> {
        Ok(as_directory(&self.base_url).join(route.trim_start_matches('/'))?)
    }
}

async fn decode_body<T: DeserializeOwned>(res: Response) -> Result<T, TransportError> {
    let status = res.status().as_u16();
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode { status, source })
}

async fn failure_status(res: Response) -> TransportError {
    let status = res.status().as_u16();
    let message = match res.json::<ApiError>().await {
        Ok(ApiError {
            error: Some(message),
            ..
        }) => message,
        _ => format!("{:?}", ErrorCode::from_status(status).unwrap_or(ErrorCode::Unexpected)),
    };
    TransportError::Status { status, message }
}

#[async_trait]
impl TranslationApi for HttpTranslationApi {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TransportError> {
        let res = self
            .http
            .post(self.endpoint(translate_route())?)
            .json(request)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "translate endpoint returned an error status");
        }
        let body: TranslationResponse = decode_body(res).await?;
        debug!(
            status = status.as_u16(),
            success = body.success,
            vocabulary = body.vocabulary().len(),
            "translate response decoded"
        );
        Ok(body)
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        let res = self.http.get(self.endpoint(health_route())?).send().await?;
        if !res.status().is_success() {
            return Err(failure_status(res).await);
        }
        decode_body(res).await
    }

    async fn download_document(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let target = resolve_document_url(&self.base_url, url)?;
        let res = self.http.get(target).send().await?;
        if !res.status().is_success() {
            return Err(failure_status(res).await);
        }
        let bytes = res.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
