//! REST API client for the executor's HTTP endpoints.
//!
//! Wraps job submission, cancellation, default-input generation and the
//! compilation status probe using [`reqwest`].

use async_trait::async_trait;
use livecheck_core::{
    AnalysisKind, CompilationStatus, Executor, ExecutorError, Input, JobId, Submission,
};
use serde::Serialize;

/// HTTP client for a single executor instance.
#[derive(Debug, Clone)]
pub struct ExecutorApi {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    analysis: AnalysisKind,
    input: &'a Input,
}

#[derive(Serialize)]
struct GenerateRequest {
    analysis: AnalysisKind,
}

/// Errors from the executor REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The executor returned a non-2xx status code.
    #[error("Executor API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl From<ExecutorApiError> for ExecutorError {
    fn from(err: ExecutorApiError) -> Self {
        match err {
            ExecutorApiError::Request(e) if e.is_decode() => ExecutorError::Decode(e.to_string()),
            ExecutorApiError::Request(e) => ExecutorError::Request(e.to_string()),
            ExecutorApiError::ApiError { status, body } => ExecutorError::Api { status, body },
        }
    }
}

impl ExecutorApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:3000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit a job.
    ///
    /// Sends `POST /jobs` and returns the executor-assigned id together
    /// with the job's metadata.
    pub async fn submit_job(
        &self,
        analysis: AnalysisKind,
        input: &Input,
    ) -> Result<Submission, ExecutorApiError> {
        let response = self
            .client
            .post(format!("{}/jobs", self.api_url))
            .json(&SubmitRequest { analysis, input })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Cancel a queued or running job with `POST /jobs/{id}/cancel`.
    pub async fn cancel(&self, id: JobId) -> Result<(), ExecutorApiError> {
        let response = self
            .client
            .post(format!("{}/jobs/{}/cancel", self.api_url, id))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Request a fresh default input with `POST /generate`.
    pub async fn generate_input(&self, analysis: AnalysisKind) -> Result<Input, ExecutorApiError> {
        let response = self
            .client
            .post(format!("{}/generate", self.api_url))
            .json(&GenerateRequest { analysis })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current compilation status with `GET /compilation-status`.
    pub async fn get_compilation_status(&self) -> Result<CompilationStatus, ExecutorApiError> {
        let response = self
            .client
            .get(format!("{}/compilation-status", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning anything
    /// else into [`ExecutorApiError::ApiError`] with the body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ExecutorApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ExecutorApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ExecutorApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ExecutorApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Executor for ExecutorApi {
    async fn submit(&self, kind: AnalysisKind, input: &Input) -> Result<Submission, ExecutorError> {
        Ok(self.submit_job(kind, input).await?)
    }

    async fn cancel_job(&self, id: JobId) -> Result<(), ExecutorError> {
        Ok(self.cancel(id).await?)
    }

    async fn generate(&self, kind: AnalysisKind) -> Result<Input, ExecutorError> {
        Ok(self.generate_input(kind).await?)
    }

    async fn compilation_status(&self) -> Result<CompilationStatus, ExecutorError> {
        Ok(self.get_compilation_status().await?)
    }
}
