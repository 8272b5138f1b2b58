//! HTTP client for the gateway admin API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};
use syllabusdb_core::{CollegeId, SyllabusId, SyllabusRef};

use crate::types::{ActionRequest, ApiErrorResponse, Outcome, PendingResponse, ScanResult};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway redirected: the token is missing, invalid, or not an admin's.
    #[error("not signed in as an admin")]
    NotAdmin,

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Message from the error body.
        message: String,
    },

    /// The token cannot be sent as a header.
    #[error("token contains characters not allowed in a header")]
    InvalidToken,

    /// The gateway URL is not a valid base URL.
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Client for the gateway admin API.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// Redirects are not followed: the gateway answers non-admins with one.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `base_url` cannot be parsed.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().redirect(Policy::none()).build()?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Build headers for authenticated requests.
    fn auth_headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .map_err(|_| ClientError::InvalidToken)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Append percent-encoded segments to the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn syllabus_url(&self, syllabus: &SyllabusRef, action: &str) -> Url {
        self.url(&[
            "v1",
            "admin",
            "colleges",
            syllabus.college_id.as_str(),
            "courses",
            syllabus.course_id.as_str(),
            "syllabi",
            syllabus.syllabus_id.as_str(),
            action,
        ])
    }

    /// Turn a response into `T`, mapping redirects and error bodies.
    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        tracing::debug!(url = %response.url(), status = %status, "Gateway response");
        if status == StatusCode::SEE_OTHER {
            return Err(ClientError::NotAdmin);
        }
        if !status.is_success() {
            let message = match response.json::<ApiErrorResponse>().await {
                Ok(err) => err.error.message,
                Err(_) => "Unknown error".to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn post_action(&self, url: Url, body: &ActionRequest) -> Result<Outcome, ClientError> {
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;
        Self::read(response).await
    }

    // =========================================================================
    // Queue
    // =========================================================================

    /// Fetch the pending queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    pub async fn pending(&self) -> Result<PendingResponse, ClientError> {
        let response = self
            .client
            .get(self.url(&["v1", "admin", "pending"]))
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::read(response).await
    }

    // =========================================================================
    // Syllabus Operations
    // =========================================================================

    /// Approve a syllabus.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the action fails.
    pub async fn approve_syllabus(
        &self,
        syllabus: &SyllabusRef,
        owner: Option<String>,
        confirm: bool,
    ) -> Result<Outcome, ClientError> {
        let body = ActionRequest {
            owner,
            reason: None,
            confirm,
        };
        self.post_action(self.syllabus_url(syllabus, "approve"), &body)
            .await
    }

    /// Reject a syllabus.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the action fails.
    pub async fn disapprove_syllabus(
        &self,
        syllabus: &SyllabusRef,
        reason: Option<String>,
        confirm: bool,
    ) -> Result<Outcome, ClientError> {
        let body = ActionRequest {
            owner: None,
            reason,
            confirm,
        };
        self.post_action(self.syllabus_url(syllabus, "disapprove"), &body)
            .await
    }

    /// Queue a PDF scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn request_scan(&self, syllabus: &SyllabusRef) -> Result<ScanResult, ClientError> {
        let response = self
            .client
            .post(self.syllabus_url(syllabus, "scan"))
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::read(response).await
    }

    /// Latest scan result of a syllabus.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no scan was requested.
    pub async fn scan_result(&self, syllabus_id: &SyllabusId) -> Result<ScanResult, ClientError> {
        let response = self
            .client
            .get(self.url(&["v1", "admin", "syllabi", syllabus_id.as_str(), "scan"]))
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::read(response).await
    }

    // =========================================================================
    // College Operations
    // =========================================================================

    /// Approve a college request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the action fails.
    pub async fn approve_college(
        &self,
        college_id: &CollegeId,
        confirm: bool,
    ) -> Result<Outcome, ClientError> {
        let url = self.url(&["v1", "admin", "colleges", college_id.as_str(), "approve"]);
        self.post_action(
            url,
            &ActionRequest {
                confirm,
                ..ActionRequest::default()
            },
        )
        .await
    }

    /// Reject a college request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the action fails.
    pub async fn disapprove_college(
        &self,
        college_id: &CollegeId,
        reason: Option<String>,
        confirm: bool,
    ) -> Result<Outcome, ClientError> {
        let url = self.url(&["v1", "admin", "colleges", college_id.as_str(), "disapprove"]);
        self.post_action(
            url,
            &ActionRequest {
                owner: None,
                reason,
                confirm,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn math_241() -> SyllabusRef {
        "colleges/baruch/courses/MATH 241/syllabi/s2".parse().unwrap()
    }

    #[tokio::test]
    async fn encodes_path_segments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1/admin/colleges/baruch/courses/MATH%20241/syllabi/s2/disapprove",
            ))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({ "reason": "wrong document", "confirm": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "outcome": "applied" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri(), "tok").unwrap();
        let outcome = client
            .disapprove_syllabus(&math_241(), Some("wrong document".to_string()), true)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    #[tokio::test]
    async fn redirect_means_not_admin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/admin/pending"))
            .respond_with(ResponseTemplate::new(303).insert_header("location", "/"))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri(), "tok").unwrap();
        assert!(matches!(client.pending().await, Err(ClientError::NotAdmin)));
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/admin/colleges/nowhere/approve"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": "not_found", "message": "not found: colleges/nowhere" }
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&server.uri(), "tok").unwrap();
        let err = client
            .approve_college(&CollegeId::new("nowhere").unwrap(), true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status: 404, ref message } if message.contains("colleges/nowhere")
        ));
    }

    #[test]
    fn rejects_bad_gateway_url() {
        assert!(matches!(
            GatewayClient::new("not a url", "tok"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
