//! HTTP implementation of [`AdminClient`] for the Admin GraphQL endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use crate::client::{AdminClient, operation_name};
use crate::error::AdminError;
use crate::response::GraphqlResponse;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for one tenant's Admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminApiConfig {
    /// The tenant's platform domain, e.g. `example.myshopify.com`.
    #[serde(default)]
    pub shop_domain: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Full GraphQL endpoint URL; overrides the one derived from the domain.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_version() -> String {
    "2025-10".into()
}

fn default_timeout_ms() -> u64 {
    15_000
}

impl Default for AdminApiConfig {
    fn default() -> Self {
        Self {
            shop_domain: String::new(),
            access_token: String::new(),
            api_version: default_api_version(),
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AdminApiConfig {
    pub fn new(shop_domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop_domain: shop_domain.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolves the GraphQL endpoint URL.
    pub fn endpoint_url(&self) -> Result<Url, AdminError> {
        let raw = match &self.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => endpoint.trim().to_string(),
            _ => {
                let domain = self
                    .shop_domain
                    .trim()
                    .trim_start_matches("https://")
                    .trim_end_matches('/');
                if domain.is_empty() {
                    return Err(AdminError::invalid_config("shop_domain must not be empty"));
                }
                format!(
                    "https://{}/admin/api/{}/graphql.json",
                    domain, self.api_version
                )
            }
        };
        Url::parse(&raw).map_err(|e| AdminError::invalid_config(format!("{raw}: {e}")))
    }
}

/// Admin API client over HTTPS.
pub struct HttpAdminClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: String,
}

impl HttpAdminClient {
    pub fn new(config: AdminApiConfig) -> Result<Self, AdminError> {
        if config.access_token.trim().is_empty() {
            return Err(AdminError::invalid_config("access_token must not be empty"));
        }
        let endpoint = config.endpoint_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdminError::invalid_config(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    async fn execute(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<GraphqlResponse, AdminError> {
        let operation = operation_name(document).unwrap_or("anonymous");
        tracing::debug!(operation, endpoint = %self.endpoint, "Executing Admin GraphQL document");

        let body = json!({ "query": document, "variables": variables });
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(operation, "Admin API request failed: {}", e);
                AdminError::network(e.to_string())
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil() as u64)
                .unwrap_or(1);
            tracing::warn!(operation, retry_after, "Admin API rate limited");
            return Err(AdminError::RateLimited(retry_after));
        }

        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let mut body = text;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(AdminError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphqlResponse = serde_json::from_str(&text)
            .map_err(|e| AdminError::parse(format!("{operation}: {e}")))?;

        if envelope.has_errors() {
            tracing::debug!(
                operation,
                errors = envelope.errors.len(),
                "Admin API returned GraphQL errors"
            );
        }

        Ok(envelope)
    }
}
