//! GitHub issue-tracker client

use super::error::SubmitError;
use super::traits::{FindingEmitter, IssueRequest, TicketRef};
use crate::app::config::ConfigError;
use crate::core::retry::{retry_async, RetryPolicy};
use crate::core::version::user_agent;
use crate::registry::Source;
use crate::scanner::Finding;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Files each finding as a GitHub issue in the source's repository
pub struct GitHubEmitter {
    client: reqwest::Client,
    api_base: String,
    token: String,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct UserBody {
    login: String,
}

impl GitHubEmitter {
    pub fn new(api_base: &str, token: &str) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .user_agent(user_agent())
            .build()
            .map_err(|e| ConfigError::Authentication {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn issues_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/issues", self.api_base, owner, repo)
    }

    /// Check the token against `GET /user`, returning the login
    pub async fn authenticate(&self) -> Result<String, ConfigError> {
        let response = self
            .client
            .get(format!("{}/user", self.api_base))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ConfigError::Authentication {
                message: format!("cannot reach {}: {}", self.api_base, e),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = error_message(response).await;
            return Err(ConfigError::Authentication {
                message: format!("GitHub rejected the token (HTTP {}): {}", status, message),
            });
        }

        let user: UserBody = response
            .json()
            .await
            .map_err(|e| ConfigError::Authentication {
                message: format!("unexpected /user response: {}", e),
            })?;
        Ok(user.login)
    }

    async fn create_issue(&self, url: &str, request: &IssueRequest) -> Result<TicketRef, SubmitError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(request)
            .send()
            .await
            .map_err(|source| SubmitError::Http { source })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(SubmitError::Status {
                status,
                message: error_message(response).await,
            });
        }

        response
            .json::<TicketRef>()
            .await
            .map_err(|source| SubmitError::Http { source })
    }
}

#[async_trait]
impl FindingEmitter for GitHubEmitter {
    async fn submit(&self, source: &Source, finding: &Finding) -> Result<TicketRef, SubmitError> {
        let request = IssueRequest::from_finding(finding);
        let url = self.issues_url(source.repo_owner(), source.repo_name());
        let operation = format!("create issue in {}", source.repo_slug());

        retry_async(&operation, self.retry.clone(), || {
            self.create_issue(&url, &request)
        })
        .await
    }
}

// GitHub error bodies are `{"message": ...}`; fall back to the status reason.
async fn error_message(response: reqwest::Response) -> String {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string();
    match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(reason),
        Err(_) => reason,
    }
}
