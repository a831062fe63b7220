pub mod types;

pub use types::{Comment, Project, PullRequest, Repository};

use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Config;

/// Seconds before an in-flight request is abandoned.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Comments are fetched as a single page of at most this many items.
/// Backlog caps `count` at 100; pull requests with more comments yield a
/// truncated result. Known limitation, no paging is attempted.
const COMMENT_PAGE_SIZE: &str = "100";

#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("Backlog API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backlog API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode {entity} response: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only client for the Backlog v2 API.
///
/// Every operation is a single blocking request/response cycle; calls are
/// made strictly in sequence by the pipeline and never retried.
pub struct BacklogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BacklogClient {
    pub fn new(config: &Config) -> Result<Self, BacklogError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
        })
    }

    #[cfg(test)]
    fn with_base_url(base_url: String, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.to_string(),
        }
    }

    /// List all projects visible to the credential.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>, BacklogError> {
        self.get_list("/projects", &[], "projects").await
    }

    /// List the Git repositories of a project.
    #[instrument(skip(self))]
    pub async fn list_repositories(
        &self,
        project_id: u64,
    ) -> Result<Vec<Repository>, BacklogError> {
        let path = format!("/projects/{project_id}/git/repositories");
        self.get_list(&path, &[], "repositories").await
    }

    /// List the pull requests of a repository that are open, under review,
    /// or merged. Closed-without-merge pull requests are excluded; the
    /// status filter is fixed, not caller-configurable.
    #[instrument(skip(self))]
    pub async fn list_pull_requests(
        &self,
        project_id: u64,
        repo_id: u64,
    ) -> Result<Vec<PullRequest>, BacklogError> {
        let path = format!("/projects/{project_id}/git/repositories/{repo_id}/pullRequests");
        let statuses = [
            ("statusId[]", "1"),
            ("statusId[]", "2"),
            ("statusId[]", "3"),
        ];
        self.get_list(&path, &statuses, "pull requests").await
    }

    /// Fetch the comments of a pull request, newest page only (see
    /// [`COMMENT_PAGE_SIZE`]). The pull request is addressed by its
    /// human-facing `number`, not its internal id.
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        project_id: u64,
        repo_id: u64,
        pr_number: u64,
    ) -> Result<Vec<Comment>, BacklogError> {
        let path = format!(
            "/projects/{project_id}/git/repositories/{repo_id}/pullRequests/{pr_number}/comments"
        );
        self.get_list(&path, &[("count", COMMENT_PAGE_SIZE)], "comments")
            .await
    }

    /// Shared GET cycle: credential as query parameter, non-success status
    /// surfaced with the raw body, body decoded as a JSON array of `T`.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        extra_params: &[(&str, &str)],
        entity: &'static str,
    ) -> Result<Vec<T>, BacklogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, entity, "sending request");

        let response = self
            .http
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(extra_params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BacklogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!(entity, bytes = body.len(), "decoding response");
        serde_json::from_str(&body).map_err(|source| BacklogError::Decode { entity, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> BacklogClient {
        BacklogClient::with_base_url(format!("{}/api/v2", server.uri()), "test-key")
    }

    #[tokio::test]
    async fn test_list_projects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/projects"))
            .and(query_param("apiKey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 1, "name": "Alpha" },
                { "id": 2, "name": "Beta" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let projects = test_client(&server).list_projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "Alpha");
        assert_eq!(projects[1].id, 2);
    }

    #[tokio::test]
    async fn test_list_pull_requests_sends_status_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/projects/1/git/repositories/2/pullRequests"))
            .and(query_param("statusId[]", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 10, "number": 3, "summary": "Fix login" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let prs = test_client(&server).list_pull_requests(1, 2).await.unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 3);
        assert_eq!(prs[0].summary, "Fix login");
    }

    #[tokio::test]
    async fn test_list_comments_requests_single_page_of_100() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/api/v2/projects/1/git/repositories/2/pullRequests/3/comments",
            ))
            .and(query_param("count", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 100,
                    "filePath": "src/a.go",
                    "position": 10,
                    "content": "typo",
                    "createdUser": { "id": 7, "name": "Alice" },
                    "created": "2023-01-05T09:00:00Z",
                    "updated": "2023-01-05T09:00:00Z"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let comments = test_client(&server).list_comments(1, 2, 3).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].location_label(), "src/a.go: line 10");
    }

    #[tokio::test]
    async fn test_non_success_status_carries_body_and_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/projects"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = test_client(&server).list_projects().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rate limited"));
        assert!(message.contains("429"));
        assert!(matches!(err, BacklogError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server).list_projects().await.unwrap_err();
        assert!(matches!(
            err,
            BacklogError::Decode {
                entity: "projects",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_a_decode_error() {
        // Valid JSON but an object where an array is expected.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/projects/1/git/repositories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": 1, "name": "Alpha" })),
            )
            .mount(&server)
            .await;

        let err = test_client(&server).list_repositories(1).await.unwrap_err();
        assert!(matches!(err, BacklogError::Decode { .. }));
    }
}
