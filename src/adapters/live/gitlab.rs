//! Live adapter for the `IssueTrackerClient` port using the GitLab v4 issues API.

use std::env;
use std::sync::Arc;

use reqwest::blocking::{Client, Response};
use serde::Serialize;

use crate::error::{BugBuddyError, Result};
use crate::issue::Issue;
use crate::ports::{FetchedIssues, IdGenerator, IssueTrackerClient, Logger};
use crate::tracker::{default_title, ensure_sentinel_label};

/// Public GitLab API root.
pub const GITLAB_API_URL: &str = "https://gitlab.com/api/v4";

/// Project-pinned issues endpoint, relative to the API root.
pub const GITLAB_ISSUES_ENDPOINT: &str = "projects/{project_id}/issues";

/// Environment variable holding a personal, project, or group token.
pub const GITLAB_TOKEN_VAR: &str = "GITLAB_TOKEN";

/// GitLab project-pinned issues client.
pub struct GitlabIssuesClient {
    client: Client,
    url: String,
    endpoint: String,
    token: String,
    id_gen: Arc<dyn IdGenerator>,
    logger: Arc<dyn Logger>,
}

/// Request body for issue creation.
#[derive(Serialize)]
struct CreateIssueBody<'a> {
    title: &'a str,
    description: &'a str,
    labels: &'a [String],
}

impl GitlabIssuesClient {
    /// Creates a client for the API at `url`.
    ///
    /// `endpoint` is a path relative to `url` in which `{project_id}` is
    /// substituted per request.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::Configuration`] if `endpoint` starts with `/`.
    pub fn new(
        url: impl Into<String>,
        endpoint: impl Into<String>,
        token: impl Into<String>,
        id_gen: Arc<dyn IdGenerator>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.starts_with('/') {
            return Err(BugBuddyError::Configuration(
                "Endpoint cannot start with a forward slash.".into(),
            ));
        }
        Ok(Self { client: Client::new(), url: url.into(), endpoint, token: token.into(), id_gen, logger })
    }

    /// Creates a client for the default issues endpoint, reading the token
    /// from `GITLAB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::MissingCredentials`] if the variable is unset.
    pub fn from_env(
        url: impl Into<String>,
        id_gen: Arc<dyn IdGenerator>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self> {
        let token = env::var(GITLAB_TOKEN_VAR)
            .map_err(|_| BugBuddyError::MissingCredentials { var: GITLAB_TOKEN_VAR })?;
        Self::new(url, GITLAB_ISSUES_ENDPOINT, token, id_gen, logger)
    }

    /// Full issues URL for `project_id`.
    #[must_use]
    pub fn issues_url(&self, project_id: u64) -> String {
        let endpoint = self.endpoint.replace("{project_id}", &project_id.to_string());
        format!("{}/{endpoint}", self.url.trim_end_matches('/'))
    }

    fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BugBuddyError::RemoteRequest { status: status.as_u16(), body });
        }
        self.logger.debug(&format!("Response code: {}", status.as_u16()));
        Ok(response)
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text()?;
    serde_json::from_str(&text).map_err(|e| BugBuddyError::Normalization(e.to_string()))
}

impl IssueTrackerClient for GitlabIssuesClient {
    fn create_issue(
        &self,
        project_id: u64,
        description: &str,
        labels: Option<Vec<String>>,
        title: Option<&str>,
    ) -> Result<Issue> {
        let title = default_title(title, self.id_gen.as_ref());
        let labels = ensure_sentinel_label(labels);
        let body = CreateIssueBody { title: &title, description, labels: &labels };

        let response = self
            .client
            .post(self.issues_url(project_id))
            .query(&[("private_token", self.token.as_str())])
            .json(&body)
            .send()?;
        let response = self.check_status(response)?;

        let payload: serde_json::Value = parse_body(response)?;
        Issue::from_raw(&payload)
    }

    fn get_issues(
        &self,
        project_id: u64,
        id: Option<u64>,
        normalize: bool,
    ) -> Result<FetchedIssues> {
        self.logger.debug(&format!("Getting issues for project {project_id}"));

        let mut request = self
            .client
            .get(self.issues_url(project_id))
            .query(&[("private_token", self.token.as_str())]);
        if let Some(id) = id {
            request = request.query(&[("iids", id)]);
        }
        let response = self.check_status(request.send()?)?;

        let payload: Vec<serde_json::Value> = parse_body(response)?;
        if normalize {
            let issues = payload.iter().map(Issue::from_raw).collect::<Result<Vec<_>>>()?;
            Ok(FetchedIssues::Normalized(issues))
        } else {
            Ok(FetchedIssues::Raw(payload))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tracing::Level;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct NullLogger;

    impl Logger for NullLogger {
        fn log(&self, _level: Level, _message: &str) {}
    }

    struct FixedId;

    impl IdGenerator for FixedId {
        fn generate_id(&self) -> String {
            "fixed-id".into()
        }
    }

    fn client(url: &str) -> GitlabIssuesClient {
        GitlabIssuesClient::new(
            url,
            GITLAB_ISSUES_ENDPOINT,
            "secret",
            Arc::new(FixedId),
            Arc::new(NullLogger),
        )
        .unwrap()
    }

    fn payload(id: u64, labels: &[&str]) -> serde_json::Value {
        json!({
            "id": id,
            "iid": 1,
            "title": "BugBuddy-fixed-id",
            "state": "opened",
            "project_id": 123,
            "author": {"name": "Jane Doe", "username": "jdoe", "state": "active"},
            "created_at": "2024-01-02T03:04:05.000Z",
            "updated_at": "2024-01-02T03:04:05.000Z",
            "description": "### Traceback",
            "labels": labels,
        })
    }

    #[test]
    fn endpoint_with_leading_slash_is_rejected() {
        let result = GitlabIssuesClient::new(
            GITLAB_API_URL,
            "/projects/{project_id}/issues",
            "secret",
            Arc::new(FixedId),
            Arc::new(NullLogger),
        );
        assert!(matches!(result, Err(BugBuddyError::Configuration(_))));
    }

    #[test]
    fn issues_url_substitutes_project() {
        let gitlab = client("https://gitlab.example.com/api/v4/");
        assert_eq!(gitlab.issues_url(42), "https://gitlab.example.com/api/v4/projects/42/issues");
    }

    #[tokio::test]
    async fn create_issue_posts_report_with_sentinel_label() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/123/issues"))
            .and(query_param("private_token", "secret"))
            .and(body_partial_json(json!({
                "title": "BugBuddy-fixed-id",
                "description": "desc",
                "labels": ["ValueError", "BugBuddy"],
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(payload(7, &["ValueError", "BugBuddy"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/api/v4", server.uri());
        let issue = tokio::task::spawn_blocking(move || {
            client(&url).create_issue(123, "desc", Some(vec!["ValueError".into()]), None)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(issue.id(), 7);
        assert_eq!(issue.labels(), ["ValueError", "BugBuddy"]);
    }

    #[tokio::test]
    async fn create_issue_surfaces_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("401 Unauthorized"))
            .mount(&server)
            .await;

        let url = server.uri();
        let result =
            tokio::task::spawn_blocking(move || client(&url).create_issue(1, "d", None, None))
                .await
                .unwrap();

        match result {
            Err(BugBuddyError::RemoteRequest { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "401 Unauthorized");
            }
            other => panic!("expected remote request error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_issues_filters_by_iid_and_normalizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/123/issues"))
            .and(query_param("private_token", "secret"))
            .and(query_param("iids", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([payload(4, &[])])))
            .mount(&server)
            .await;

        let url = server.uri();
        let fetched =
            tokio::task::spawn_blocking(move || client(&url).get_issues(123, Some(4), true))
                .await
                .unwrap()
                .unwrap();

        match fetched {
            FetchedIssues::Normalized(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].id(), 4);
                assert!(issues[0].labels().is_empty());
            }
            FetchedIssues::Raw(_) => panic!("expected normalized issues"),
        }
    }

    #[tokio::test]
    async fn get_issues_passes_raw_payloads_through() {
        let server = MockServer::start().await;
        let raw = json!([{"id": 1, "web_url": "https://gitlab.example.com/1"}]);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(raw.clone()))
            .mount(&server)
            .await;

        let url = server.uri();
        let fetched = tokio::task::spawn_blocking(move || client(&url).get_issues(9, None, false))
            .await
            .unwrap()
            .unwrap();

        match fetched {
            FetchedIssues::Raw(items) => assert_eq!(serde_json::Value::from(items), raw),
            FetchedIssues::Normalized(_) => panic!("expected raw payloads"),
        }
    }

    #[tokio::test]
    async fn get_issues_rejects_malformed_issue() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let url = server.uri();
        let result = tokio::task::spawn_blocking(move || client(&url).get_issues(9, None, true))
            .await
            .unwrap();

        assert!(matches!(result, Err(BugBuddyError::Normalization(_))));
    }
}
