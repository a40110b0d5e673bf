use std::{error::Error, fmt, time::Duration};

use reqwest::{Client, RequestBuilder, header};
use review_model::schema::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use review_model::{
    IssueListQuery,
    MergeRequestListQuery,
    NewDiscussion,
    NewNote,
    PageQuery,
    ProjectListQuery,
};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

const API_PREFIX: &str = "api/v4";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum GitlabError {
    Http(Box<reqwest::Error>),
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },
    Decode(serde_json::Error),
    InvalidUrl(String),
    Config(String),
}

impl GitlabError {
    /// Builds an API error from a non-success status and its response body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|value| value.get("message").or_else(|| value.get("error")))
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            });
        let details = parsed
            .as_ref()
            .and_then(|value| value.get("error_description"))
            .and_then(Value::as_str)
            .map(str::to_string);

        match message {
            Some(message) => Self::Api {
                status,
                message,
                details,
            },
            None => {
                let body = body.trim();
                Self::Api {
                    status,
                    message: if body.is_empty() {
                        format!("request failed with status {status}")
                    } else {
                        body.to_string()
                    },
                    details: None,
                }
            }
        }
    }

    /// Extra context GitLab attached to the failure, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Api { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for GitlabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "GitLab request failed: {err}"),
            Self::Api {
                status, message, ..
            } => write!(f, "GitLab API error (status {status}): {message}"),
            Self::Decode(err) => write!(f, "invalid GitLab response: {err}"),
            Self::InvalidUrl(message) => write!(f, "invalid GitLab URL: {message}"),
            Self::Config(message) => write!(f, "invalid GitLab client configuration: {message}"),
        }
    }
}

impl Error for GitlabError {}

impl From<reqwest::Error> for GitlabError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Box::new(err))
    }
}

impl From<serde_json::Error> for GitlabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

pub type GitlabResult<T> = Result<T, GitlabError>;

/// Connection settings for a GitLab instance.
#[derive(Clone)]
pub struct GitlabConfig {
    pub base_url: Url,
    pub token: String,
    pub timeout: Duration,
    pub per_page: u32,
}

impl fmt::Debug for GitlabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitlabConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("per_page", &self.per_page)
            .finish()
    }
}

impl GitlabConfig {
    /// Creates a configuration for the instance at `base_url`.
    ///
    /// # Errors
    /// Returns `GitlabError::InvalidUrl` if `base_url` cannot be parsed or
    /// cannot carry a path.
    pub fn new(base_url: &str, token: impl Into<String>) -> GitlabResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|err| GitlabError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GitlabError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            per_page: DEFAULT_PER_PAGE,
        })
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }
}

/// Thin async client over the GitLab v4 REST API.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    http: Client,
    api_root: Url,
    per_page: u32,
}

impl GitlabClient {
    /// Builds a client with a bearer token default header.
    ///
    /// # Errors
    /// Returns `GitlabError::Config` for an unusable token and
    /// `GitlabError::Http` if the HTTP client cannot be built.
    pub fn new(config: GitlabConfig) -> GitlabResult<Self> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| GitlabError::Config("token contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(concat!("gitlab-review-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_root: api_root(&config.base_url)?,
            per_page: config.per_page,
        })
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Lists projects visible to the token.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn list_projects(&self, query: &ProjectListQuery) -> GitlabResult<Vec<Value>> {
        let url = self.endpoint(&["projects"])?;
        self.fetch_list(self.http.get(url.clone()).query(query), &url).await
    }

    /// Fetches a project by numeric id or namespaced path.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn get_project(&self, project: &str) -> GitlabResult<Value> {
        let url = self.endpoint(&["projects", project])?;
        self.fetch(self.http.get(url.clone()), &url).await
    }

    /// Lists merge requests for a project.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn list_merge_requests(
        &self,
        project: &str,
        query: &MergeRequestListQuery,
    ) -> GitlabResult<Vec<Value>> {
        let url = self.endpoint(&["projects", project, "merge_requests"])?;
        self.fetch_list(self.http.get(url.clone()).query(query), &url).await
    }

    /// Fetches a merge request by its project-scoped iid.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn get_merge_request(&self, project: &str, iid: &str) -> GitlabResult<Value> {
        let url = self.endpoint(&["projects", project, "merge_requests", iid])?;
        self.fetch(self.http.get(url.clone()), &url).await
    }

    /// Lists the file diffs of a merge request.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn list_merge_request_diffs(&self, project: &str, iid: &str) -> GitlabResult<Vec<Value>> {
        let url = self.endpoint(&["projects", project, "merge_requests", iid, "diffs"])?;
        let query = PageQuery {
            per_page: self.per_page,
        };
        self.fetch_list(self.http.get(url.clone()).query(&query), &url).await
    }

    /// Lists the discussion threads of a merge request.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn list_merge_request_discussions(
        &self,
        project: &str,
        iid: &str,
    ) -> GitlabResult<Vec<Value>> {
        let url = self.endpoint(&["projects", project, "merge_requests", iid, "discussions"])?;
        let query = PageQuery {
            per_page: self.per_page,
        };
        self.fetch_list(self.http.get(url.clone()).query(&query), &url).await
    }

    /// Starts a new discussion thread on a merge request.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn create_merge_request_discussion(
        &self,
        project: &str,
        iid: &str,
        discussion: &NewDiscussion,
    ) -> GitlabResult<Value> {
        let url = self.endpoint(&["projects", project, "merge_requests", iid, "discussions"])?;
        self.fetch(self.http.post(url.clone()).json(discussion), &url).await
    }

    /// Lists issues for a project.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn list_issues(&self, project: &str, query: &IssueListQuery) -> GitlabResult<Vec<Value>> {
        let url = self.endpoint(&["projects", project, "issues"])?;
        self.fetch_list(self.http.get(url.clone()).query(query), &url).await
    }

    /// Fetches an issue by its project-scoped iid.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn get_issue(&self, project: &str, iid: &str) -> GitlabResult<Value> {
        let url = self.endpoint(&["projects", project, "issues", iid])?;
        self.fetch(self.http.get(url.clone()), &url).await
    }

    /// Adds a note to an issue.
    ///
    /// # Errors
    /// Returns `GitlabError` if the request fails or GitLab rejects it.
    pub async fn create_issue_note(&self, project: &str, iid: &str, note: &NewNote) -> GitlabResult<Value> {
        let url = self.endpoint(&["projects", project, "issues", iid, "notes"])?;
        self.fetch(self.http.post(url.clone()).json(note), &url).await
    }

    /// Appends path segments to the API root, percent-encoding each one so
    /// namespaced project paths stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> GitlabResult<Url> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|()| GitlabError::InvalidUrl(self.api_root.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch(&self, request: RequestBuilder, url: &Url) -> GitlabResult<Value> {
        debug!(url = %url, "GitLab request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = GitlabError::from_response(status.as_u16(), &body);
            warn!(url = %url, status = status.as_u16(), "GitLab request failed: {err}");
            return Err(err);
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_list(&self, request: RequestBuilder, url: &Url) -> GitlabResult<Vec<Value>> {
        let value = self.fetch(request, url).await?;
        Ok(serde_json::from_value(value)?)
    }
}

fn api_root(base_url: &Url) -> GitlabResult<Url> {
    let mut base = base_url.clone();
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(API_PREFIX)
        .map_err(|err| GitlabError::InvalidUrl(format!("{base}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_root_appends_prefix_to_base_path() {
        let plain = Url::parse("https://gitlab.example.com").expect("valid url");
        assert_eq!(
            api_root(&plain).expect("root").as_str(),
            "https://gitlab.example.com/api/v4"
        );

        let nested = Url::parse("https://example.com/gitlab?x=1").expect("valid url");
        assert_eq!(
            api_root(&nested).expect("root").as_str(),
            "https://example.com/gitlab/api/v4"
        );
    }

    #[test]
    fn endpoint_encodes_namespaced_projects() {
        let config = GitlabConfig::new("https://gitlab.example.com/", "token").expect("config");
        let client = GitlabClient::new(config).expect("client");

        let url = client
            .endpoint(&["projects", "group/sub/app", "merge_requests", "4"])
            .expect("endpoint");

        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fsub%2Fapp/merge_requests/4"
        );
    }

    #[test]
    fn api_errors_prefer_gitlab_message_fields() {
        let err = GitlabError::from_response(404, r#"{"message":"404 Project Not Found"}"#);
        assert_eq!(err.to_string(), "GitLab API error (status 404): 404 Project Not Found");
        assert_eq!(err.details(), None);

        let err = GitlabError::from_response(
            401,
            r#"{"error":"invalid_token","error_description":"Token was revoked."}"#,
        );
        assert_eq!(err.to_string(), "GitLab API error (status 401): invalid_token");
        assert_eq!(err.details(), Some("Token was revoked."));
    }

    #[test]
    fn api_errors_fall_back_to_body_or_status() {
        let err = GitlabError::from_response(400, r#"{"message":{"note":["can't be blank"]}}"#);
        assert_eq!(
            err.to_string(),
            r#"GitLab API error (status 400): {"note":["can't be blank"]}"#
        );

        let err = GitlabError::from_response(502, "Bad Gateway");
        assert_eq!(err.to_string(), "GitLab API error (status 502): Bad Gateway");

        let err = GitlabError::from_response(500, "  ");
        assert_eq!(
            err.to_string(),
            "GitLab API error (status 500): request failed with status 500"
        );
    }

    #[test]
    fn config_rejects_unparsable_urls_and_clamps_page_size() {
        assert!(matches!(
            GitlabConfig::new("not a url", "token"),
            Err(GitlabError::InvalidUrl(_))
        ));
        assert!(matches!(
            GitlabConfig::new("mailto:someone@example.com", "token"),
            Err(GitlabError::InvalidUrl(_))
        ));

        let config = GitlabConfig::new("https://gitlab.com", "glpat-secret")
            .expect("config")
            .with_per_page(500);
        assert_eq!(config.per_page, MAX_PER_PAGE);
        assert!(!format!("{config:?}").contains("glpat-secret"));
    }
}
