use review_model::View;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{ReviewMcp, helpers};

/// Parameters for listing projects.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListProjectsParams {
    /// Optional name or path fragment to search for.
    pub search: Option<String>,
    /// Only projects the token's user is a member of (default true).
    pub membership: Option<bool>,
    /// Return GitLab's raw records instead of the summary view.
    pub verbose: Option<bool>,
}

/// Parameters for fetching a project.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetProjectParams {
    /// Numeric project id or `group/project` path; defaults to the configured project.
    pub project_id: Option<String>,
    /// Return GitLab's raw record instead of the summary view.
    pub verbose: Option<bool>,
}

#[tool_router(router = tool_router_projects, vis = "pub")]
impl ReviewMcp {
    #[tool(description = "List projects visible to the token, optionally filtered by a search term.")]
    async fn list_projects(
        &self,
        Parameters(params): Parameters<ListProjectsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let view = View::from_verbose(params.verbose.unwrap_or(false));
        let result = self
            .control()
            .list_projects(
                params.search.as_deref(),
                params.membership.unwrap_or(true),
                view,
            )
            .await;
        helpers::respond("list_projects", result)
    }

    #[tool(description = "Fetch a project by numeric id or namespaced path.")]
    async fn get_project(
        &self,
        Parameters(params): Parameters<GetProjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let view = View::from_verbose(params.verbose.unwrap_or(false));
        let result = self
            .control()
            .get_project(params.project_id.as_deref(), view)
            .await;
        helpers::respond("get_project", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{server_for, text_of};
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_projects_forwards_search_and_summarizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("search", "review"))
            .and(query_param("membership", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 12,
                    "name": "review-app",
                    "path_with_namespace": "group/review-app",
                    "default_branch": "main",
                    "web_url": "https://gitlab.example.com/group/review-app",
                    "star_count": 4
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mcp = server_for(&server.uri(), None);
        let result = mcp
            .list_projects(Parameters(ListProjectsParams {
                search: Some("review".to_string()),
                membership: None,
                verbose: None,
            }))
            .await
            .expect("tool should respond");

        let projects: Value = serde_json::from_str(&text_of(&result)).expect("json text");
        assert_eq!(projects[0]["path_with_namespace"], "group/review-app");
        assert!(projects[0].get("star_count").is_none());
    }

    #[tokio::test]
    async fn get_project_without_any_project_is_invalid_params() {
        let server = MockServer::start().await;
        let mcp = server_for(&server.uri(), None);

        let err = mcp
            .get_project(Parameters(GetProjectParams {
                project_id: None,
                verbose: None,
            }))
            .await
            .expect_err("missing project should be rejected");

        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }
}
