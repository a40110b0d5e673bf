use review_model::{IssueState, View};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ErrorCode},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{ReviewMcp, helpers};

/// Parameters for listing issues.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListIssuesParams {
    /// Numeric project id or `group/project` path; defaults to the configured project.
    pub project_id: Option<String>,
    /// One of `opened` (default), `closed`, or `all`.
    pub state: Option<String>,
    /// Return GitLab's raw records instead of the summary view.
    pub verbose: Option<bool>,
}

/// Parameters for fetching an issue.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetIssueParams {
    pub project_id: Option<String>,
    /// The internal ID of the issue within the project.
    pub issue_iid: String,
    pub verbose: Option<bool>,
}

/// Parameters for commenting on an issue.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddIssueCommentParams {
    pub project_id: Option<String>,
    /// The internal ID of the issue within the project.
    pub issue_iid: String,
    /// The comment text.
    pub comment: String,
}

fn parse_state(state: Option<&str>) -> Result<IssueState, ErrorData> {
    state.map_or(Ok(IssueState::default()), |value| {
        IssueState::parse(value).ok_or_else(|| {
            helpers::mcp_err(
                ErrorCode::INVALID_PARAMS,
                format!("unknown issue state '{value}' (expected opened, closed, or all)"),
            )
        })
    })
}

#[tool_router(router = tool_router_issues, vis = "pub")]
impl ReviewMcp {
    #[tool(description = "List project issues. state is opened (default), closed, or all.")]
    async fn list_issues(
        &self,
        Parameters(params): Parameters<ListIssuesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let state = parse_state(params.state.as_deref())?;
        let view = View::from_verbose(params.verbose.unwrap_or(false));
        let result = self
            .control()
            .list_issues(params.project_id.as_deref(), state, view)
            .await;
        helpers::respond("list_issues", result)
    }

    #[tool(description = "Fetch an issue by its project-scoped iid.")]
    async fn get_issue_details(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let view = View::from_verbose(params.verbose.unwrap_or(false));
        let result = self
            .control()
            .get_issue(params.project_id.as_deref(), &params.issue_iid, view)
            .await;
        helpers::respond("get_issue_details", result)
    }

    #[tool(description = "Add a comment to an issue.")]
    async fn add_issue_comment(
        &self,
        Parameters(params): Parameters<AddIssueCommentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .add_issue_comment(
                params.project_id.as_deref(),
                &params.issue_iid,
                &params.comment,
            )
            .await;
        helpers::respond("add_issue_comment", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{server_for, text_of};
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn state_defaults_to_opened() {
        assert_eq!(parse_state(None).expect("default state"), IssueState::Opened);
        assert_eq!(parse_state(Some("Closed")).expect("closed"), IssueState::Closed);
    }

    #[test]
    fn unknown_state_is_invalid_params() {
        let err = parse_state(Some("merged")).expect_err("merged is not an issue state");
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("merged"));
    }

    #[tokio::test]
    async fn list_issues_passes_state_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/12/issues"))
            .and(query_param("state", "closed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 500, "iid": 3, "title": "Crash on start", "state": "closed", "weight": 2 }
            ])))
            .expect(1)
            .mount(&server)
            .await;
        let mcp = server_for(&server.uri(), Some("12"));

        let result = mcp
            .list_issues(Parameters(ListIssuesParams {
                project_id: None,
                state: Some("closed".to_string()),
                verbose: None,
            }))
            .await
            .expect("tool should respond");

        let issues: Value = serde_json::from_str(&text_of(&result)).expect("json text");
        assert_eq!(issues[0]["iid"], 3);
        assert!(issues[0].get("weight").is_none());
    }

    #[tokio::test]
    async fn get_issue_rejects_non_numeric_iid() {
        let server = MockServer::start().await;
        let mcp = server_for(&server.uri(), Some("12"));

        let result = mcp
            .get_issue_details(Parameters(GetIssueParams {
                project_id: None,
                issue_iid: "abc".to_string(),
                verbose: None,
            }))
            .await
            .expect("tool should respond");

        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("Error: Invalid input: issue_iid"));
    }
}
