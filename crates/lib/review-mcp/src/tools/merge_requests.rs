use review_core::control::DiffCommentRequest;
use review_model::schema::NO_DIFF_MESSAGE;
use review_model::{ClassifyOptions, PositionPolicy, View};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{ReviewMcp, helpers};

/// Parameters for listing open merge requests.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListMergeRequestsParams {
    /// Numeric project id or `group/project` path; defaults to the configured project.
    pub project_id: Option<String>,
    /// Return GitLab's raw records instead of the summary view.
    pub verbose: Option<bool>,
}

/// Parameters for fetching a merge request.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MergeRequestParams {
    pub project_id: Option<String>,
    /// The internal ID of the merge request within the project.
    pub merge_request_iid: String,
    pub verbose: Option<bool>,
}

/// Parameters for fetching merge request diffs.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MergeRequestDiffParams {
    pub project_id: Option<String>,
    /// The internal ID of the merge request within the project.
    pub merge_request_iid: String,
}

/// Parameters for listing merge request review comments.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MergeRequestCommentsParams {
    pub project_id: Option<String>,
    /// The internal ID of the merge request within the project.
    pub merge_request_iid: String,
    /// Return every discussion exactly as GitLab reports it, resolved or not.
    pub verbose: Option<bool>,
    /// Fail when diff comments on the same noteable disagree on position.
    pub strict_positions: Option<bool>,
}

/// Parameters for a general merge request comment.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddMergeRequestCommentParams {
    pub project_id: Option<String>,
    /// The internal ID of the merge request within the project.
    pub merge_request_iid: String,
    /// The comment text.
    pub comment: String,
}

/// Parameters for a comment anchored to a diff line.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddMergeRequestDiffCommentParams {
    pub project_id: Option<String>,
    /// The internal ID of the merge request within the project.
    pub merge_request_iid: String,
    /// The comment text.
    pub comment: String,
    /// Path of the file after the change.
    pub new_path: String,
    /// Path of the file before the change; defaults to `new_path`.
    pub old_path: Option<String>,
    /// Line number in the new file (added or unchanged lines).
    pub new_line: Option<u64>,
    /// Line number in the old file (removed or unchanged lines).
    pub old_line: Option<u64>,
}

#[tool_router(router = tool_router_merge_requests, vis = "pub")]
impl ReviewMcp {
    #[tool(description = "List open merge requests for a project.")]
    async fn list_open_merge_requests(
        &self,
        Parameters(params): Parameters<ListMergeRequestsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let view = View::from_verbose(params.verbose.unwrap_or(false));
        let result = self
            .control()
            .list_open_merge_requests(params.project_id.as_deref(), view)
            .await;
        helpers::respond("list_open_merge_requests", result)
    }

    #[tool(description = "Fetch a merge request by its project-scoped iid.")]
    async fn get_merge_request_details(
        &self,
        Parameters(params): Parameters<MergeRequestParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let view = View::from_verbose(params.verbose.unwrap_or(false));
        let result = self
            .control()
            .get_merge_request(params.project_id.as_deref(), &params.merge_request_iid, view)
            .await;
        helpers::respond("get_merge_request_details", result)
    }

    #[tool(description = "Fetch the per-file diffs of a merge request.")]
    async fn get_merge_request_diff(
        &self,
        Parameters(params): Parameters<MergeRequestDiffParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .get_merge_request_diff(params.project_id.as_deref(), &params.merge_request_iid)
            .await;
        match result {
            Ok(diffs) if diffs.is_empty() => {
                Ok(CallToolResult::success(vec![Content::text(NO_DIFF_MESSAGE)]))
            }
            other => helpers::respond("get_merge_request_diff", other),
        }
    }

    #[tool(description = "List unresolved review comments of a merge request, grouped by noteable_id into discussionNotes and diffNotes. Set verbose for the raw discussions.")]
    async fn get_merge_request_comments(
        &self,
        Parameters(params): Parameters<MergeRequestCommentsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let options = ClassifyOptions::new(View::from_verbose(params.verbose.unwrap_or(false)))
            .with_position_policy(PositionPolicy::from_strict(
                params.strict_positions.unwrap_or(false),
            ));
        let result = self
            .control()
            .get_merge_request_comments(
                params.project_id.as_deref(),
                &params.merge_request_iid,
                options,
            )
            .await;
        helpers::respond("get_merge_request_comments", result)
    }

    #[tool(description = "Start a general discussion thread on a merge request.")]
    async fn add_merge_request_comment(
        &self,
        Parameters(params): Parameters<AddMergeRequestCommentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .add_merge_request_comment(
                params.project_id.as_deref(),
                &params.merge_request_iid,
                &params.comment,
            )
            .await;
        helpers::respond("add_merge_request_comment", result)
    }

    #[tool(description = "Start a discussion anchored to a line of the merge request's current diff. Provide new_line, old_line, or both.")]
    async fn add_merge_request_diff_comment(
        &self,
        Parameters(params): Parameters<AddMergeRequestDiffCommentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let AddMergeRequestDiffCommentParams {
            project_id,
            merge_request_iid,
            comment,
            new_path,
            old_path,
            new_line,
            old_line,
        } = params;
        let result = self
            .control()
            .add_merge_request_diff_comment(
                project_id.as_deref(),
                &merge_request_iid,
                DiffCommentRequest {
                    comment,
                    new_path,
                    old_path,
                    new_line,
                    old_line,
                },
            )
            .await;
        helpers::respond("add_merge_request_diff_comment", result)
    }
}
