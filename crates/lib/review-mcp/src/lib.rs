//! MCP server implementation for gitlab-review-mcp.
//!
//! This crate wires the review control plane into rmcp tool handlers and
//! exposes the MCP-facing API surface for projects, merge requests, review
//! comments, and issues.

mod helpers;
mod tools;
pub mod server;

use review_core::control::ReviewControlPlane;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

const SERVER_INSTRUCTIONS: &str = r"gitlab-review-mcp exposes GitLab projects, merge requests, review comments, and issues as MCP tools.

Workflow:
1. Pick a project. Most tools take an optional `project_id` (numeric id or `group/project` path).
   When it is omitted the server's default project is used, if one is configured.
   Use `list_projects` to discover projects.
2. Review merge requests:
   - `list_open_merge_requests`, `get_merge_request_details`, `get_merge_request_diff`.
   - `get_merge_request_comments` returns unresolved comments grouped by `noteable_id`:
     `discussionNotes` for general comments and `diffNotes` for line comments, each diff group
     carrying one shared `position`.
3. Respond:
   - `add_merge_request_comment` starts a general thread.
   - `add_merge_request_diff_comment` anchors a thread to a file line of the current diff.
4. Issues: `list_issues`, `get_issue_details`, `add_issue_comment`.

Notes:
- Pass `verbose: true` to receive GitLab's raw JSON instead of the summary view.
- `strict_positions: true` makes `get_merge_request_comments` fail when diff notes in one group
  disagree on position instead of keeping the first.
- Failures come back as a text result starting with `Error:`.
- `help` lists the tools; `health` returns `ok`.";

/// MCP server wrapper around the review control plane and tool routers.
#[derive(Clone)]
pub struct ReviewMcp {
    tool_router: ToolRouter<Self>,
    control: ReviewControlPlane,
}

impl ReviewMcp {
    /// Creates a new server backed by `control`.
    #[must_use]
    pub fn new(control: ReviewControlPlane) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_projects()
            + Self::tool_router_merge_requests()
            + Self::tool_router_issues()
            + Self::tool_router_context();
        Self {
            tool_router,
            control,
        }
    }

    pub(crate) const fn control(&self) -> &ReviewControlPlane {
        &self.control
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl ReviewMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for ReviewMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
