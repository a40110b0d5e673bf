use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::ReviewMcp;

/// Payload listing the MCP commands this server offers.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: vec![
                "help - List the MCP commands offered by this server.".to_string(),
                "health - Returns ok.".to_string(),
                "list_projects - List projects visible to the token, optionally filtered by search."
                    .to_string(),
                "get_project - Fetch a project by id or path.".to_string(),
                "list_open_merge_requests - List open merge requests for a project.".to_string(),
                "get_merge_request_details - Fetch a merge request by iid.".to_string(),
                "get_merge_request_diff - Fetch the per-file diffs of a merge request."
                    .to_string(),
                "get_merge_request_comments - Unresolved review comments grouped by noteable_id (verbose for raw discussions)."
                    .to_string(),
                "add_merge_request_comment - Start a general discussion on a merge request."
                    .to_string(),
                "add_merge_request_diff_comment - Start a discussion on a line of the merge request diff."
                    .to_string(),
                "list_issues - List project issues by state.".to_string(),
                "get_issue_details - Fetch an issue by iid.".to_string(),
                "add_issue_comment - Add a comment to an issue.".to_string(),
            ],
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl ReviewMcp {
    #[tool(description = "List the MCP commands offered by this server.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_tool_once() {
        let help = HelpCommands::default();
        let names: Vec<&str> = help
            .commands
            .iter()
            .filter_map(|line| line.split(" - ").next())
            .collect();

        for tool in [
            "list_projects",
            "get_merge_request_comments",
            "add_merge_request_diff_comment",
            "add_issue_comment",
        ] {
            assert_eq!(names.iter().filter(|name| **name == tool).count(), 1, "{tool}");
        }
    }
}
