use std::borrow::Cow;

use review_core::control::ControlError;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use serde::Serialize;
use tracing::warn;

const NO_DETAILS: &str = "No additional details";

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Formats a failed tool call as an `isError` result with a single text item.
pub(crate) fn error_envelope(err: &ControlError) -> CallToolResult {
    let details = err.details().unwrap_or(NO_DETAILS);
    CallToolResult::error(vec![Content::text(format!("Error: {err} - {details}"))])
}

/// Serializes a successful payload as pretty-printed JSON text.
pub(crate) fn json_text<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(value).map_err(|err| {
        mcp_err(
            ErrorCode::INTERNAL_ERROR,
            format!("failed to serialize tool result: {err}"),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Converts a control-plane outcome into a tool response.
///
/// A missing project is a caller mistake and is rejected as invalid params;
/// every other failure becomes the error envelope.
pub(crate) fn respond<T: Serialize>(
    tool: &str,
    result: Result<T, ControlError>,
) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(value) => json_text(&value),
        Err(ControlError::MissingProject) => Err(mcp_err(
            ErrorCode::INVALID_PARAMS,
            ControlError::MissingProject.to_string(),
        )),
        Err(err) => {
            warn!(tool, "tool call failed: {err}");
            Ok(error_envelope(&err))
        }
    }
}
