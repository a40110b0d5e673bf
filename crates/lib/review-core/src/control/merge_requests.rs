use review_model::schema::MR_STATE_OPENED;
use review_model::{
    ClassifiedComments,
    ClassifyOptions,
    EntityKind,
    MergeRequestListQuery,
    MergeRequestRefs,
    NewDiscussion,
    NewPosition,
    View,
};
use serde_json::Value;
use tracing::info;

use super::{ControlError, ReviewControlPlane, validate_comment, validate_iid};
use crate::classify::classify;
use crate::views::{shape, shape_all};

/// A comment anchored to a line of a merge request diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffCommentRequest {
    pub comment: String,
    pub new_path: String,
    pub old_path: Option<String>,
    pub new_line: Option<u64>,
    pub old_line: Option<u64>,
}

impl ReviewControlPlane {
    /// Lists open merge requests for a project.
    ///
    /// # Errors
    /// Returns `ControlError` if no project can be resolved or the GitLab
    /// request fails.
    pub async fn list_open_merge_requests(
        &self,
        project_id: Option<&str>,
        view: View,
    ) -> Result<Vec<Value>, ControlError> {
        let project = self.resolve_project(project_id)?;
        let query = MergeRequestListQuery {
            state: MR_STATE_OPENED.to_string(),
            per_page: self.client.per_page(),
        };
        let merge_requests = self.client.list_merge_requests(&project, &query).await?;
        Ok(shape_all(merge_requests, view, EntityKind::MergeRequest))
    }

    /// Fetches a merge request by iid.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid arguments or a failed GitLab request.
    pub async fn get_merge_request(
        &self,
        project_id: Option<&str>,
        merge_request_iid: &str,
        view: View,
    ) -> Result<Value, ControlError> {
        let project = self.resolve_project(project_id)?;
        let iid = validate_iid("merge_request_iid", merge_request_iid)?;
        let record = self.client.get_merge_request(&project, iid).await?;
        Ok(shape(record, view, EntityKind::MergeRequest))
    }

    /// Lists the per-file diffs of a merge request.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid arguments or a failed GitLab request.
    pub async fn get_merge_request_diff(
        &self,
        project_id: Option<&str>,
        merge_request_iid: &str,
    ) -> Result<Vec<Value>, ControlError> {
        let project = self.resolve_project(project_id)?;
        let iid = validate_iid("merge_request_iid", merge_request_iid)?;
        Ok(self.client.list_merge_request_diffs(&project, iid).await?)
    }

    /// Fetches merge request discussions and classifies them.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid arguments, a failed GitLab request,
    /// or discussions the classifier rejects.
    pub async fn get_merge_request_comments(
        &self,
        project_id: Option<&str>,
        merge_request_iid: &str,
        options: ClassifyOptions,
    ) -> Result<ClassifiedComments, ControlError> {
        let project = self.resolve_project(project_id)?;
        let iid = validate_iid("merge_request_iid", merge_request_iid)?;
        let discussions = self
            .client
            .list_merge_request_discussions(&project, iid)
            .await?;
        Ok(classify(discussions, options)?)
    }

    /// Starts a general discussion thread on a merge request.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid arguments or a failed GitLab request.
    pub async fn add_merge_request_comment(
        &self,
        project_id: Option<&str>,
        merge_request_iid: &str,
        comment: &str,
    ) -> Result<Value, ControlError> {
        let project = self.resolve_project(project_id)?;
        let iid = validate_iid("merge_request_iid", merge_request_iid)?;
        let discussion = NewDiscussion {
            body: validate_comment(comment)?,
            position: None,
        };
        let created = self
            .client
            .create_merge_request_discussion(&project, iid, &discussion)
            .await?;
        info!(project = %project, merge_request_iid = %iid, "created merge request discussion");
        Ok(created)
    }

    /// Starts a discussion anchored to a diff line, using the merge request's
    /// current diff refs.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid arguments, a merge request without
    /// diff refs, or a failed GitLab request.
    pub async fn add_merge_request_diff_comment(
        &self,
        project_id: Option<&str>,
        merge_request_iid: &str,
        request: DiffCommentRequest,
    ) -> Result<Value, ControlError> {
        let DiffCommentRequest {
            comment,
            new_path,
            old_path,
            new_line,
            old_line,
        } = request;

        let project = self.resolve_project(project_id)?;
        let iid = validate_iid("merge_request_iid", merge_request_iid)?;
        let body = validate_comment(&comment)?;
        let new_path = new_path.trim().to_string();
        if new_path.is_empty() {
            return Err(ControlError::InvalidInput("new_path is required".to_string()));
        }
        if new_line.is_none() && old_line.is_none() {
            return Err(ControlError::InvalidInput(
                "new_line or old_line is required".to_string(),
            ));
        }
        let old_path = old_path
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| new_path.clone());

        let merge_request = self.client.get_merge_request(&project, iid).await?;
        let refs: MergeRequestRefs = serde_json::from_value(merge_request)
            .map_err(|err| ControlError::InvalidInput(format!("unexpected merge request shape: {err}")))?;
        let Some(diff_refs) = refs.diff_refs else {
            return Err(ControlError::InvalidInput(format!(
                "merge request {iid} has no diff refs to anchor a comment"
            )));
        };

        let discussion = NewDiscussion {
            body,
            position: Some(
                NewPosition::text(diff_refs, old_path, new_path).with_lines(new_line, old_line),
            ),
        };
        let created = self
            .client
            .create_merge_request_discussion(&project, iid, &discussion)
            .await?;
        info!(project = %project, merge_request_iid = %iid, "created merge request diff discussion");
        Ok(created)
    }
}
