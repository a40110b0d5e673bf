use review_model::{EntityKind, ProjectListQuery, View};
use serde_json::Value;

use super::{ControlError, ReviewControlPlane};
use crate::views::{shape, shape_all};

impl ReviewControlPlane {
    /// Lists projects visible to the token, optionally filtered by a search
    /// term.
    ///
    /// # Errors
    /// Returns `ControlError` if the GitLab request fails.
    pub async fn list_projects(
        &self,
        search: Option<&str>,
        membership: bool,
        view: View,
    ) -> Result<Vec<Value>, ControlError> {
        let query = ProjectListQuery {
            membership,
            search: search
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            per_page: self.client.per_page(),
        };
        let projects = self.client.list_projects(&query).await?;
        Ok(shape_all(projects, view, EntityKind::Project))
    }

    /// Fetches one project.
    ///
    /// # Errors
    /// Returns `ControlError` if no project can be resolved or the GitLab
    /// request fails.
    pub async fn get_project(
        &self,
        project_id: Option<&str>,
        view: View,
    ) -> Result<Value, ControlError> {
        let project = self.resolve_project(project_id)?;
        let record = self.client.get_project(&project).await?;
        Ok(shape(record, view, EntityKind::Project))
    }
}
