use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{
    FieldSpec,
    ISSUE_SUMMARY_FIELDS,
    MERGE_REQUEST_SUMMARY_FIELDS,
    NOTE_TYPE_DIFF,
    NOTE_TYPE_DISCUSSION,
    POSITION_TYPE_TEXT,
    PROJECT_SUMMARY_FIELDS,
};

/// Response shape requested by a tool caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Records exactly as GitLab returned them.
    Raw,
    /// Filtered, field-projected records.
    #[default]
    Summary,
}

impl View {
    #[must_use]
    pub const fn from_verbose(verbose: bool) -> Self {
        if verbose { Self::Raw } else { Self::Summary }
    }
}

/// How diff notes sharing a `noteable_id` resolve their group position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionPolicy {
    /// The first note's position stands for the whole group.
    #[default]
    FirstWins,
    /// Every note in a group must carry the same projected position.
    Strict,
}

impl PositionPolicy {
    #[must_use]
    pub const fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::FirstWins }
    }
}

/// Classifier settings for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifyOptions {
    pub view: View,
    pub position_policy: PositionPolicy,
}

impl ClassifyOptions {
    #[must_use]
    pub const fn new(view: View) -> Self {
        Self {
            view,
            position_policy: PositionPolicy::FirstWins,
        }
    }

    #[must_use]
    pub const fn with_position_policy(mut self, position_policy: PositionPolicy) -> Self {
        self.position_policy = position_policy;
        self
    }
}

/// Note type tag as reported in the `type` field of a GitLab note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    Discussion,
    Diff,
}

impl NoteType {
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            NOTE_TYPE_DISCUSSION => Some(Self::Discussion),
            NOTE_TYPE_DIFF => Some(Self::Diff),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discussion => NOTE_TYPE_DISCUSSION,
            Self::Diff => NOTE_TYPE_DIFF,
        }
    }
}

/// GitLab resources that have a summary projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    MergeRequest,
    Issue,
}

impl EntityKind {
    #[must_use]
    pub const fn summary_fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Project => PROJECT_SUMMARY_FIELDS,
            Self::MergeRequest => MERGE_REQUEST_SUMMARY_FIELDS,
            Self::Issue => ISSUE_SUMMARY_FIELDS,
        }
    }
}

/// General comments attached to one noteable object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteGroup {
    pub noteable_id: Value,
    pub notes: Vec<Map<String, Value>>,
}

/// Line-anchored comments attached to one noteable object.
///
/// `position` is shared by the group; individual notes do not repeat it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffNoteGroup {
    pub noteable_id: Value,
    pub position: Map<String, Value>,
    pub notes: Vec<Map<String, Value>>,
}

/// Unresolved merge request comments, partitioned by note type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommentSummary {
    #[serde(rename = "discussionNotes")]
    pub discussion_notes: Vec<NoteGroup>,
    #[serde(rename = "diffNotes")]
    pub diff_notes: Vec<DiffNoteGroup>,
}

/// Classifier result: either the untouched discussions or their summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ClassifiedComments {
    Raw(Vec<Value>),
    Summary(CommentSummary),
}

/// Issue state filter accepted by the issue listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Opened,
    Closed,
    All,
}

impl IssueState {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "opened" | "open" => Some(Self::Opened),
            "closed" => Some(Self::Closed),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Query parameters for `GET /projects`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub membership: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub per_page: u32,
}

/// Query parameters for `GET /projects/:id/merge_requests`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MergeRequestListQuery {
    pub state: String,
    pub per_page: u32,
}

/// Query parameters for `GET /projects/:id/issues`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IssueListQuery {
    #[serde(skip_serializing_if = "is_all_issues")]
    pub state: IssueState,
    pub per_page: u32,
}

fn is_all_issues(state: &IssueState) -> bool {
    *state == IssueState::All
}

/// Query parameters for paged sub-resources such as discussions.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageQuery {
    pub per_page: u32,
}

/// Commit references GitLab reports for a merge request's current diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffRefs {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
}

/// The part of a merge request needed to anchor diff comments.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MergeRequestRefs {
    #[serde(default)]
    pub diff_refs: Option<DiffRefs>,
}

/// Position of a new line-anchored comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPosition {
    pub position_type: String,
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    pub old_path: String,
    pub new_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<u64>,
}

impl NewPosition {
    /// Builds a text position against the given diff refs.
    #[must_use]
    pub fn text(refs: DiffRefs, old_path: String, new_path: String) -> Self {
        Self {
            position_type: POSITION_TYPE_TEXT.to_string(),
            base_sha: refs.base_sha,
            start_sha: refs.start_sha,
            head_sha: refs.head_sha,
            old_path,
            new_path,
            new_line: None,
            old_line: None,
        }
    }

    #[must_use]
    pub const fn with_lines(mut self, new_line: Option<u64>, old_line: Option<u64>) -> Self {
        self.new_line = new_line;
        self.old_line = old_line;
        self
    }
}

/// Body for `POST /projects/:id/merge_requests/:iid/discussions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewDiscussion {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<NewPosition>,
}

/// Body for `POST /projects/:id/issues/:iid/notes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewNote {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_selects_raw_view() {
        assert_eq!(View::from_verbose(true), View::Raw);
        assert_eq!(View::from_verbose(false), View::Summary);
        assert_eq!(View::default(), View::Summary);
    }

    #[test]
    fn note_type_tags_round_trip() {
        assert_eq!(NoteType::parse("DiffNote"), Some(NoteType::Diff));
        assert_eq!(NoteType::parse("DiscussionNote"), Some(NoteType::Discussion));
        assert_eq!(NoteType::parse("Note"), None);
        assert_eq!(NoteType::Diff.as_str(), "DiffNote");
    }

    #[test]
    fn issue_query_omits_state_for_all() {
        let query = IssueListQuery {
            state: IssueState::All,
            per_page: 20,
        };
        let value = serde_json::to_value(query).expect("query should serialize");
        assert_eq!(value, serde_json::json!({ "per_page": 20 }));

        let query = IssueListQuery {
            state: IssueState::Closed,
            per_page: 20,
        };
        let value = serde_json::to_value(query).expect("query should serialize");
        assert_eq!(value, serde_json::json!({ "state": "closed", "per_page": 20 }));
    }

    #[test]
    fn diff_discussion_body_carries_text_position() {
        let refs = DiffRefs {
            base_sha: "base".to_string(),
            start_sha: "start".to_string(),
            head_sha: "head".to_string(),
        };
        let position = NewPosition::text(refs, "src/lib.rs".to_string(), "src/lib.rs".to_string())
            .with_lines(Some(12), None);
        let body = NewDiscussion {
            body: "nit".to_string(),
            position: Some(position),
        };
        let value = serde_json::to_value(body).expect("discussion should serialize");
        assert_eq!(value["position"]["position_type"], "text");
        assert_eq!(value["position"]["new_line"], 12);
        assert!(value["position"].get("old_line").is_none());
    }

    #[test]
    fn summary_serializes_with_camel_case_partitions() {
        let value = serde_json::to_value(ClassifiedComments::Summary(CommentSummary::default()))
            .expect("summary should serialize");
        assert_eq!(
            value,
            serde_json::json!({ "discussionNotes": [], "diffNotes": [] })
        );
    }
}
