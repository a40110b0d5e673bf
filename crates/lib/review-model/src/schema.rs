pub const NOTE_TYPE_DISCUSSION: &str = "DiscussionNote";
pub const NOTE_TYPE_DIFF: &str = "DiffNote";

pub const POSITION_TYPE_TEXT: &str = "text";

pub const MR_STATE_OPENED: &str = "opened";

pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 100;

pub const NO_DIFF_MESSAGE: &str = "No diff data available for this merge request.";

/// One output field of a summary projection.
///
/// `path` walks nested objects in the raw record, so `["author", "name"]`
/// reads `record.author.name` and emits it under `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub path: &'static [&'static str],
}

impl FieldSpec {
    #[must_use]
    pub const fn new(key: &'static str, path: &'static [&'static str]) -> Self {
        Self { key, path }
    }
}

pub const PROJECT_SUMMARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", &["id"]),
    FieldSpec::new("name", &["name"]),
    FieldSpec::new("path_with_namespace", &["path_with_namespace"]),
    FieldSpec::new("default_branch", &["default_branch"]),
    FieldSpec::new("web_url", &["web_url"]),
];

pub const MERGE_REQUEST_SUMMARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", &["id"]),
    FieldSpec::new("iid", &["iid"]),
    FieldSpec::new("title", &["title"]),
    FieldSpec::new("state", &["state"]),
    FieldSpec::new("author_name", &["author", "name"]),
    FieldSpec::new("source_branch", &["source_branch"]),
    FieldSpec::new("target_branch", &["target_branch"]),
    FieldSpec::new("web_url", &["web_url"]),
    FieldSpec::new("description", &["description"]),
];

pub const ISSUE_SUMMARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", &["id"]),
    FieldSpec::new("iid", &["iid"]),
    FieldSpec::new("title", &["title"]),
    FieldSpec::new("state", &["state"]),
    FieldSpec::new("author_name", &["author", "name"]),
    FieldSpec::new("labels", &["labels"]),
    FieldSpec::new("web_url", &["web_url"]),
    FieldSpec::new("description", &["description"]),
];

pub const NOTE_SUMMARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", &["id"]),
    FieldSpec::new("noteable_id", &["noteable_id"]),
    FieldSpec::new("body", &["body"]),
    FieldSpec::new("author_name", &["author", "name"]),
];

pub const POSITION_SUMMARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("base_sha", &["base_sha"]),
    FieldSpec::new("start_sha", &["start_sha"]),
    FieldSpec::new("head_sha", &["head_sha"]),
    FieldSpec::new("old_path", &["old_path"]),
    FieldSpec::new("new_path", &["new_path"]),
    FieldSpec::new("position_type", &["position_type"]),
    FieldSpec::new("new_line", &["new_line"]),
    FieldSpec::new("old_line", &["old_line"]),
];
