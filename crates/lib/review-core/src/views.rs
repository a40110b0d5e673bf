//! Summary view projection.
//!
//! Projections are driven by the `FieldSpec` tables in `review_model::schema`,
//! so every summary shape is declared in one place and the raw view is a plain
//! pass-through.

use review_model::schema::FieldSpec;
use review_model::{EntityKind, View};
use serde_json::{Map, Value};

/// Walks `path` through nested objects of `record`.
#[must_use]
pub fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(record, |current, segment| current.as_object()?.get(*segment))
}

/// Projects `record` onto `fields`, emitting `null` for anything absent.
#[must_use]
pub fn project(record: &Value, fields: &[FieldSpec]) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| {
            let value = lookup(record, field.path).cloned().unwrap_or(Value::Null);
            (field.key.to_string(), value)
        })
        .collect()
}

/// Projects `record` onto `fields`, requiring every field to be present and
/// non-null.
///
/// # Errors
/// Returns the dotted path of the first missing field.
pub fn project_required(record: &Value, fields: &[FieldSpec]) -> Result<Map<String, Value>, String> {
    let mut projected = Map::with_capacity(fields.len());
    for field in fields {
        match lookup(record, field.path) {
            Some(value) if !value.is_null() => {
                projected.insert(field.key.to_string(), value.clone());
            }
            _ => return Err(field.path.join(".")),
        }
    }
    Ok(projected)
}

/// Shapes a single GitLab record for the requested view.
#[must_use]
pub fn shape(record: Value, view: View, kind: EntityKind) -> Value {
    match view {
        View::Raw => record,
        View::Summary => Value::Object(project(&record, kind.summary_fields())),
    }
}

/// Shapes a list of GitLab records for the requested view.
#[must_use]
pub fn shape_all(records: Vec<Value>, view: View, kind: EntityKind) -> Vec<Value> {
    match view {
        View::Raw => records,
        View::Summary => records
            .into_iter()
            .map(|record| shape(record, view, kind))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_model::schema::NOTE_SUMMARY_FIELDS;
    use serde_json::json;

    fn merge_request() -> Value {
        json!({
            "id": 501,
            "iid": 7,
            "title": "Add review tooling",
            "state": "opened",
            "author": { "id": 3, "name": "Sam Reviewer", "username": "sam" },
            "source_branch": "feature/review",
            "target_branch": "main",
            "web_url": "https://gitlab.example.com/group/app/-/merge_requests/7",
            "description": "Adds tools.",
            "changes_count": "4",
            "pipeline": { "status": "success" }
        })
    }

    #[test]
    fn lookup_walks_nested_objects() {
        let record = merge_request();
        assert_eq!(lookup(&record, &["author", "name"]), Some(&json!("Sam Reviewer")));
        assert_eq!(lookup(&record, &["author", "email"]), None);
        assert_eq!(lookup(&record, &["title", "name"]), None);
    }

    #[test]
    fn summary_view_keeps_only_declared_fields() {
        let shaped = shape(merge_request(), View::Summary, EntityKind::MergeRequest);
        let object = shaped.as_object().expect("summary should be an object");

        assert_eq!(object.len(), EntityKind::MergeRequest.summary_fields().len());
        assert_eq!(object["author_name"], "Sam Reviewer");
        assert_eq!(object["iid"], 7);
        assert!(object.get("pipeline").is_none());
        assert!(object.get("author").is_none());
    }

    #[test]
    fn summary_view_fills_missing_fields_with_null() {
        let shaped = shape(json!({ "id": 1, "name": "app" }), View::Summary, EntityKind::Project);
        assert_eq!(shaped["default_branch"], Value::Null);
        assert_eq!(shaped["name"], "app");
    }

    #[test]
    fn raw_view_is_pass_through() {
        let records = vec![merge_request(), json!({ "anything": true })];
        let shaped = shape_all(records.clone(), View::Raw, EntityKind::MergeRequest);
        assert_eq!(shaped, records);
    }

    #[test]
    fn required_projection_reports_missing_path() {
        let note = json!({ "id": 1, "noteable_id": 9, "body": "hi", "author": {} });
        let missing = project_required(&note, NOTE_SUMMARY_FIELDS)
            .expect_err("author name is missing");
        assert_eq!(missing, "author.name");

        let note = json!({ "id": 1, "noteable_id": null, "body": "hi", "author": { "name": "A" } });
        let missing = project_required(&note, NOTE_SUMMARY_FIELDS)
            .expect_err("null noteable_id counts as missing");
        assert_eq!(missing, "noteable_id");
    }
}
