//! Merge request comment classification.
//!
//! GitLab returns merge request discussions as threads of notes. The summary
//! view keeps only explicitly unresolved notes, splits them into general
//! comments and line-anchored diff comments, and groups each partition by
//! `noteable_id`. Diff groups carry a single position taken from their first
//! note.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use review_model::schema::{NOTE_SUMMARY_FIELDS, POSITION_SUMMARY_FIELDS};
use review_model::{
    ClassifiedComments,
    ClassifyOptions,
    CommentSummary,
    DiffNoteGroup,
    NoteGroup,
    NoteType,
    PositionPolicy,
    View,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::views::{project, project_required};

/// A discussion or note lacks a field the classifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedInputError {
    pub record: String,
    pub field: String,
    pub reason: String,
}

impl fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed input: {} field `{}`: {}",
            self.record, self.field, self.reason
        )
    }
}

impl Error for MalformedInputError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    MalformedInput(MalformedInputError),
    DivergentPosition { noteable_id: String, note: String },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput(err) => write!(f, "{err}"),
            Self::DivergentPosition { noteable_id, note } => write!(
                f,
                "diff notes for noteable_id {noteable_id} disagree on position (first differing: {note})"
            ),
        }
    }
}

impl Error for ClassifyError {}

impl From<MalformedInputError> for ClassifyError {
    fn from(err: MalformedInputError) -> Self {
        Self::MalformedInput(err)
    }
}

/// Classifies merge request discussions for the requested view.
///
/// The raw view returns `discussions` untouched.
///
/// # Errors
/// Returns `ClassifyError` when a surviving note is malformed, or when the
/// strict position policy finds diverging positions within a group.
pub fn classify(
    discussions: Vec<Value>,
    options: ClassifyOptions,
) -> Result<ClassifiedComments, ClassifyError> {
    match options.view {
        View::Raw => Ok(ClassifiedComments::Raw(discussions)),
        View::Summary => {
            summarize(&discussions, options.position_policy).map(ClassifiedComments::Summary)
        }
    }
}

/// Builds the grouped summary of unresolved notes.
///
/// # Errors
/// See [`classify`].
pub fn summarize(
    discussions: &[Value],
    policy: PositionPolicy,
) -> Result<CommentSummary, ClassifyError> {
    let mut general: Groups<()> = Groups::default();
    let mut diff: Groups<Map<String, Value>> = Groups::default();

    for (discussion_index, discussion) in discussions.iter().enumerate() {
        let discussion_label = record_label("discussion", discussion, discussion_index, None);
        if !discussion.is_object() {
            return Err(malformed(&discussion_label, "discussion", "expected an object").into());
        }
        let notes = discussion
            .get("notes")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed(&discussion_label, "notes", "expected an array of notes"))?;

        for (note_index, note) in notes.iter().enumerate() {
            let label = record_label("note", note, note_index, Some(&discussion_label));
            if !note.is_object() {
                return Err(malformed(&label, "note", "expected an object").into());
            }
            if !is_unresolved(note) {
                continue;
            }

            let note_type = note_type(note, &label)?;
            let projected = project_required(note, NOTE_SUMMARY_FIELDS)
                .map_err(|path| malformed(&label, &path, "missing or null"))?;
            let noteable_id = projected
                .get("noteable_id")
                .cloned()
                .unwrap_or(Value::Null);

            match note_type {
                NoteType::Discussion => general.push(noteable_id, (), projected),
                NoteType::Diff => {
                    let position = note
                        .get("position")
                        .filter(|position| position.is_object())
                        .ok_or_else(|| {
                            malformed(&label, "position", "diff note has no position record")
                        })?;
                    diff.push(noteable_id, project(position, POSITION_SUMMARY_FIELDS), projected);
                }
            }
        }
    }

    let discussion_notes: Vec<NoteGroup> = general
        .into_groups()
        .map(|(noteable_id, notes)| NoteGroup {
            noteable_id,
            notes: notes.into_iter().map(|(_, note)| note).collect(),
        })
        .collect();

    let diff_notes = diff
        .into_groups()
        .map(|(noteable_id, notes)| hoist_position(noteable_id, notes, policy))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        discussions = discussions.len(),
        discussion_groups = discussion_notes.len(),
        diff_groups = diff_notes.len(),
        "classified merge request comments"
    );

    Ok(CommentSummary {
        discussion_notes,
        diff_notes,
    })
}

fn hoist_position(
    noteable_id: Value,
    notes: Vec<(Map<String, Value>, Map<String, Value>)>,
    policy: PositionPolicy,
) -> Result<DiffNoteGroup, ClassifyError> {
    let position = notes
        .first()
        .map(|(position, _)| position.clone())
        .unwrap_or_default();

    if policy == PositionPolicy::Strict
        && let Some((_, note)) = notes.iter().find(|(other, _)| *other != position)
    {
        return Err(ClassifyError::DivergentPosition {
            noteable_id: noteable_id.to_string(),
            note: note
                .get("id")
                .map_or_else(|| "unknown note".to_string(), |id| format!("note {id}")),
        });
    }

    Ok(DiffNoteGroup {
        noteable_id,
        position,
        notes: notes.into_iter().map(|(_, note)| note).collect(),
    })
}

/// Only an explicit boolean `false` counts as unresolved.
fn is_unresolved(note: &Value) -> bool {
    matches!(note.get("resolved"), Some(Value::Bool(false)))
}

fn note_type(note: &Value, label: &str) -> Result<NoteType, MalformedInputError> {
    let tag = note
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(label, "type", "missing note type tag"))?;
    NoteType::parse(tag)
        .ok_or_else(|| malformed(label, "type", &format!("unrecognized note type `{tag}`")))
}

fn record_label(kind: &str, record: &Value, index: usize, parent: Option<&str>) -> String {
    let own = record
        .get("id")
        .filter(|id| !id.is_null())
        .map_or_else(|| format!("{kind} #{index}"), |id| format!("{kind} {id}"));
    match parent {
        Some(parent) => format!("{own} in {parent}"),
        None => own,
    }
}

fn malformed(record: &str, field: &str, reason: &str) -> MalformedInputError {
    MalformedInputError {
        record: record.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Insertion-ordered grouping keyed by `noteable_id`.
struct Groups<P> {
    entries: Vec<(Value, Vec<(P, Map<String, Value>)>)>,
    index: HashMap<String, usize>,
}

impl<P> Default for Groups<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<P> Groups<P> {
    fn push(&mut self, noteable_id: Value, payload: P, note: Map<String, Value>) {
        let key = noteable_id.to_string();
        let slot = match self.index.get(&key) {
            Some(slot) => *slot,
            None => {
                self.entries.push((noteable_id, Vec::new()));
                let slot = self.entries.len() - 1;
                self.index.insert(key, slot);
                slot
            }
        };
        self.entries[slot].1.push((payload, note));
    }

    fn into_groups(self) -> impl Iterator<Item = (Value, Vec<(P, Map<String, Value>)>)> {
        self.entries.into_iter()
    }
}
