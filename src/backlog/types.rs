use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::picker::Named;

/// A Backlog project, the top level of the selection hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Numeric identifier assigned by Backlog
    pub id: u64,
    /// Display name
    pub name: String,
}

/// A Git repository belonging to a project.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
}

/// A pull request belonging to a repository.
///
/// Backlog gives every pull request both an internal `id` and a
/// per-repository `number`; the comments endpoint is addressed by `number`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    #[allow(dead_code)] // Internal id; endpoints are addressed by number
    pub id: u64,
    pub number: u64,
    /// Summary text shown in lists and used in the report filename
    pub summary: String,
}

/// A review comment on a pull request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)] // Full wire schema; the report reads only a subset
pub struct Comment {
    pub id: u64,
    /// Where the comment is anchored (inline on a file/line, or the PR
    /// as a whole). Decoded from the sibling `filePath`/`position` fields.
    #[serde(flatten)]
    pub anchor: CommentAnchor,
    /// Comment body
    pub content: String,
    /// Field changes recorded on the comment; carried through undecoded
    #[serde(default)]
    pub change_log: Vec<ChangeLog>,
    pub created_user: User,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Comment {
    /// Human-readable location label for the report's first column.
    pub fn location_label(&self) -> String {
        self.anchor.label()
    }
}

/// Anchor of a comment within a pull request.
///
/// Backlog sends `filePath` and `position` as two independently nullable
/// fields, but they are only ever present together: inline comments carry
/// both, general comments carry neither. The two-case representation keeps
/// that invariant out of reach of the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAnchor")]
pub enum CommentAnchor {
    /// Attached to a specific line of a file in the diff
    Inline { file_path: String, position: u32 },
    /// Applies to the pull request as a whole
    General,
}

impl CommentAnchor {
    /// Render the anchor as a display label: `"{file}: line {n}"` for
    /// inline comments, a fixed sentinel for general ones.
    pub fn label(&self) -> String {
        match self {
            CommentAnchor::Inline { file_path, position } => {
                format!("{file_path}: line {position}")
            }
            CommentAnchor::General => "entire pull request".to_string(),
        }
    }
}

/// Wire shape of the anchor fields as Backlog actually sends them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnchor {
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    position: Option<u32>,
}

impl From<RawAnchor> for CommentAnchor {
    fn from(raw: RawAnchor) -> Self {
        match (raw.file_path, raw.position) {
            (Some(file_path), Some(position)) => CommentAnchor::Inline { file_path, position },
            _ => CommentAnchor::General,
        }
    }
}

/// One entry of a comment's change log (status changes, assignee changes
/// and the like). The pipeline carries these through without interpreting
/// them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ChangeLog {
    pub field: String,
    #[serde(default)]
    pub original_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
}

/// The Backlog user who authored a comment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)] // Account metadata beyond `name` is not used
pub struct User {
    pub id: u64,
    /// Login identifier; absent for some account types
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name, used in the report's author column
    pub name: String,
    #[serde(default)]
    pub mail_address: Option<String>,
    #[serde(default)]
    pub nulab_account: Option<NulabAccount>,
}

/// Nulab account metadata attached to a user. Not used by the pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct NulabAccount {
    pub nulab_id: String,
    pub name: String,
    pub unique_id: String,
}

impl Named for Project {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for Repository {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for PullRequest {
    fn display_name(&self) -> &str {
        &self.summary
    }
}
