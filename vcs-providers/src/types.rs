//! Provider-agnostic data model for pull/merge requests and diffs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    GitLab,
    GitHub,
    Bitbucket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub title: String,
    pub base_branch: String,
    pub source_branch: String,
    pub web_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiffLine {
    Added { new_line: u32, content: String },
    Removed { old_line: u32, content: String },
    Context { old_line: u32, new_line: u32, content: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub status: FileStatus,
    pub additions: u32,
    pub deletions: u32,
    pub hunks: Vec<DiffHunk>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Diff {
    pub files: Vec<FileDiff>,
    pub additions: u32,
    pub deletions: u32,
}

impl Diff {
    pub fn changed_files(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    /// For each file, the set of new-file line numbers that are `+` lines
    /// (walking hunks: `+` advances and is added, context advances,
    /// `-` does not advance). Used to validate a model comment targets a
    /// line that is actually part of this diff.
    pub fn added_lines_by_file(&self) -> std::collections::HashMap<String, std::collections::HashSet<u32>> {
        let mut out = std::collections::HashMap::new();
        for file in &self.files {
            let mut lines = std::collections::HashSet::new();
            for hunk in &file.hunks {
                for line in &hunk.lines {
                    if let DiffLine::Added { new_line, .. } = line {
                        lines.insert(*new_line);
                    }
                }
            }
            out.insert(file.path.clone(), lines);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approve,
    RequestChanges,
    Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedComment {
    pub path: String,
    pub line: u32,
    pub body: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub summary: String,
    pub comments: Vec<PostedComment>,
    pub verdict: Verdict,
}
