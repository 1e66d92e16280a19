//! Unified-diff parsing: file headers plus hunks/lines, provider-agnostic.
//! Robust to missing file headers; only `@@` headers are required for hunk
//! content.

use crate::types::{Diff, DiffHunk, DiffLine, FileDiff, FileStatus};

/// Parses a complete unified diff (possibly multi-file, as produced by
/// `git diff` or a provider's raw diff endpoint) into [`Diff`].
pub fn parse_diff(raw: &str) -> Diff {
    let mut files = Vec::new();
    let mut current_path: Option<String> = None;
    let mut current_old_path: Option<String> = None;
    let mut current_raw = String::new();
    let mut is_new = false;
    let mut is_deleted = false;

    let flush = |path: &Option<String>,
                 old_path: &Option<String>,
                 raw: &str,
                 is_new: bool,
                 is_deleted: bool,
                 files: &mut Vec<FileDiff>| {
        let Some(path) = path else { return };
        let hunks = parse_unified_diff_advanced(raw);
        let (additions, deletions) = count_changes(&hunks);
        let status = if is_new {
            FileStatus::Added
        } else if is_deleted {
            FileStatus::Deleted
        } else if old_path.as_deref().is_some_and(|p| p != path) {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        };
        files.push(FileDiff {
            path: path.clone(),
            status,
            additions,
            deletions,
            hunks,
        });
    };

    for line in raw.lines() {
        if line.starts_with("diff --git ") {
            flush(&current_path, &current_old_path, &current_raw, is_new, is_deleted, &mut files);
            current_path = None;
            current_old_path = None;
            current_raw.clear();
            is_new = false;
            is_deleted = false;
            continue;
        }
        if line.starts_with("new file mode") {
            is_new = true;
            continue;
        }
        if line.starts_with("deleted file mode") {
            is_deleted = true;
            continue;
        }
        if let Some(p) = line.strip_prefix("--- ") {
            current_old_path = strip_diff_prefix(p);
            continue;
        }
        if let Some(p) = line.strip_prefix("+++ ") {
            current_path = strip_diff_prefix(p);
            if current_old_path.is_none() {
                current_old_path = current_path.clone();
            }
            continue;
        }
        current_raw.push_str(line);
        current_raw.push('\n');
    }
    flush(&current_path, &current_old_path, &current_raw, is_new, is_deleted, &mut files);

    let additions = files.iter().map(|f| f.additions).sum();
    let deletions = files.iter().map(|f| f.deletions).sum();
    Diff { files, additions, deletions }
}

/// Strips the `a/`/`b/` prefix a unified diff header carries; `/dev/null`
/// (the new-file / deleted-file sentinel) becomes `None`.
fn strip_diff_prefix(raw_path: &str) -> Option<String> {
    let trimmed = raw_path.trim();
    if trimmed == "/dev/null" {
        return None;
    }
    let stripped = trimmed.strip_prefix("a/").or_else(|| trimmed.strip_prefix("b/")).unwrap_or(trimmed);
    Some(stripped.to_string())
}

fn count_changes(hunks: &[DiffHunk]) -> (u32, u32) {
    let mut additions = 0;
    let mut deletions = 0;
    for hunk in hunks {
        for line in &hunk.lines {
            match line {
                DiffLine::Added { .. } => additions += 1,
                DiffLine::Removed { .. } => deletions += 1,
                DiffLine::Context { .. } => {}
            }
        }
    }
    (additions, deletions)
}

/// Parses the hunk bodies of a single file's unified diff text.
pub fn parse_unified_diff_advanced(s: &str) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();
    let mut cur_old_start = 0u32;
    let mut cur_old_lines = 0u32;
    let mut cur_new_start = 0u32;
    let mut cur_new_lines = 0u32;
    let mut lines_buf: Vec<DiffLine> = Vec::new();
    let mut old_line = 0u32;
    let mut new_line = 0u32;
    let mut in_hunk = false;

    for line in s.lines() {
        if line.starts_with("@@") {
            if in_hunk && !lines_buf.is_empty() {
                hunks.push(DiffHunk {
                    old_start: cur_old_start,
                    old_lines: cur_old_lines,
                    new_start: cur_new_start,
                    new_lines: cur_new_lines,
                    lines: std::mem::take(&mut lines_buf),
                });
            }
            if let Some((left, right)) = line.trim_start_matches('@').trim_end_matches('@').trim().split_once('+') {
                let left_nums = left.trim().trim_start_matches('-');
                let right_nums = right.trim();
                let (o_start, o_len) = split_nums(left_nums);
                let (n_start, n_len) = split_nums(right_nums);
                cur_old_start = o_start;
                cur_old_lines = o_len;
                cur_new_start = n_start;
                cur_new_lines = n_len;
                old_line = o_start;
                new_line = n_start;
                in_hunk = true;
            }
            continue;
        }

        if line.starts_with("\\ ") {
            continue;
        }

        if !in_hunk {
            continue;
        }

        if let Some(rest) = line.strip_prefix('+') {
            lines_buf.push(DiffLine::Added { new_line, content: rest.to_string() });
            new_line += 1;
        } else if let Some(rest) = line.strip_prefix('-') {
            lines_buf.push(DiffLine::Removed { old_line, content: rest.to_string() });
            old_line += 1;
        } else if let Some(rest) = line.strip_prefix(' ') {
            lines_buf.push(DiffLine::Context { old_line, new_line, content: rest.to_string() });
            old_line += 1;
            new_line += 1;
        } else {
            lines_buf.push(DiffLine::Context { old_line, new_line, content: line.to_string() });
            old_line += 1;
            new_line += 1;
        }
    }

    if in_hunk && !lines_buf.is_empty() {
        hunks.push(DiffHunk {
            old_start: cur_old_start,
            old_lines: cur_old_lines,
            new_start: cur_new_start,
            new_lines: cur_new_lines,
            lines: lines_buf,
        });
    }
    hunks
}

fn split_nums(s: &str) -> (u32, u32) {
    let s = s.trim();
    if let Some((a, b)) = s.split_once(',') {
        (a.parse().unwrap_or(0), b.parse().unwrap_or(0))
    } else {
        (s.parse().unwrap_or(0), 0)
    }
}

/// Parses just the changed-file path set out of unified-diff headers
/// (`--- a/<p>`, `+++ b/<p>`, `diff --git a/<p> b/<p>`), excluding
/// `/dev/null`. Used by the Retriever, which only needs the path set and
/// not full hunk parsing.
pub fn changed_file_paths(raw: &str) -> std::collections::HashSet<String> {
    let mut paths = std::collections::HashSet::new();
    for line in raw.lines() {
        if let Some(p) = line.strip_prefix("--- ").or_else(|| line.strip_prefix("+++ ")) {
            if let Some(p) = strip_diff_prefix(p) {
                paths.insert(p);
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "diff --git a/src/lib.rs b/src/lib.rs\n\
--- a/src/lib.rs\n\
+++ b/src/lib.rs\n\
@@ -1,3 +1,4 @@\n\
 fn main() {\n\
+    println!(\"added\");\n\
     other();\n\
-    removed();\n\
 }\n";

    #[test]
    fn parses_single_file_diff() {
        let diff = parse_diff(SAMPLE);
        assert_eq!(diff.files.len(), 1);
        assert_eq!(diff.files[0].path, "src/lib.rs");
        assert_eq!(diff.additions, 1);
        assert_eq!(diff.deletions, 1);
    }

    #[test]
    fn added_lines_by_file_only_counts_plus_lines() {
        let diff = parse_diff(SAMPLE);
        let map = diff.added_lines_by_file();
        let added = &map["src/lib.rs"];
        assert_eq!(added.len(), 1);
        assert!(added.contains(&2));
    }

    #[test]
    fn changed_file_paths_excludes_dev_null() {
        let new_file = "--- /dev/null\n+++ b/new.rs\n@@ -0,0 +1 @@\n+hi\n";
        let paths = changed_file_paths(new_file);
        assert_eq!(paths.len(), 1);
        assert!(paths.contains("new.rs"));
    }
}
