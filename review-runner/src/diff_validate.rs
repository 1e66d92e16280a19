//! Validates model comments against the diff they were produced from
//! (spec step 6): a comment must target a file present in the diff and a
//! line that is actually a `+` line of that file's new content.

use llm_service::ModelComment;
use tracing::warn;
use vcs_providers::Diff;

pub fn validate_against_diff(comments: Vec<ModelComment>, diff: &Diff) -> Vec<ModelComment> {
    let added_lines = diff.added_lines_by_file();

    comments
        .into_iter()
        .filter(|c| {
            let path = normalize_path(&c.path);
            match added_lines.get(&path) {
                Some(lines) if lines.contains(&(c.line as u32)) => true,
                _ => {
                    warn!(path, line = c.line, "rejecting comment: line not part of the diff");
                    false
                }
            }
        })
        .collect()
}

fn normalize_path(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_service::ModelSeverity;
    use vcs_providers::{DiffHunk, DiffLine, FileDiff, FileStatus};

    fn diff_with_added_line(path: &str, line: u32) -> Diff {
        Diff {
            files: vec![FileDiff {
                path: path.to_string(),
                status: FileStatus::Modified,
                additions: 1,
                deletions: 0,
                hunks: vec![DiffHunk { old_start: 1, old_lines: 0, new_start: line, new_lines: 1, lines: vec![DiffLine::Added { new_line: line, content: "x".into() }] }],
            }],
            additions: 1,
            deletions: 0,
        }
    }

    fn comment(path: &str, line: u64) -> ModelComment {
        ModelComment { path: path.into(), line, body: "body".into(), severity: ModelSeverity::Warning, confidence: None }
    }

    #[test]
    fn accepts_comment_on_an_added_line() {
        let diff = diff_with_added_line("src/a.ts", 10);
        let kept = validate_against_diff(vec![comment("src/a.ts", 10)], &diff);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn rejects_comment_on_a_line_not_in_the_diff() {
        let diff = diff_with_added_line("src/a.ts", 10);
        let kept = validate_against_diff(vec![comment("src/a.ts", 11)], &diff);
        assert!(kept.is_empty());
    }

    #[test]
    fn normalizes_a_leading_slash_before_matching() {
        let diff = diff_with_added_line("src/a.ts", 10);
        let kept = validate_against_diff(vec![comment("/src/a.ts", 10)], &diff);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn rejects_comment_on_a_file_not_in_the_diff() {
        let diff = diff_with_added_line("src/a.ts", 10);
        let kept = validate_against_diff(vec![comment("src/b.ts", 10)], &diff);
        assert!(kept.is_empty());
    }
}
