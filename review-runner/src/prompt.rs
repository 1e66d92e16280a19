//! Builds the prompt sent to `LlmServiceProfiles::generate_review`: the
//! annotated diff (spec's wire shape) plus whatever graph/RAG context the
//! Retriever assembled.

use retriever::ReviewContext;
use vcs_providers::{Diff, DiffLine};

const DEFAULT_CHAR_BUDGET: usize = 24_000;

/// Renders a diff the way the model expects it: per file, `---`/`+++`
/// headers, one `@@` line per hunk, `+` lines annotated with their new-file
/// line number, context lines omitted, `-` lines kept verbatim.
pub fn render_diff_for_prompt(diff: &Diff, char_budget: usize) -> String {
    let mut out = String::new();
    for (index, file) in diff.files.iter().enumerate() {
        out.push_str(&format!("--- {0}\n+++ {0}\n", file.path));
        for hunk in &file.hunks {
            out.push_str(&format!("@@ -{},{} +{},{} @@\n", hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines));
            for line in &hunk.lines {
                match line {
                    DiffLine::Added { new_line, content } => out.push_str(&format!("[Line {new_line}] +{content}\n")),
                    DiffLine::Removed { content, .. } => out.push_str(&format!("-{content}\n")),
                    DiffLine::Context { .. } => {}
                }
            }
        }

        if out.len() > char_budget {
            out.truncate(char_budget);
            let remaining = diff.files.len() - (index + 1);
            if remaining > 0 {
                out.push_str(&format!("\n...[truncated: diff exceeds character budget, {remaining} more changed file(s) not shown]\n"));
            } else {
                out.push_str("\n...[truncated: diff exceeds character budget]\n");
            }
            return out;
        }
    }
    out
}

pub fn build_review_prompt(diff: &Diff, context: &ReviewContext) -> String {
    let rendered_diff = render_diff_for_prompt(diff, DEFAULT_CHAR_BUDGET);

    let mut prompt = String::new();
    prompt.push_str("Review the following diff. Respond with the JSON contract you were given.\n\n");

    if !context.changed_symbols.is_empty() {
        prompt.push_str("# Changed symbols\n");
        for s in &context.changed_symbols {
            prompt.push_str(&format!("- {} ({})\n", s.qualified_name, s.signature));
        }
        prompt.push('\n');
    }

    if !context.callers.is_empty() {
        prompt.push_str("# Callers of changed symbols\n");
        for s in context.callers.iter().take(20) {
            prompt.push_str(&format!("- {}\n", s.qualified_name));
        }
        prompt.push('\n');
    }

    if !context.callees.is_empty() {
        prompt.push_str("# Callees of changed symbols\n");
        for s in context.callees.iter().take(20) {
            prompt.push_str(&format!("- {}\n", s.qualified_name));
        }
        prompt.push('\n');
    }

    if let Some(radius) = &context.blast_radius {
        prompt.push_str(&format!("# Blast radius\nrisk_score={} direct_callers={} transitive_callers={} affected_files={}\n\n", radius.risk_score, radius.direct_callers.len(), radius.transitive_callers.len(), radius.affected_files.len()));
    }

    if !context.semantic_neighbors.is_empty() {
        prompt.push_str("# Semantically related symbols\n");
        for n in context.semantic_neighbors.iter().take(10) {
            prompt.push_str(&format!("- {} (score {:.2})\n", n.symbol.qualified_name, n.combined_score));
        }
        prompt.push('\n');
    }

    if let Some(examples) = &context.prior_examples {
        if !examples.is_empty() {
            prompt.push_str("# Prior accepted review comments (positive examples)\n");
            for e in examples {
                prompt.push_str(&format!("- {}:{}: {}\n", e.path, e.line, e.body));
            }
            prompt.push('\n');
        }
    }

    if let Some(examples) = &context.rejected_examples {
        if !examples.is_empty() {
            prompt.push_str("# Prior rejected review comments (avoid this kind of feedback)\n");
            for e in examples {
                prompt.push_str(&format!("- {}:{}: {}\n", e.path, e.line, e.body));
            }
            prompt.push('\n');
        }
    }

    prompt.push_str("# Diff\n");
    prompt.push_str(&rendered_diff);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcs_providers::{DiffHunk, FileDiff, FileStatus};

    #[test]
    fn renders_added_lines_with_explicit_line_numbers() {
        let diff = Diff {
            files: vec![FileDiff {
                path: "a.ts".into(),
                status: FileStatus::Modified,
                additions: 1,
                deletions: 0,
                hunks: vec![DiffHunk { old_start: 1, old_lines: 0, new_start: 5, new_lines: 1, lines: vec![DiffLine::Added { new_line: 5, content: "let x = 1;".into() }] }],
            }],
            additions: 1,
            deletions: 0,
        };

        let rendered = render_diff_for_prompt(&diff, 10_000);
        assert!(rendered.contains("[Line 5] +let x = 1;"));
        assert!(rendered.contains("--- a.ts"));
    }

    #[test]
    fn truncates_past_the_character_budget() {
        let big_content = "x".repeat(1000);
        let diff = Diff {
            files: vec![FileDiff {
                path: "a.ts".into(),
                status: FileStatus::Modified,
                additions: 1,
                deletions: 0,
                hunks: vec![DiffHunk { old_start: 1, old_lines: 0, new_start: 1, new_lines: 1, lines: vec![DiffLine::Added { new_line: 1, content: big_content }] }],
            }],
            additions: 1,
            deletions: 0,
        };

        let rendered = render_diff_for_prompt(&diff, 50);
        assert!(rendered.contains("truncated"));
    }
}
