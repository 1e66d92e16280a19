//! Precision filter (spec step 5): keep comments scored at or above the
//! threshold; fall back to unscored comments only if every scored comment
//! was filtered out.

use llm_service::ModelComment;

pub const DEFAULT_THRESHOLD: f64 = 0.7;

pub fn filter_by_confidence(comments: Vec<ModelComment>, threshold: f64) -> Vec<ModelComment> {
    let (scored, unscored): (Vec<_>, Vec<_>) = comments.into_iter().partition(|c| c.confidence.is_some());

    let kept: Vec<ModelComment> = scored.into_iter().filter(|c| c.confidence.map(|conf| conf >= threshold).unwrap_or(false)).collect();

    if !kept.is_empty() {
        kept
    } else {
        unscored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_service::ModelSeverity;

    fn comment(body: &str, confidence: Option<f64>) -> ModelComment {
        ModelComment { path: "a.ts".into(), line: 1, body: body.into(), severity: ModelSeverity::Warning, confidence }
    }

    #[test]
    fn keeps_only_comments_at_or_above_threshold() {
        let comments = vec![comment("high", Some(0.9)), comment("low", Some(0.3))];
        let kept = filter_by_confidence(comments, DEFAULT_THRESHOLD);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].body, "high");
    }

    #[test]
    fn falls_back_to_unscored_when_all_scored_are_below_threshold() {
        let comments = vec![comment("low", Some(0.1)), comment("unscored", None)];
        let kept = filter_by_confidence(comments, DEFAULT_THRESHOLD);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].body, "unscored");
    }

    #[test]
    fn keeps_nothing_when_everything_is_filtered_and_nothing_is_unscored() {
        let comments = vec![comment("low", Some(0.1))];
        let kept = filter_by_confidence(comments, DEFAULT_THRESHOLD);
        assert!(kept.is_empty());
    }
}
