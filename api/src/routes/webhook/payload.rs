//! Normalizes the three platforms' webhook bodies into one shape. Every
//! field is optional on the way in; a payload missing what we need turns
//! into `None` rather than an error; the route handler treats `None` as a
//! no-op 200, never a 400 or 500.

use serde_json::Value;
use vcs_providers::ProviderKind;

#[derive(Debug, Clone)]
pub struct PushEvent {
    pub repository_url: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub struct PullRequestEvent {
    pub repository_url: String,
    pub base_branch: String,
    pub pr_id: u64,
    pub action: String,
}

const RELEVANT_PR_ACTIONS: &[&str] = &["opened", "synchronize", "created", "updated"];

impl PullRequestEvent {
    pub fn is_relevant(&self) -> bool {
        RELEVANT_PR_ACTIONS.contains(&self.action.as_str())
    }
}

fn str_field<'a>(v: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = v;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str()
}

fn branch_from_ref(r: &str) -> &str {
    r.rsplit('/').next().unwrap_or(r)
}

pub fn parse_push(kind: ProviderKind, body: &Value) -> Option<PushEvent> {
    match kind {
        ProviderKind::GitHub => {
            let repository_url = str_field(body, &["repository", "clone_url"])?.to_string();
            let branch = branch_from_ref(str_field(body, &["ref"])?).to_string();
            Some(PushEvent { repository_url, branch })
        }
        ProviderKind::GitLab => {
            let repository_url = str_field(body, &["project", "git_http_url"])?.to_string();
            let branch = branch_from_ref(str_field(body, &["ref"])?).to_string();
            Some(PushEvent { repository_url, branch })
        }
        ProviderKind::Bitbucket => {
            let repository_url = str_field(body, &["repository", "links", "html", "href"])?.to_string();
            let branch = body.get("push")?.get("changes")?.get(0)?.get("new")?.get("name")?.as_str()?.to_string();
            Some(PushEvent { repository_url, branch })
        }
    }
}

pub fn parse_pull_request(kind: ProviderKind, body: &Value) -> Option<PullRequestEvent> {
    match kind {
        ProviderKind::GitHub => {
            let action = str_field(body, &["action"])?.to_string();
            let pr_id = body.get("pull_request")?.get("number")?.as_u64()?;
            let base_branch = str_field(body, &["pull_request", "base", "ref"])?.to_string();
            let repository_url = str_field(body, &["repository", "clone_url"])?.to_string();
            Some(PullRequestEvent { repository_url, base_branch, pr_id, action })
        }
        ProviderKind::GitLab => {
            let attrs = body.get("object_attributes")?;
            let gitlab_action = attrs.get("action")?.as_str()?;
            let action = match gitlab_action {
                "open" => "opened",
                "update" => "synchronize",
                other => other,
            }
            .to_string();
            let pr_id = attrs.get("iid")?.as_u64()?;
            let base_branch = attrs.get("target_branch")?.as_str()?.to_string();
            let repository_url = str_field(body, &["project", "git_http_url"])?.to_string();
            Some(PullRequestEvent { repository_url, base_branch, pr_id, action })
        }
        ProviderKind::Bitbucket => {
            let event_key = str_field(body, &["__event_key__"]).unwrap_or("pullrequest:created");
            let action = if event_key.ends_with("updated") { "synchronize" } else { "opened" }.to_string();
            let pr_id = body.get("pullrequest")?.get("id")?.as_u64()?;
            let base_branch = str_field(body, &["pullrequest", "destination", "branch", "name"])?.to_string();
            let repository_url = str_field(body, &["repository", "links", "html", "href"])?.to_string();
            Some(PullRequestEvent { repository_url, base_branch, pr_id, action })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_github_push_ref_into_a_branch_name() {
        let body = json!({"ref": "refs/heads/main", "repository": {"clone_url": "https://github.com/acme/widgets.git"}});
        let event = parse_push(ProviderKind::GitHub, &body).unwrap();
        assert_eq!(event.branch, "main");
        assert_eq!(event.repository_url, "https://github.com/acme/widgets.git");
    }

    #[test]
    fn missing_fields_yield_none_rather_than_panicking() {
        let body = json!({"ref": "refs/heads/main"});
        assert!(parse_push(ProviderKind::GitHub, &body).is_none());
    }

    #[test]
    fn gitlab_merge_request_open_action_maps_to_opened() {
        let body = json!({
            "object_attributes": {"action": "open", "iid": 42, "target_branch": "main"},
            "project": {"git_http_url": "https://gitlab.com/acme/widgets.git"},
        });
        let event = parse_pull_request(ProviderKind::GitLab, &body).unwrap();
        assert_eq!(event.action, "opened");
        assert_eq!(event.pr_id, 42);
        assert!(event.is_relevant());
    }

    #[test]
    fn irrelevant_action_is_not_relevant() {
        let event = PullRequestEvent { repository_url: "x".into(), base_branch: "main".into(), pr_id: 1, action: "closed".into() };
        assert!(!event.is_relevant());
    }
}
