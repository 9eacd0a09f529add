//! `bug-buddy issues` command.

use std::fmt::Write as _;

use crate::context::ServiceContext;
use crate::error::BugBuddyError;
use crate::issue::Issue;
use crate::ports::FetchedIssues;
use crate::tracker::TrackerKind;

/// Execute the `issues` command.
///
/// Lists the issues of `project_id` on the selected tracker, optionally
/// narrowed to a single project-scoped `iid`.
///
/// # Errors
///
/// Returns an error string if no usable tracker is selected or the request fails.
pub fn run_with_context(
    ctx: &ServiceContext,
    project_id: u64,
    iid: Option<u64>,
    raw: bool,
    (gitlab, github): (bool, bool),
) -> Result<(), String> {
    let tracker = TrackerKind::from_flags(gitlab, github).map_err(|e| e.to_string())?;
    let client = ctx
        .remote_client(tracker)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| BugBuddyError::NoTrackerConfigured.to_string())?;

    let fetched = client.get_issues(project_id, iid, !raw).map_err(|e| e.to_string())?;
    print!("{}", render(&fetched)?);
    Ok(())
}

/// Renders fetched issues for the terminal.
///
/// # Errors
///
/// Returns an error string if raw payloads cannot be serialized.
pub fn render(fetched: &FetchedIssues) -> Result<String, String> {
    match fetched {
        FetchedIssues::Normalized(issues) if issues.is_empty() => Ok("No issues found.\n".into()),
        FetchedIssues::Normalized(issues) => {
            let mut out = String::new();
            for issue in issues {
                let _ = writeln!(out, "{}", summary_line(issue));
            }
            Ok(out)
        }
        FetchedIssues::Raw(items) => serde_json::to_string_pretty(items)
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("Failed to render issues: {e}")),
    }
}

fn summary_line(issue: &Issue) -> String {
    format!("#{} [{}] {} ({})", issue.id(), issue.state(), issue.title(), issue.labels().join(", "))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::BugBuddyConfig;

    fn issue(id: u64, labels: &[&str]) -> Issue {
        Issue::from_raw(&json!({
            "id": id,
            "title": format!("BugBuddy-{id}"),
            "state": "opened",
            "project_id": 123,
            "author": {"name": "Jane Doe", "username": "jdoe", "state": "active"},
            "created_at": "2024-01-02T03:04:05.000Z",
            "updated_at": "2024-01-02T03:04:05.000Z",
            "description": "### Traceback",
            "labels": labels,
        }))
        .unwrap()
    }

    #[test]
    fn renders_one_line_per_issue() {
        let fetched = FetchedIssues::Normalized(vec![
            issue(7, &["ValueError", "BugBuddy"]),
            issue(8, &[]),
        ]);
        let out = render(&fetched).unwrap();
        assert_eq!(
            out,
            "#7 [opened] BugBuddy-7 (ValueError, BugBuddy)\n#8 [opened] BugBuddy-8 ()\n"
        );
    }

    #[test]
    fn renders_empty_listing() {
        let out = render(&FetchedIssues::Normalized(Vec::new())).unwrap();
        assert_eq!(out, "No issues found.\n");
    }

    #[test]
    fn renders_raw_payloads_as_json() {
        let out = render(&FetchedIssues::Raw(vec![json!({"id": 1, "web_url": "u"})])).unwrap();
        assert!(out.starts_with("[\n"));
        assert!(out.contains("\"web_url\": \"u\""));
    }

    #[test]
    fn github_is_not_usable() {
        let ctx = ServiceContext::with_config(BugBuddyConfig::default());
        let err = run_with_context(&ctx, 1, None, false, (false, true)).unwrap_err();
        assert!(err.contains("No remote issue tracker"), "unexpected error: {err}");
    }

    #[test]
    fn both_trackers_are_rejected() {
        let ctx = ServiceContext::with_config(BugBuddyConfig::default());
        assert!(run_with_context(&ctx, 1, None, false, (true, true)).is_err());
    }
}
