//! Text rendering of reports and errors.

use std::fmt::Write as _;

use relaydesk_domain::{ApiError, DiagnosticReport, EnvironmentInfo};

/// Renders the environment panel.
pub fn environment(info: &EnvironmentInfo, api_url: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Environment: {}", info.kind_label());
    let _ = writeln!(out, "Platform:    {}", info.platform);
    if let Some(version) = &info.shell_version {
        let _ = writeln!(out, "Shell:       {version}");
    }
    let _ = write!(out, "API URL:     {api_url}");
    out
}

/// Renders a diagnostic outcome.
pub fn report(name: &str, report: &DiagnosticReport) -> String {
    let mut out = String::new();
    let mark = if report.success { "ok" } else { "FAILED" };
    let _ = writeln!(out, "[{mark}] {name}: {}", report.message);

    if let Some(error) = &report.error {
        out.push_str(&api_error(error));
        out.push('\n');
    }
    if let Some(details) = &report.details {
        let pretty = serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
        for line in pretty.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out.trim_end().to_string()
}

/// Renders an error with its suggestions.
pub fn api_error(error: &ApiError) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}: {}", error.kind.title(), error.user_message());
    if let Some(url) = &error.url {
        let _ = writeln!(out, "  URL: {url}");
    }
    if error.status != 0 {
        let _ = writeln!(out, "  Status: {}", error.status);
    }
    for suggestion in error.kind.suggestions() {
        let _ = writeln!(out, "  - {suggestion}");
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn shell_environment_lists_version() {
        let info = EnvironmentInfo {
            is_shell: true,
            platform: "Linux (window: main)".to_string(),
            shell_version: Some("1.0.0".to_string()),
        };

        let text = environment(&info, "http://127.0.0.1:3000/api");

        assert_eq!(
            text,
            "Environment: shell\nPlatform:    Linux (window: main)\nShell:       1.0.0\nAPI URL:     http://127.0.0.1:3000/api"
        );
    }

    #[test]
    fn passing_report_shows_details() {
        let report = DiagnosticReport::passed("Ping to API successful", Some(json!({"message": "pong"})));

        let text = super::report("ping", &report);

        assert!(text.starts_with("[ok] ping: Ping to API successful"));
        assert!(text.contains("\"message\": \"pong\""));
    }

    #[test]
    fn auth_failure_uses_auth_wording() {
        let error = ApiError::http(401, "/api/chat", None);

        let text = api_error(&error);

        assert!(text.contains("Authentication required"));
        assert!(text.contains("Status: 401"));
    }
}
