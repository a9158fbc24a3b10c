//! Plain-text rendering for terminal output.

use std::fmt::Write;

use modguard_core::analysis::AnalysisResult;
use modguard_core::badge::{render_flag, render_status, score_bar_class};
use modguard_core::request::{Flag, Flags, ModerationRequest};
use modguard_core::stats::{recent_requests, RequestStats};
use modguard_core::status::derive_status;
use modguard_events::Notification;
use modguard_review::{RequestDetail, Session};

const PREVIEW_CHARS: usize = 60;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn flag_badge(flag: &Flag, show_score: bool) -> String {
    let badge = render_flag(flag, show_score);
    let mark = if flag.flagged { "*" } else { "" };
    match badge.score_text {
        Some(score) => format!("{}{mark} {score}", badge.label),
        None => format!("{}{mark}", badge.label),
    }
}

fn flag_badges(request: &ModerationRequest) -> String {
    match &request.flags {
        Some(Flags::External(raw)) => format!("external {raw}"),
        Some(flags) if !flags.is_empty() => flags
            .iter()
            .map(|f| flag_badge(f, false))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}

/// One table line per request.
pub fn request_row(request: &ModerationRequest) -> String {
    format!(
        "{:<38} {:<10} {:<5} {}  [{}]  {}",
        request.id,
        render_status(&request.status).label,
        request.content_type,
        request.timestamp.format(TIMESTAMP_FORMAT),
        flag_badges(request),
        preview(&request.content),
    )
}

pub fn request_table(requests: &[&ModerationRequest], search_term: &str) -> String {
    if requests.is_empty() {
        return if search_term.is_empty() {
            "No moderation requests found.".to_string()
        } else {
            format!("No moderation requests match '{search_term}'.")
        };
    }
    requests
        .iter()
        .map(|r| request_row(r))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn request_detail(detail: &RequestDetail) -> String {
    let request = detail.current();
    let mut out = String::new();
    let _ = writeln!(out, "Request {}", request.id);
    let _ = writeln!(
        out,
        "  Status:    {}{}",
        render_status(&request.status).label,
        status_note(request)
    );
    let _ = writeln!(out, "  Type:      {}", request.content_type.label());
    let _ = writeln!(out, "  Received:  {}", request.timestamp.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "  Content:   {}", request.content);
    let _ = writeln!(out, "  Flags:");
    match &request.flags {
        Some(Flags::External(raw)) => {
            let _ = writeln!(out, "    external {raw}");
        }
        Some(flags) if !flags.is_empty() => {
            for flag in flags.iter() {
                let _ = writeln!(out, "    {}", flag_badge(flag, true));
            }
        }
        _ => {
            let _ = writeln!(out, "    none");
        }
    }
    let _ = write!(out, "  Feedback:  {}", detail.feedback_display());
    out
}

/// Saving a review rewrites the status from the flags; say so up front.
fn status_note(request: &ModerationRequest) -> String {
    let flags = request.flags.as_ref();
    if !request.status.is_reviewer_derivable() {
        format!(" (set externally, a review saves {})", derive_status(flags))
    } else if request.status.drifts_from(flags) {
        format!(" (flags imply {})", derive_status(flags))
    } else {
        String::new()
    }
}

fn bar_level(flag: &Flag, threshold: f64) -> &'static str {
    match score_bar_class(flag, threshold) {
        "bg-destructive" => "flagged",
        "bg-amber-500" => "near threshold",
        _ => "ok",
    }
}

pub fn analysis(result: &AnalysisResult, threshold: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Verdict: {}", render_status(&result.status).label);
    let _ = writeln!(out, "{}", result.summary);
    for flag in &result.flags {
        let _ = writeln!(out, "  {:<24} {}", flag_badge(flag, true), bar_level(flag, threshold));
    }
    out.trim_end().to_string()
}

pub fn stats(stats: &RequestStats, requests: &[ModerationRequest], recent: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total:      {}", stats.total);
    let _ = writeln!(
        out,
        "Flagged:    {} ({:.1}%)",
        stats.flagged,
        stats.flag_rate() * 100.0
    );
    let _ = writeln!(out, "Clean:      {}", stats.clean);
    let _ = writeln!(out, "Borderline: {}", stats.borderline);
    if stats.external > 0 {
        let _ = writeln!(out, "Other:      {}", stats.external);
    }

    let distribution = stats.distribution_percentages();
    if !distribution.is_empty() {
        let _ = writeln!(out, "Flag distribution:");
        for (kind, percent) in distribution {
            let _ = writeln!(out, "  {:<15} {percent}%", kind.label());
        }
    }

    let latest = recent_requests(requests, recent);
    if !latest.is_empty() {
        let _ = writeln!(out, "Recent:");
        for request in latest {
            let _ = writeln!(out, "  {}", request_row(request));
        }
    }
    out.trim_end().to_string()
}

pub fn session(session: &Session) -> String {
    format!(
        "{} <{}> ({}, plan {:?})",
        session.user.name, session.user.email, session.user.id, session.user.plan
    )
}

pub fn notification(notification: &Notification) -> String {
    let prefix = if notification.is_destructive() { "error" } else { "note" };
    format!("[{prefix}] {}: {}", notification.title, notification.description)
}
