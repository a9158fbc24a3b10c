//! Presentational mapping for moderation badges and status indicators.

use crate::request::{Flag, FlagType, RequestStatus};

/// Rendered badge for a moderation category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub color_class: &'static str,
    /// Rounded percentage such as `"90%"`, present only when requested.
    pub score_text: Option<String>,
}

/// Rendered status indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub indicator_class: &'static str,
}

impl FlagType {
    /// Display label, e.g. `"Hate Speech"`.
    pub fn label(&self) -> &'static str {
        match self {
            FlagType::Toxicity => "Toxicity",
            FlagType::Harassment => "Harassment",
            FlagType::HateSpeech => "Hate Speech",
            FlagType::Sexual => "Sexual Content",
            FlagType::Violence => "Violence",
            FlagType::Spam => "Spam",
        }
    }

    pub fn color_class(&self) -> &'static str {
        match self {
            FlagType::Toxicity => "bg-red-500/10 text-red-500 border-red-500/20",
            FlagType::Harassment => "bg-amber-500/10 text-amber-500 border-amber-500/20",
            FlagType::HateSpeech => "bg-purple-500/10 text-purple-500 border-purple-500/20",
            FlagType::Sexual => "bg-pink-500/10 text-pink-500 border-pink-500/20",
            FlagType::Violence => "bg-orange-500/10 text-orange-500 border-orange-500/20",
            FlagType::Spam => "bg-blue-500/10 text-blue-500 border-blue-500/20",
        }
    }
}

/// Round half up, matching `Math.round` for the non-negative scores we see.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Format a score in `[0, 1]` as a whole percentage.
pub fn format_score_percent(score: f64) -> String {
    format!("{}%", round_half_up(score * 100.0))
}

pub fn render_badge(kind: FlagType, score: f64, show_score: bool) -> Badge {
    Badge {
        label: kind.label(),
        color_class: kind.color_class(),
        score_text: show_score.then(|| format_score_percent(score)),
    }
}

/// Badge for a stored flag.
pub fn render_flag(flag: &Flag, show_score: bool) -> Badge {
    render_badge(flag.kind, flag.score, show_score)
}

/// Status indicator with a capitalized label.
pub fn render_status(status: &RequestStatus) -> StatusBadge {
    let raw = status.as_str();
    let mut chars = raw.chars();
    let label = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    let indicator_class = match status {
        RequestStatus::Flagged => "bg-destructive",
        RequestStatus::Borderline => "bg-amber-500",
        _ => "bg-green-500",
    };

    StatusBadge {
        label,
        indicator_class,
    }
}

/// Class for a flag's score bar relative to the analysis threshold.
pub fn score_bar_class(flag: &Flag, threshold: f64) -> &'static str {
    if flag.flagged {
        "bg-destructive"
    } else if flag.score > threshold * 0.8 {
        "bg-amber-500"
    } else {
        "bg-green-500"
    }
}
