//! Keyword heuristics for ad-hoc content analysis.
//!
//! Produces a provisional verdict for a piece of text or an image reference
//! so that it can be recorded as a new moderation request. This is a local
//! stand-in for the hosted classifier and is fully deterministic.

use chrono::Utc;

use crate::error::CoreError;
use crate::request::{ContentType, Flag, FlagType, Flags, NewModerationRequest, RequestStatus};
use crate::status::derive_status;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Default sensitivity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

const OFFENSIVE_TERMS: &[&str] = &["idiot", "stupid", "hate"];
const PROFANITY_TERMS: &[&str] = &["fuck", "shit", "damn"];
const VIOLENCE_TERMS: &[&str] = &["kill", "die", "hurt"];
const SPAM_TERMS: &[&str] = &["buy now", "click here", "www."];

const TOXICITY_HIT_SCORE: f64 = 0.85;
const HARASSMENT_HIT_SCORE: f64 = 0.78;
const VIOLENCE_HIT_SCORE: f64 = 0.82;
const SPAM_HIT_SCORE: f64 = 0.9;

/// Score assigned to a category with no matching terms.
const BASELINE_SCORE: f64 = 0.05;

/// Highest threshold at which each category still raises its flag.
const HARASSMENT_MAX_THRESHOLD: f64 = 0.8;
const VIOLENCE_MAX_THRESHOLD: f64 = 0.85;
const SPAM_MAX_THRESHOLD: f64 = 0.95;

/* --------------------------------------------------------------------------
Results
-------------------------------------------------------------------------- */

/// Verdict for one analyzed item.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub status: RequestStatus,
    pub flags: Vec<Flag>,
    pub summary: String,
}

impl AnalysisResult {
    fn from_flags(flags: Vec<Flag>, summary: String) -> Self {
        let status = derive_status(Some(&Flags::Many(flags.clone())));
        Self {
            status,
            flags,
            summary,
        }
    }

    /// Build the insert payload recording this verdict.
    pub fn into_new_request(
        self,
        content_type: ContentType,
        content: impl Into<String>,
    ) -> NewModerationRequest {
        NewModerationRequest {
            timestamp: Utc::now(),
            content_type,
            content: content.into(),
            flags: Some(Flags::Many(self.flags)),
            status: self.status,
            feedback: None,
        }
    }
}

/* --------------------------------------------------------------------------
Analysis
-------------------------------------------------------------------------- */

/// Validate that a threshold lies in `[0, 1]`.
pub fn validate_threshold(threshold: f64) -> Result<(), CoreError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Threshold {threshold} must be between 0 and 1"
        )))
    }
}

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

fn scored(kind: FlagType, hit: bool, hit_score: f64, flagged: bool) -> Flag {
    let score = if hit { hit_score } else { BASELINE_SCORE };
    Flag::new(kind, score, flagged)
}

/// Analyze a piece of text at the given sensitivity threshold.
pub fn analyze_text(text: &str, threshold: f64) -> Result<AnalysisResult, CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Text to analyze must not be empty".to_string()));
    }
    validate_threshold(threshold)?;

    let lower = text.to_lowercase();
    let offensive = contains_any(&lower, OFFENSIVE_TERMS);
    let profanity = contains_any(&lower, PROFANITY_TERMS);
    let violent = contains_any(&lower, VIOLENCE_TERMS);
    let spam = contains_any(&lower, SPAM_TERMS);

    let flags = vec![
        scored(FlagType::Toxicity, offensive, TOXICITY_HIT_SCORE, offensive),
        scored(
            FlagType::Harassment,
            offensive,
            HARASSMENT_HIT_SCORE,
            offensive && threshold <= HARASSMENT_MAX_THRESHOLD,
        ),
        scored(FlagType::HateSpeech, false, 0.0, false),
        scored(
            FlagType::Violence,
            violent,
            VIOLENCE_HIT_SCORE,
            violent && threshold <= VIOLENCE_MAX_THRESHOLD,
        ),
        scored(
            FlagType::Spam,
            spam,
            SPAM_HIT_SCORE,
            spam && threshold <= SPAM_MAX_THRESHOLD,
        ),
    ];

    let any_flagged = flags.iter().any(|f| f.flagged);
    let summary = if any_flagged {
        summarize(profanity, offensive, violent, spam)
    } else {
        "Content appears to be clean.".to_string()
    };

    Ok(AnalysisResult::from_flags(flags, summary))
}

fn summarize(profanity: bool, offensive: bool, violent: bool, spam: bool) -> String {
    let traits: Vec<&str> = [
        (profanity, "contains profanity"),
        (offensive, "may be offensive or toxic"),
        (violent, "contains violent language"),
        (spam, "appears to be spam"),
    ]
    .into_iter()
    .filter_map(|(hit, phrase)| hit.then_some(phrase))
    .collect();

    format!("Content {}.", traits.join(" and "))
}

/// Analyze an image reference. Image scoring is not backed by a model, so
/// every image receives the same low scores.
pub fn analyze_image(reference: &str) -> Result<AnalysisResult, CoreError> {
    if reference.trim().is_empty() {
        return Err(CoreError::Validation("Image reference must not be empty".to_string()));
    }

    let flags = vec![
        Flag::new(FlagType::Sexual, 0.15, false),
        Flag::new(FlagType::Violence, 0.08, false),
    ];
    Ok(AnalysisResult::from_flags(
        flags,
        "Image appears to be appropriate.".to_string(),
    ))
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn flag(result: &AnalysisResult, kind: FlagType) -> &Flag {
        result.flags.iter().find(|f| f.kind == kind).unwrap()
    }

    #[test]
    fn clean_text_is_clean() {
        let result = analyze_text("Have a lovely afternoon", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(result.status, RequestStatus::Clean);
        assert_eq!(result.summary, "Content appears to be clean.");
        assert!(result.flags.iter().all(|f| !f.flagged));
    }

    #[test]
    fn offensive_text_raises_toxicity_and_harassment() {
        let result = analyze_text("You are an IDIOT", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(result.status, RequestStatus::Flagged);
        assert!(flag(&result, FlagType::Toxicity).flagged);
        assert!(flag(&result, FlagType::Harassment).flagged);
        assert_eq!(flag(&result, FlagType::Toxicity).score, 0.85);
        assert_eq!(result.summary, "Content may be offensive or toxic.");
    }

    #[test]
    fn high_threshold_suppresses_harassment() {
        let result = analyze_text("stupid", 0.9).unwrap();
        assert!(flag(&result, FlagType::Toxicity).flagged);
        assert!(!flag(&result, FlagType::Harassment).flagged);
        assert_eq!(flag(&result, FlagType::Harassment).score, 0.78);
    }

    #[test]
    fn summary_joins_detected_traits() {
        let result = analyze_text("damn, I will hurt you. click here", 0.5).unwrap();
        assert_eq!(
            result.summary,
            "Content contains profanity and contains violent language and appears to be spam."
        );
    }

    #[test]
    fn hate_speech_is_never_flagged() {
        let result = analyze_text("hate hate hate", 0.0).unwrap();
        assert!(!flag(&result, FlagType::HateSpeech).flagged);
    }

    #[test]
    fn blank_text_and_bad_threshold_are_rejected() {
        assert_matches!(analyze_text("   ", 0.5), Err(CoreError::Validation(_)));
        assert_matches!(analyze_text("hello", 1.2), Err(CoreError::Validation(_)));
    }

    #[test]
    fn image_analysis_is_clean() {
        let result = analyze_image("cat.png").unwrap();
        assert_eq!(result.status, RequestStatus::Clean);
        assert_eq!(result.flags.len(), 2);
        assert_matches!(analyze_image(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn result_becomes_valid_insert_payload() {
        let result = analyze_text("buy now", DEFAULT_THRESHOLD).unwrap();
        let new = result.into_new_request(ContentType::Text, "buy now");
        assert_eq!(new.status, RequestStatus::Flagged);
        assert!(new.validate().is_ok());
    }
}
