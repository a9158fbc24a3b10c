use std::sync::Arc;

use anyhow::Context;
use modguard_core::analysis::{analyze_image, analyze_text};
use modguard_core::request::ContentType;
use modguard_core::stats::RequestStats;
use modguard_events::NotificationBus;
use modguard_review::{ReviewError, ReviewWorkspace, SessionCache};
use modguard_store::StoreConfig;
use serde_json::json;

use crate::cli::{AnalyzeArgs, Cli, Command, ReviewArgs};
use crate::config::ConsoleConfig;
use crate::render;

/// A store call failed and the user was already told through a
/// notification. The binary exits non-zero without printing anything else.
#[derive(Debug, thiserror::Error)]
#[error("Request store call failed")]
pub struct Reported;

trait ReportedExt<T> {
    /// Collapse store failures into [`Reported`]; keep other errors whole.
    fn reported(self) -> anyhow::Result<T>;
}

impl<T> ReportedExt<T> for Result<T, ReviewError> {
    fn reported(self) -> anyhow::Result<T> {
        self.map_err(|e| match e {
            ReviewError::Store(_) => anyhow::Error::new(Reported),
            other => other.into(),
        })
    }
}

fn to_json(value: &impl serde::Serialize) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Build a workspace for the signed-in reviewer against the hosted store.
fn workspace(sessions: &SessionCache, bus: &Arc<NotificationBus>) -> anyhow::Result<ReviewWorkspace> {
    let session = sessions.require()?;
    let config = StoreConfig::from_env().context("Request store is not configured")?;
    let store = modguard_store::connect(config)?;
    Ok(ReviewWorkspace::new(store, bus.clone(), session))
}

pub async fn run(cli: Cli, config: &ConsoleConfig, bus: Arc<NotificationBus>) -> anyhow::Result<()> {
    let sessions = SessionCache::install(SessionCache::with_persistence(&config.session_file))?;
    sessions
        .restore()
        .with_context(|| format!("Failed to read {}", config.session_file.display()))?;
    tracing::debug!(
        session_file = %config.session_file.display(),
        authenticated = sessions.is_authenticated(),
        "Session restored"
    );

    let json = cli.json;
    let output = match cli.command {
        Command::Login { email, password } => {
            let session = sessions.login(&email, &password)?;
            format!("Signed in as {}", render::session(&session))
        }

        Command::Signup {
            name,
            email,
            password,
        } => {
            let session = sessions.signup(&name, &email, &password)?;
            format!("Welcome, {}", render::session(&session))
        }

        Command::Logout => {
            sessions.logout()?;
            "Signed out".to_string()
        }

        Command::Whoami => {
            let session = sessions.require()?;
            if json {
                to_json(&session)?
            } else {
                render::session(&session)
            }
        }

        Command::List { search } => list(&mut workspace(sessions, &bus)?, search, json).await?,

        Command::Show { id } => show(&mut workspace(sessions, &bus)?, &id, json).await?,

        Command::Review(args) => review(&mut workspace(sessions, &bus)?, args, json).await?,

        Command::Delete { id } => {
            let removed = workspace(sessions, &bus)?.delete(&id).await.reported()?;
            if json {
                to_json(&removed)?
            } else {
                format!("Deleted {}", removed.id)
            }
        }

        Command::Analyze(args) => analyze(sessions, &bus, args, json).await?,

        Command::Stats { recent } => {
            let mut ws = workspace(sessions, &bus)?;
            ws.load().await.reported()?;
            let records = ws.list().records();
            let stats = RequestStats::from_requests(records);
            if json {
                to_json(&stats)?
            } else {
                render::stats(&stats, records, recent)
            }
        }
    };

    println!("{output}");
    Ok(())
}

/// A failed load still renders: the table is simply empty.
async fn list(ws: &mut ReviewWorkspace, search: Option<String>, json: bool) -> anyhow::Result<String> {
    if ws.load().await.is_err() {
        tracing::debug!("Listing without data after a failed load");
    }
    if let Some(term) = search {
        ws.set_search_term(term);
    }

    if json {
        to_json(&ws.visible())
    } else {
        Ok(render::request_table(&ws.visible(), ws.list().search_term()))
    }
}

async fn show(ws: &mut ReviewWorkspace, id: &str, json: bool) -> anyhow::Result<String> {
    ws.load().await.reported()?;
    let detail = ws.open(id)?;
    if json {
        to_json(detail.current())
    } else {
        Ok(render::request_detail(detail))
    }
}

async fn review(ws: &mut ReviewWorkspace, args: ReviewArgs, json: bool) -> anyhow::Result<String> {
    ws.load().await.reported()?;
    ws.open(&args.id)?;
    ws.begin_edit()?;

    for kind in &args.toggles {
        ws.toggle_flag(*kind)?;
    }
    if let Some(text) = args.feedback {
        ws.set_feedback(text)?;
    } else if args.clear_feedback {
        ws.set_feedback(String::new())?;
    }

    ws.save().await.reported()?;
    match ws.detail() {
        Some(detail) if json => to_json(detail.current()),
        Some(detail) => Ok(render::request_detail(detail)),
        None => Ok(String::new()),
    }
}

async fn analyze(
    sessions: &SessionCache,
    bus: &Arc<NotificationBus>,
    args: AnalyzeArgs,
    json: bool,
) -> anyhow::Result<String> {
    let (content_type, content, result) = match (args.text, args.image) {
        (Some(text), _) => {
            let result = analyze_text(&text, args.threshold)?;
            (ContentType::Text, text, result)
        }
        (None, Some(image)) => {
            let result = analyze_image(&image)?;
            (ContentType::Image, image, result)
        }
        (None, None) => anyhow::bail!("Either --text or --image is required"),
    };

    let mut output = if json {
        let flags: Vec<_> = result
            .flags
            .iter()
            .map(|f| json!({ "type": f.kind, "score": f.score, "flagged": f.flagged }))
            .collect();
        to_json(&json!({
            "status": result.status,
            "summary": result.summary,
            "flags": flags,
        }))?
    } else {
        render::analysis(&result, args.threshold)
    };

    if args.submit {
        let record = workspace(sessions, bus)?
            .submit_analysis(result.into_new_request(content_type, content))
            .await
            .reported()?;
        if !json {
            output.push_str(&format!("\nRecorded as {}", record.id));
        }
    }
    Ok(output)
}
