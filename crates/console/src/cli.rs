use clap::{Args, Parser, Subcommand};
use modguard_core::analysis::DEFAULT_THRESHOLD;
use modguard_core::request::FlagType;

/// Review moderation requests from the terminal.
#[derive(Debug, Parser)]
#[command(name = "modguard", author, version, about)]
pub struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MODGUARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MODGUARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session.
    Logout,

    /// Show the signed-in reviewer.
    Whoami,

    /// List moderation requests.
    List {
        /// Case-insensitive filter over id, content, status and flag types.
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show one request in full.
    Show { id: String },

    /// Edit a request's flags and feedback, then save.
    Review(ReviewArgs),

    /// Permanently delete a request.
    Delete { id: String },

    /// Run the local analyzer on text or an image reference.
    Analyze(AnalyzeArgs),

    /// Dashboard counts and recent activity.
    Stats {
        /// How many recent requests to list.
        #[arg(long, default_value_t = 5)]
        recent: usize,
    },
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    pub id: String,

    /// Flip a flag's `flagged` value. Repeatable.
    #[arg(long = "toggle", value_name = "TYPE", value_parser = parse_flag_type)]
    pub toggles: Vec<FlagType>,

    /// Replace the reviewer feedback.
    #[arg(long, conflicts_with = "clear_feedback")]
    pub feedback: Option<String>,

    /// Remove any reviewer feedback.
    #[arg(long)]
    pub clear_feedback: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(long, required_unless_present = "image", conflicts_with = "image")]
    pub text: Option<String>,

    /// Image URL or file name.
    #[arg(long)]
    pub image: Option<String>,

    /// Sensitivity threshold in [0, 1].
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Record the verdict as a new moderation request.
    #[arg(long)]
    pub submit: bool,
}

fn parse_flag_type(raw: &str) -> Result<FlagType, String> {
    raw.parse().map_err(|e: modguard_core::error::CoreError| e.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("modguard").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn review_collects_repeated_toggles() {
        let cli = parse(&["review", "r1", "--toggle", "toxicity", "--toggle", "hate-speech"]).unwrap();
        assert_matches!(
            cli.command,
            Command::Review(ReviewArgs { ref id, ref toggles, feedback: None, clear_feedback: false })
                if id == "r1" && toggles == &[FlagType::Toxicity, FlagType::HateSpeech]
        );
    }

    #[test]
    fn review_rejects_unknown_flag_type() {
        assert!(parse(&["review", "r1", "--toggle", "rudeness"]).is_err());
    }

    #[test]
    fn feedback_and_clear_are_exclusive() {
        assert!(parse(&["review", "r1", "--feedback", "ok", "--clear-feedback"]).is_err());
    }

    #[test]
    fn analyze_needs_exactly_one_input() {
        assert!(parse(&["analyze"]).is_err());
        assert!(parse(&["analyze", "--text", "a", "--image", "b.png"]).is_err());

        let cli = parse(&["analyze", "--text", "hello"]).unwrap();
        assert_matches!(
            cli.command,
            Command::Analyze(AnalyzeArgs { threshold, submit: false, .. }) if threshold == DEFAULT_THRESHOLD
        );
    }

    #[test]
    fn list_search_is_optional() {
        let cli = parse(&["list", "-s", "spam", "--json"]).unwrap();
        assert!(cli.json);
        assert_matches!(cli.command, Command::List { search: Some(ref s) } if s == "spam");
    }
}
