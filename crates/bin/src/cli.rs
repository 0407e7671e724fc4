//! CLI argument definitions for the ScholarAI binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use scholarai::{config::Provider, local_store::Theme};

/// Hosted LLM provider
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProviderArg {
    /// Google GenAI
    Google,
    /// OpenRouter (OpenAI-compatible)
    Openrouter,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Google => Provider::Google,
            ProviderArg::Openrouter => Provider::OpenRouter,
        }
    }
}

/// UI theme
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

/// ScholarAI tutoring backend
#[derive(Parser, Debug)]
#[command(name = "scholarai")]
#[command(about = "ScholarAI: AI study coach backend and client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ScholarAI HTTP server
    Serve(ServeArgs),
    /// Check health of a running ScholarAI server
    Health(HealthArgs),
    /// Run a tutoring operation through the server
    Ask(AskArgs),
    /// Manage the locally stored fallback API key
    Key(KeyArgs),
    /// Manage the local student profile
    Profile(ProfileArgs),
    /// Show or change the UI theme
    Theme(ThemeArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "SCHOLARAI_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "SCHOLARAI_HOST")]
    pub host: String,

    /// LLM provider to route requests to
    #[arg(long, default_value = "google", env = "SCHOLARAI_PROVIDER")]
    pub provider: ProviderArg,

    /// Override the provider's base URL
    #[arg(long, env = "SCHOLARAI_PROVIDER_URL")]
    pub provider_url: Option<String>,

    /// Override the fast-tier model
    #[arg(long, env = "SCHOLARAI_FAST_MODEL")]
    pub fast_model: Option<String>,

    /// Override the reasoning-tier model
    #[arg(long, env = "SCHOLARAI_REASONING_MODEL")]
    pub reasoning_model: Option<String>,

    /// Attempts per request, including the first
    #[arg(long, default_value_t = 3, env = "SCHOLARAI_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[arg(long, default_value_t = 1000, env = "SCHOLARAI_BACKOFF_MS")]
    pub backoff_ms: u64,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "SCHOLARAI_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Where local state lives
#[derive(clap::Args, Debug)]
pub struct DataDirArgs {
    /// Data directory holding scholarai.json
    #[arg(short = 'D', long, env = "SCHOLARAI_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl DataDirArgs {
    pub fn dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Arguments for the ask command
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// Operation endpoint of the server
    #[arg(
        long,
        default_value = "http://127.0.0.1:3000/api/gemini",
        env = "SCHOLARAI_ENDPOINT"
    )]
    pub endpoint: String,

    /// Provider base URL used when calling the provider directly
    #[arg(long, env = "SCHOLARAI_PROVIDER_URL")]
    pub provider_url: Option<String>,

    /// Print raw JSON instead of formatted text
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub data: DataDirArgs,

    #[command(subcommand)]
    pub operation: AskCommand,
}

#[derive(Subcommand, Debug)]
pub enum AskCommand {
    /// Talk to the study coach (interactive when no message is given)
    Chat {
        /// Single message to send
        message: Option<String>,
    },
    /// Generate exam-ready notes
    Notes { topic: String },
    /// Solve a doubt, optionally with a picture of the problem
    Doubt {
        /// The question
        #[arg(default_value = "")]
        doubt: String,
        /// Image file (PNG, JPEG, GIF or WebP)
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Take a multiple-choice quiz
    Quiz {
        topic: String,
        #[arg(long, default_value = "Medium")]
        difficulty: String,
        /// Print the questions instead of running the quiz
        #[arg(long)]
        print: bool,
    },
    /// Career guidance based on the stored profile
    Career { query: String },
    /// Weekly study timetable
    Plan {
        #[arg(long)]
        subjects: String,
        #[arg(long)]
        hours: String,
        /// Exam date, ideally YYYY-MM-DD
        #[arg(long)]
        exam_date: String,
        #[arg(long, default_value = "")]
        weak_areas: String,
    },
}

/// Arguments for the key command
#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub data: DataDirArgs,

    #[command(subcommand)]
    pub action: KeyAction,
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Store a key for direct provider calls
    Set {
        #[arg(long, default_value = "google")]
        provider: ProviderArg,
        key: String,
    },
    /// Remove the stored key
    Clear,
    /// Show which provider the stored key is for
    Show,
}

/// Arguments for the profile command
#[derive(clap::Args, Debug)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub data: DataDirArgs,

    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Create or replace the profile
    Set {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        grade: String,
        /// Science, Commerce, Arts or General
        #[arg(long)]
        stream: Option<String>,
        /// Competitive exams being prepared for (repeatable)
        #[arg(long = "exam")]
        exams: Vec<String>,
    },
    /// Print the profile
    Show,
    /// Delete the profile
    Clear,
}

/// Arguments for the theme command
#[derive(clap::Args, Debug)]
pub struct ThemeArgs {
    #[command(flatten)]
    pub data: DataDirArgs,

    /// Theme to switch to; shows the current one when omitted
    #[arg(conflicts_with = "toggle")]
    pub theme: Option<ThemeArg>,

    /// Switch between light and dark
    #[arg(long)]
    pub toggle: bool,
}
