//! Almond CLI
//!
//! Command-line front end for the Almond session:
//! - Log in and out, register, refresh tokens
//! - Start and end today's work
//! - Show today's and this week's tracked time

use almond::api::{ApiClient, Credentials, Registration};
use almond::config::{generate_default_config, Config};
use almond::session::{Navigation, SessionState, SessionStore, WorkRecord, WorkSession};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "almond")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Work-time tracking client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the issued tokens
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        username: String,
        #[arg(short, long)]
        password: String,
        /// Extra fields in key=value format
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
    },

    /// Forget the stored tokens
    Logout,

    /// Exchange the stored refresh token for a new access token
    Refresh {
        /// Path the user is currently on
        #[arg(long, default_value = "/")]
        path: String,
    },

    /// Fetch the current user's profile
    User,

    /// Fetch today's work record
    Today,

    /// Fetch this week's work record
    Week,

    /// Start today's work
    Start,

    /// End today's work
    End,

    /// Show the stored session
    Status,

    /// Drop the stored session entirely
    Reset,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)?;
                println!("Wrote default config to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    almond::logging::init(&config.logging);
    tracing::debug!(base_url = %config.api.base_url, "Almond v{}", env!("CARGO_PKG_VERSION"));

    let store = SessionStore::open(config.storage.open(), &config.storage.namespace);
    let session = WorkSession::new(ApiClient::from_config(&config.api)?, store);

    match cli.command {
        Commands::Login { username, password } => {
            let nav = session
                .login(&Credentials::new(username.as_str(), password))
                .await?;
            println!("Logged in as {}", username);
            report_navigation(Some(nav));
        }

        Commands::Register {
            username,
            password,
            fields,
        } => {
            let mut details = Registration::new(username.as_str(), password);
            for field in &fields {
                let (key, value) = parse_field(field)?;
                details = details.field(key, value);
            }

            let nav = session.register(&details).await?;
            println!("Registered {}", username);
            report_navigation(Some(nav));
        }

        Commands::Logout => {
            session.logout().await?;
            println!("Logged out");
        }

        Commands::Refresh { path } => {
            let nav = session.refresh_stored_token(&path).await?;
            if session.store().is_authenticated().await {
                println!("Session refreshed");
            } else {
                println!("Session expired");
            }
            report_navigation(nav);
        }

        Commands::User => {
            let user = session.get_user().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }

        Commands::Today => {
            let record = session.get_daily_work().await?;
            print_record("Today", &record, cli.format)?;
        }

        Commands::Week => {
            let record = session.get_weekly_work().await?;
            print_record("This week", &record, cli.format)?;
        }

        Commands::Start => {
            let record = session.start_work().await?;
            print_record("Started, today", &record, cli.format)?;
        }

        Commands::End => {
            let record = session.end_work().await?;
            print_record("Ended, today", &record, cli.format)?;
        }

        Commands::Status => {
            let state = session.store().snapshot().await;
            print_status(&state, cli.format)?;
        }

        Commands::Reset => {
            session.store().reset().await?;
            println!("Session cleared");
        }

        Commands::Config { .. } => unreachable!("handled before the session is opened"),
    }

    Ok(())
}

/// Split a `key=value` argument
fn parse_field(field: &str) -> Result<(&str, &str), String> {
    field
        .split_once('=')
        .ok_or_else(|| format!("Invalid field (expected key=value): {}", field))
}

fn report_navigation(nav: Option<Navigation>) {
    match nav {
        Some(Navigation::Push(route)) => println!("-> {}", route),
        Some(Navigation::Replace(route)) => println!("-> {} (replace)", route),
        None => {}
    }
}

fn print_record(
    label: &str,
    record: &WorkRecord,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => println!("{}: {}", label, record.work_time()),
    }
    Ok(())
}

fn print_status(state: &SessionState, format: OutputFormat) -> Result<(), serde_json::Error> {
    if format == OutputFormat::Json {
        let mut value = serde_json::to_value(state)?;
        // Never echo credentials
        value["token"] = serde_json::json!({
            "access": mask(&state.token.access),
            "refresh": mask(&state.token.refresh),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "Authenticated: {}",
        if state.is_authenticated { "yes" } else { "no" }
    );
    if let Some(username) = state.user.get_str("username") {
        println!("User:          {}", username);
    }
    println!("Access token:  {}", mask(&state.token.access));
    println!("Today:         {}", state.daily_work.work_time());
    println!("This week:     {}", state.weekly_work.work_time());
    Ok(())
}

fn mask(token: &str) -> String {
    if token.is_empty() {
        "(none)".to_string()
    } else {
        let head: String = token.chars().take(6).collect();
        format!("{}...", head)
    }
}
