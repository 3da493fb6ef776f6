use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use moodlog::app::ADMIN_ROLE;
use moodlog::config::ConfigError;
use moodlog::net::types::{JournalEntry, ProfileUpdate, Sentiment, User, sentiment_color};
use moodlog::state::navigation::Route;
use moodlog::util::guard::Navigation;
use moodlog::{ApiError, ClientConfig, MoodLog, ProfileOutcome};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("missing password; pass --password or set MOODLOG_PASSWORD")]
    MissingPassword,
    #[error("unknown mood `{0}`; expected happy, sad, angry or anxious")]
    InvalidMood(String),
    #[error("not available here; redirected to {0}")]
    Redirected(Route),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(error) => error.error_code(),
            Self::Api(error) => error.error_code(),
            Self::MissingPassword => "E_MISSING_PASSWORD",
            Self::InvalidMood(_) => "E_INVALID_MOOD",
            Self::Redirected(_) => "E_REDIRECTED",
            Self::InvalidJson(_) => "E_INVALID_JSON",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "moodlog", about = "Mood journal client")]
struct Cli {
    #[arg(long, env = "MOODLOG_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "MOODLOG_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify credentials and persist the session.
    Login {
        user_name: String,
        #[arg(long, env = "MOODLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    Register {
        user_name: String,
        #[arg(long, env = "MOODLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Dashboard,
    Journal(JournalCommand),
    Profile(ProfileCommand),
    Admin(AdminCommand),
    /// Print the view the route guard resolves for a path.
    Open { path: String },
}

#[derive(Args, Debug)]
struct JournalCommand {
    #[command(subcommand)]
    command: JournalSubcommand,
}

#[derive(Subcommand, Debug)]
enum JournalSubcommand {
    List {
        /// Only entries whose title or content contains this, ignoring case.
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: String,
    },
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        mood: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        mood: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Update {
        #[arg(long)]
        user_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm_password: Option<String>,
    },
    Delete,
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Users,
    CreateAdmin {
        user_name: String,
        #[arg(long, env = "MOODLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = false)]
        no_sentiment_analysis: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error [{}]: {error}", error.error_code());
            if matches!(error, CliError::Api(ApiError::Unauthorized)) {
                eprintln!("run `moodlog login <user>` to sign in again");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let app = MoodLog::new(&config)?;

    match cli.command {
        Command::Login { user_name, password } => {
            let password = password.ok_or(CliError::MissingPassword)?;
            let user = app.login(&user_name, &password).await?;
            print_json(&user)
        }
        Command::Logout => {
            if app.logout() {
                println!("logged out");
            } else {
                println!("not signed in");
            }
            Ok(())
        }
        Command::Whoami => {
            match app.session().current_user() {
                Some(user) => print_json(&user)?,
                None => println!("not signed in"),
            }
            Ok(())
        }
        Command::Register { user_name, password, email } => {
            enter(&app, &Route::Register)?;
            let user = User { user_name, password, email, ..User::default() };
            app.register(&user).await?;
            println!("registered {}", user.user_name);
            Ok(())
        }
        Command::Dashboard => {
            enter(&app, &Route::Dashboard)?;
            let dashboard = app.dashboard().await?;
            println!("{}", dashboard.greeting);
            print_entries(&dashboard.recent);
            Ok(())
        }
        Command::Journal(journal) => run_journal(&app, journal).await,
        Command::Profile(profile) => run_profile(&app, profile).await,
        Command::Admin(admin) => run_admin(&app, admin).await,
        Command::Open { path } => {
            match app.open(&path) {
                Navigation::Render(route) => println!("render {route}"),
                Navigation::Redirect(route) => println!("redirect {route}"),
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    Ok(ClientConfig::from_env_with(cli.api_url.as_deref(), cli.session_dir.clone())?)
}

/// Run the guard for `route`; anything but a render aborts the command.
fn enter(app: &MoodLog, route: &Route) -> Result<(), CliError> {
    match app.open_route(route) {
        Navigation::Render(_) => Ok(()),
        Navigation::Redirect(target) => Err(CliError::Redirected(target)),
    }
}

async fn run_journal(app: &MoodLog, journal: JournalCommand) -> Result<(), CliError> {
    match journal.command {
        JournalSubcommand::List { search } => {
            enter(app, &Route::Journals)?;
            let entries = match search {
                Some(term) => app.search_entries(&term).await?,
                None => app.entries().await?,
            };
            print_entries(&entries);
            Ok(())
        }
        JournalSubcommand::Show { id } => {
            enter(app, &Route::JournalEdit(id.clone()))?;
            print_json(&app.entry(&id).await?)
        }
        JournalSubcommand::New { title, content, mood } => {
            enter(app, &Route::JournalNew)?;
            let entry = JournalEntry { title, content, sentiment: parse_mood(mood)?, ..JournalEntry::default() };
            print_json(&app.create_entry(&entry).await?)
        }
        JournalSubcommand::Edit { id, title, content, mood } => {
            enter(app, &Route::JournalEdit(id.clone()))?;
            let mut entry = app.entry(&id).await?;
            if let Some(title) = title {
                entry.title = title;
            }
            if let Some(content) = content {
                entry.content = content;
            }
            if mood.is_some() {
                entry.sentiment = parse_mood(mood)?;
            }
            print_json(&app.update_entry(&id, &entry).await?)
        }
        JournalSubcommand::Delete { id } => {
            enter(app, &Route::Journals)?;
            app.delete_entry(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_profile(app: &MoodLog, profile: ProfileCommand) -> Result<(), CliError> {
    enter(app, &Route::Profile)?;
    match profile.command {
        ProfileSubcommand::Update { user_name, email, password, confirm_password } => {
            let current = app.session().current_user().ok_or(ApiError::NotSignedIn)?;
            let update = ProfileUpdate {
                user_name: user_name.unwrap_or(current.user_name),
                email: email.or(current.email),
                password,
                confirm_password,
            };
            match app.update_profile(&update).await? {
                ProfileOutcome::Applied(user) => print_json(&user),
                ProfileOutcome::ReloginRequired => {
                    println!("profile updated; log in again with the new credentials");
                    Ok(())
                }
            }
        }
        ProfileSubcommand::Delete => {
            app.delete_account().await?;
            println!("account deleted");
            Ok(())
        }
    }
}

async fn run_admin(app: &MoodLog, admin: AdminCommand) -> Result<(), CliError> {
    enter(app, &Route::Admin)?;
    match admin.command {
        AdminSubcommand::Users => {
            for user in app.users().await? {
                let kind = if user.has_role(ADMIN_ROLE) { "admin" } else { "user" };
                println!("{}\t{}\t{kind}", user.user_name, user.email.as_deref().unwrap_or_default());
            }
            Ok(())
        }
        AdminSubcommand::CreateAdmin { user_name, password, email, no_sentiment_analysis } => {
            let user = User {
                user_name,
                password: Some(password.ok_or(CliError::MissingPassword)?),
                email,
                sentiment_analysis: Some(!no_sentiment_analysis),
                ..User::default()
            };
            app.create_admin(&user).await?;
            println!("created admin {}", user.user_name);
            Ok(())
        }
    }
}

fn parse_mood(raw: Option<String>) -> Result<Option<Sentiment>, CliError> {
    match raw {
        None => Ok(None),
        Some(raw) => Sentiment::parse(&raw).map(Some).ok_or(CliError::InvalidMood(raw)),
    }
}

fn print_entries(entries: &[JournalEntry]) {
    for entry in entries {
        let mood = entry.sentiment.map_or("-", Sentiment::label);
        println!(
            "{}\t{}\t{mood} ({})\t{}",
            entry.id.as_deref().unwrap_or("-"),
            entry.date.as_deref().unwrap_or("-"),
            sentiment_color(entry.sentiment),
            entry.title,
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
