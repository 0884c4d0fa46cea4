//! CareerPath CLI - sign in, manage your member role and view your dashboard.

mod app;
mod commands;
mod output;
mod views;

use clap::{Parser, Subcommand};
use identity_provider::SocialProvider;
use member_types::RoleTag;
use std::path::PathBuf;

/// CareerPath CLI - member sign-in and dashboard.
#[derive(Parser)]
#[command(name = "careerpath")]
#[command(about = "CareerPath CLI for member sign-in, roles and the member dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory holding config.json, session.json and logs (default ~/.careerpath)
    #[arg(long, global = true, env = "CAREERPATH_HOME")]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login,

    /// Create an account and choose a member role
    Signup {
        /// Member role (school, college, professional)
        #[arg(short, long)]
        role: Option<RoleTag>,
        /// Full name shown on your profile
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Sign in through Google or Facebook
    Social {
        /// Provider (google, facebook)
        provider: SocialProvider,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show who is signed in and with which role
    Status,

    /// Show the member dashboard
    Profile,

    /// Show or change your member role
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// Print session changes, including those from other terminals, until interrupted
    Watch,
}

#[derive(Subcommand)]
enum RoleCommands {
    /// Show the current role
    Show,
    /// Save a new role
    Set {
        /// Member role (school, college, professional)
        role: RoleTag,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app = match app::App::start(cli.base_dir.clone(), cli.log_level.as_deref()).await {
        Ok(app) => app,
        Err(e) => {
            output::print_error(&format!("{:#}", e), &cli.format);
            std::process::exit(1);
        }
    };

    let format = &cli.format;
    let result = match cli.command {
        Commands::Login => commands::login(&app, format).await,
        Commands::Signup { role, name } => {
            commands::signup(&app, role, name.as_deref(), format).await
        }
        Commands::Social { provider } => commands::social(&app, provider, format).await,
        Commands::Logout => commands::logout(&app, format).await,
        Commands::Status => commands::status(&app, format).await,
        Commands::Profile => commands::profile(&app, format).await,
        Commands::Role { command } => match command {
            RoleCommands::Show => commands::role_show(&app, format).await,
            RoleCommands::Set { role } => commands::role_set(&app, role, format).await,
        },
        Commands::Watch => commands::watch(&app, format).await,
    };

    app.shutdown();

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e), format);
        std::process::exit(1);
    }
}
