use anyhow::Result;
use clap::{Parser, Subcommand};

use club_auth::AdminCredentials;
use club_data::Session;
use club_db::Connection;

use crate::commands::{
    Announcements, Context, Events, Members, Payments, Projects, Responses, ShowHome,
    SignupMember, Whoami,
};

#[derive(Parser, Debug)]
#[clap(name = "club", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(long, env = "CLUB_DB", default_value = "members.sqlite3")]
    pub members_db: String,

    /// Email of a member or the admin username
    #[clap(long, env = "CLUB_LOGIN")]
    pub login: Option<String>,
    /// Password, or the birth date (YYYY-MM-DD) for members without one
    #[clap(long, env = "CLUB_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    #[clap(long, env = "CLUB_ADMIN_USER", default_value = "admin")]
    pub admin_user: String,
    /// Admin login is disabled unless this is set
    #[clap(long, env = "CLUB_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    #[clap(long, env = "CLUB_LOG", default_value = "warn")]
    pub log_level: String,

    /// Print results as JSON
    #[clap(long)]
    pub json: bool,
    /// Do not ask for confirmation
    #[clap(short, long)]
    pub yes: bool,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn admin(&self) -> AdminCredentials {
        AdminCredentials::new(&self.admin_user, self.admin_password.as_deref())
    }

    /// Log in with the configured credentials. Without
    /// a login the session is anonymous.
    pub async fn session(&self, db: &Connection) -> Result<Session> {
        let Some(login) = &self.login else {
            return Ok(Session::Anonymous);
        };
        let secret = self.secret.clone().unwrap_or_default();
        let session = club_auth::login(db, &self.admin(), login, &secret).await?;
        Ok(session)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show member counts and upcoming events
    #[clap(name = "home")]
    Home(ShowHome),
    /// Show the current session and what it may do
    #[clap(name = "whoami")]
    Whoami(Whoami),
    /// Register yourself as a new member
    #[clap(name = "signup")]
    Signup(SignupMember),

    #[clap(subcommand)]
    Members(Members),
    #[clap(subcommand)]
    Payments(Payments),
    #[clap(subcommand)]
    Events(Events),
    #[clap(subcommand)]
    Projects(Projects),
    #[clap(subcommand)]
    Responses(Responses),
    #[clap(subcommand)]
    Announcements(Announcements),
}

impl Command {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Command::Home(cmd) => cmd.run(ctx).await,
            Command::Whoami(cmd) => cmd.run(ctx).await,
            Command::Signup(cmd) => cmd.run(ctx).await,
            Command::Members(cmd) => cmd.run(ctx).await,
            Command::Payments(cmd) => cmd.run(ctx).await,
            Command::Events(cmd) => cmd.run(ctx).await,
            Command::Projects(cmd) => cmd.run(ctx).await,
            Command::Responses(cmd) => cmd.run(ctx).await,
            Command::Announcements(cmd) => cmd.run(ctx).await,
        }
    }
}
