use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use club_cli::telemetry;
use club_data::{Member, MemberFilter, MemberUpdate, Query, Role, Update};
use club_db::{schema, Connection};

#[derive(Parser, Debug)]
#[clap(name = "club-setup")]
struct Cli {
    #[clap(env = "CLUB_DB", default_value = "members.sqlite3")]
    pub members_db: String,

    #[clap(long, env = "CLUB_LOG", default_value = "info")]
    pub log_level: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and install the schema
    Init,
    /// Give an existing member the admin role
    Promote {
        #[clap(short, long)]
        email: String,
    },
}

/// Initialize the database
async fn db_init(filename: &str) -> Result<()> {
    let conn = Connection::create(filename).await?;
    schema::install(&conn).await?;
    println!("Database {} is ready.", filename);
    Ok(())
}

async fn promote(filename: &str, email: &str) -> Result<()> {
    let conn = Connection::open(filename).await?;
    let filter = MemberFilter {
        email: Some(email.to_string()),
        ..Default::default()
    };
    let members: Vec<Member> = conn.query(&filter).await?;
    let member = members
        .first()
        .ok_or_else(|| anyhow!("no member with email {}", email))?;

    let changes = MemberUpdate {
        role: Some(Role::Admin),
        ..Default::default()
    };
    let member: Member = conn.update(member.id, changes).await?;
    info!(member_id = member.id, "member promoted to admin");
    println!("{} is now an admin.", member.full_name());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Command::Init => db_init(&cli.members_db).await?,
        Command::Promote { email } => promote(&cli.members_db, &email).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use club_data::Insert;
    use club_db::connection;

    #[test]
    fn test_log_level_flag() {
        let cli = Cli::try_parse_from(["club-setup", "--log-level", "debug", "init"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Command::Init));
    }

    #[tokio::test]
    async fn test_promote() {
        let (handle, db) = connection::open_test().await;
        let member = db
            .insert(Member::new("First", "Admin", "first@club.org"))
            .await
            .unwrap();
        assert_eq!(member.role, Role::Member);

        promote(handle.filename(), "first@club.org").await.unwrap();

        let members: Vec<Member> = db.query(&MemberFilter::default()).await.unwrap();
        assert_eq!(members[0].role, Role::Admin);

        assert!(promote(handle.filename(), "nobody@club.org").await.is_err());
    }
}
