use anyhow::Result;
use tracing::{debug, error};

use club_cli::{cli::Cli, commands::Context, telemetry};
use club_db::Connection;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings may come from a .env file next to the database
    dotenvy::dotenv().ok();
    let cli = Cli::init();
    telemetry::init(&cli.log_level)?;

    let db = Connection::open(&cli.members_db).await?;
    let session = cli.session(&db).await?;
    debug!(session = %session, "session established");

    let ctx = Context::new(db, session, cli.json, cli.yes);
    let result = cli.command.run(&ctx).await;
    if let Err(err) = &result {
        error!("command failed: {:#}", err);
    }
    result
}
