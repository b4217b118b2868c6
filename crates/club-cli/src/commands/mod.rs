use anyhow::{anyhow, Result};
use inquire::Confirm;
use serde::Serialize;

use club_auth::Authorized;
use club_data::Session;
use club_db::Connection;

use crate::formatting::PrintFormatted;

mod announcements;
mod events;
mod members;
mod payments;
mod projects;
mod responses;
mod session;

pub use announcements::*;
pub use events::*;
pub use members::*;
pub use payments::*;
pub use projects::*;
pub use responses::*;
pub use session::*;

/// Everything a command needs to run
pub struct Context {
    pub db: Connection,
    pub session: Session,
    pub json: bool,
    pub yes: bool,
}

impl Context {
    pub fn new(db: Connection, session: Session, json: bool, yes: bool) -> Self {
        Self {
            db,
            session,
            json,
            yes,
        }
    }

    /// The database as seen by the current session
    pub fn guarded(&self) -> Authorized<'_, Connection> {
        Authorized::new(&self.db, &self.session)
    }

    /// Ask before changing anything, unless `--yes` was given
    pub fn confirm(&self, message: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }
        let confirm = Confirm::new(message).with_default(true);
        Ok(confirm.prompt()?)
    }

    pub fn show<T>(&self, item: &T) -> Result<()>
    where
        T: PrintFormatted + Serialize,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(item)?);
        } else {
            println!();
            item.print_formatted();
            println!();
        }
        Ok(())
    }

    /// Resolve the member a command acts for. Defaults
    /// to the logged in member.
    pub fn member_or_self(&self, member_id: Option<u32>) -> Result<u32> {
        member_id
            .or(self.session.member_id())
            .ok_or_else(|| anyhow!("--member-id is required unless logged in as a member"))
    }
}
