use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use club_auth::Signup;
use club_data::datetime;

use super::Context;

#[derive(Args, Debug)]
pub struct ShowHome {
    /// Count events from this date on, defaults to today
    #[clap(long)]
    pub today: Option<NaiveDate>,
}

impl ShowHome {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let today = self.today.unwrap_or_else(datetime::today);
        let summary = ctx.guarded().summary(today).await?;
        ctx.show(&summary)
    }
}

#[derive(Args, Debug)]
pub struct Whoami {}

impl Whoami {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        ctx.show(&ctx.session)
    }
}

#[derive(Args, Debug)]
pub struct SignupMember {
    #[clap(short, long)]
    pub first_name: String,
    #[clap(short, long)]
    pub last_name: String,
    #[clap(short, long)]
    pub email: String,
    /// Used to log in as long as no password is set
    #[clap(short, long)]
    pub birth_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub password: Option<String>,
}

impl SignupMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let signup = Signup {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            birth_date: self.birth_date,
            password: self.password,
        };
        let (member, session) = club_auth::signup(&ctx.db, signup).await?;
        ctx.show(&member)?;
        if !ctx.json {
            println!("Welcome! You are now {}.", session);
        }
        Ok(())
    }
}
