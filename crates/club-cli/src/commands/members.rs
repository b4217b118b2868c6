use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use club_auth::password;
use club_data::{
    Delete, Insert, Member, MemberFilter, MemberUpdate, Query, Retrieve, Role, Status, Update,
};

use super::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Members {
    /// Show a member
    #[clap(name = "show")]
    Show(ShowMember),
    /// List members
    #[clap(name = "list")]
    List(ListMembers),
    /// Add a member
    #[clap(name = "add")]
    Add(AddMember),
    /// Update a member
    #[clap(name = "set")]
    Update(UpdateMember),
    /// Delete a member with all payments, registrations and responses
    #[clap(name = "delete")]
    Delete(DeleteMember),
}

impl Members {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Members::Show(cmd) => cmd.run(ctx).await,
            Members::List(cmd) => cmd.run(ctx).await,
            Members::Add(cmd) => cmd.run(ctx).await,
            Members::Update(cmd) => cmd.run(ctx).await,
            Members::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowMember {
    /// Defaults to the logged in member
    #[clap(short, long)]
    pub id: Option<u32>,
}

impl ShowMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let id = ctx.member_or_self(self.id)?;
        let member: Member = ctx.guarded().retrieve(id).await?;
        ctx.show(&member)
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    #[clap(short, long)]
    pub id: Option<u32>,
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
}

impl ListMembers {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let filter = MemberFilter {
            id: self.id,
            name: self.name,
            email: self.email,
        };
        let members: Vec<Member> = ctx.guarded().query(&filter).await?;
        if !ctx.json {
            println!("{} members.", members.len());
        }
        ctx.show(&members)
    }
}

#[derive(Args, Debug)]
pub struct AddMember {
    #[clap(short, long)]
    pub first_name: String,
    #[clap(short, long)]
    pub last_name: String,
    #[clap(short, long)]
    pub email: String,
    #[clap(short, long)]
    pub birth_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub password: Option<String>,
    #[clap(short, long, default_value = "member")]
    pub role: Role,
    #[clap(short, long, default_value = "active")]
    pub status: Status,
    /// Defaults to today
    #[clap(short, long)]
    pub join_date: Option<NaiveDate>,
}

impl AddMember {
    /// Run the command and add a member to the database
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let mut member = Member {
            birth_date: self.birth_date,
            password: self.password.as_deref().map(password::hash),
            role: self.role,
            status: self.status,
            ..Member::new(&self.first_name, &self.last_name, &self.email)
        };
        if let Some(join_date) = self.join_date {
            member.join_date = join_date;
        }
        member.validate()?;

        ctx.show(&member)?;
        if !ctx.confirm("Add member?")? {
            return Ok(());
        }

        let member = ctx.guarded().insert(member).await?;
        println!("Member added with id {}.", member.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateMember {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub first_name: Option<String>,
    #[clap(short, long)]
    pub last_name: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
    #[clap(short, long)]
    pub birth_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub password: Option<String>,
    #[clap(short, long)]
    pub role: Option<Role>,
    #[clap(short, long)]
    pub status: Option<Status>,
    #[clap(short, long)]
    pub join_date: Option<NaiveDate>,
}

impl UpdateMember {
    /// Run command and update a member
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let member: Member = db.retrieve(self.id).await?;

        let changes = MemberUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password.as_deref().map(password::hash),
            birth_date: self.birth_date,
            role: self.role,
            status: self.status,
            join_date: self.join_date,
        };
        let mut update = member.clone();
        changes.clone().apply(&mut update);

        if !ctx.json {
            println!();
            (member, update).print_formatted();
            println!();
        }
        if !ctx.confirm("Update member?")? {
            return Ok(());
        }

        let member: Member = db.update(self.id, changes).await?;
        println!("Member {} updated.", member.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteMember {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let member: Member = db.retrieve(self.id).await?;
        ctx.show(&member)?;
        if !ctx.confirm("Delete member from database?")? {
            return Ok(());
        }
        let member: Member = db.delete(member.id).await?;
        println!("Member {} deleted.", member.full_name());
        Ok(())
    }
}
