use anyhow::Result;
use clap::{Args, Subcommand};

use club_data::{
    Delete, Insert, Query, Response, ResponseFilter, ResponseUpdate, Retrieve, Update,
};

use super::Context;

#[derive(Subcommand, Debug)]
pub enum Responses {
    /// List responses
    #[clap(name = "list")]
    List(ListResponses),
    /// Write a response
    #[clap(name = "add")]
    Add(AddResponse),
    /// Update a response
    #[clap(name = "set")]
    Update(UpdateResponse),
    /// Delete a response
    #[clap(name = "delete")]
    Delete(DeleteResponse),
}

impl Responses {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Responses::List(cmd) => cmd.run(ctx).await,
            Responses::Add(cmd) => cmd.run(ctx).await,
            Responses::Update(cmd) => cmd.run(ctx).await,
            Responses::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListResponses {
    #[clap(short, long)]
    pub member_id: Option<u32>,
    #[clap(short, long)]
    pub project_id: Option<u32>,
}

impl ListResponses {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let filter = ResponseFilter {
            member_id: self.member_id,
            target_project_id: self.project_id,
            ..Default::default()
        };
        let responses: Vec<Response> = ctx.guarded().query(&filter).await?;
        ctx.show(&responses)
    }
}

#[derive(Args, Debug)]
pub struct AddResponse {
    #[clap(short, long)]
    pub content: String,
    /// The project the response is about
    #[clap(short, long)]
    pub project_id: Option<u32>,
    /// Defaults to the logged in member
    #[clap(short, long)]
    pub member_id: Option<u32>,
}

impl AddResponse {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let member_id = ctx.member_or_self(self.member_id)?;
        let response = Response {
            target_project_id: self.project_id,
            ..Response::new(member_id, &self.content)
        };
        let response = ctx.guarded().insert(response).await?;
        println!("Response added with id {}.", response.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateResponse {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub content: Option<String>,
    #[clap(short, long)]
    pub project_id: Option<u32>,
}

impl UpdateResponse {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let changes = ResponseUpdate {
            content: self.content,
            target_project_id: self.project_id,
        };
        let response: Response = ctx.guarded().update(self.id, changes).await?;
        ctx.show(&response)
    }
}

#[derive(Args, Debug)]
pub struct DeleteResponse {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteResponse {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let response: Response = db.retrieve(self.id).await?;
        ctx.show(&response)?;
        if !ctx.confirm("Delete response?")? {
            return Ok(());
        }
        let _: Response = db.delete(response.id).await?;
        println!("Response {} deleted.", response.id);
        Ok(())
    }
}
