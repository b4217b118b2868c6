use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use club_data::{Delete, Insert, Project, ProjectFilter, ProjectUpdate, Query, Retrieve, Update};

use super::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Projects {
    /// List projects
    #[clap(name = "list")]
    List(ListProjects),
    /// Show a project with its responses
    #[clap(name = "show")]
    Show(ShowProject),
    /// Add a project
    #[clap(name = "add")]
    Add(AddProject),
    /// Update a project
    #[clap(name = "set")]
    Update(UpdateProject),
    /// Delete a project. Responses are kept.
    #[clap(name = "delete")]
    Delete(DeleteProject),
}

impl Projects {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Projects::List(cmd) => cmd.run(ctx).await,
            Projects::Show(cmd) => cmd.run(ctx).await,
            Projects::Add(cmd) => cmd.run(ctx).await,
            Projects::Update(cmd) => cmd.run(ctx).await,
            Projects::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListProjects {
    #[clap(short, long)]
    pub responsible_member_id: Option<u32>,
}

impl ListProjects {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let filter = ProjectFilter {
            responsible_member_id: self.responsible_member_id,
            ..Default::default()
        };
        let projects: Vec<Project> = ctx.guarded().query(&filter).await?;
        ctx.show(&projects)
    }
}

#[derive(Args, Debug)]
pub struct ShowProject {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowProject {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let project: Project = db.retrieve(self.id).await?;
        let responses = project.responses(&db).await?;
        if ctx.json {
            println!("{}", serde_json::to_string_pretty(&(project, responses))?);
            return Ok(());
        }

        println!();
        project.print_formatted();
        if let Some(member) = project.responsible_member(&db).await? {
            println!("Responsible member:\t{}", member.full_name());
        }
        println!();
        println!("{} responses.", responses.len());
        responses.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddProject {
    #[clap(short, long)]
    pub title: String,
    #[clap(short, long)]
    pub description: Option<String>,
    #[clap(short, long)]
    pub start_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub end_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub responsible_member_id: Option<u32>,
}

impl AddProject {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let project = Project {
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            responsible_member_id: self.responsible_member_id,
            ..Project::new(&self.title)
        };
        project.validate()?;

        ctx.show(&project)?;
        if !ctx.confirm("Add project?")? {
            return Ok(());
        }
        let project = ctx.guarded().insert(project).await?;
        println!("Project added with id {}.", project.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateProject {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub title: Option<String>,
    #[clap(short, long)]
    pub description: Option<String>,
    #[clap(short, long)]
    pub start_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub end_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub responsible_member_id: Option<u32>,
}

impl UpdateProject {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let changes = ProjectUpdate {
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            responsible_member_id: self.responsible_member_id,
        };
        let project: Project = ctx.guarded().update(self.id, changes).await?;
        ctx.show(&project)
    }
}

#[derive(Args, Debug)]
pub struct DeleteProject {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteProject {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let project: Project = db.retrieve(self.id).await?;
        ctx.show(&project)?;
        if !ctx.confirm("Delete project?")? {
            return Ok(());
        }
        let project: Project = db.delete(project.id).await?;
        println!("Project {} deleted.", project.title);
        Ok(())
    }
}
