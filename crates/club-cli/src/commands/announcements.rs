use anyhow::Result;
use clap::{Args, Subcommand};

use club_data::{
    Announcement, AnnouncementFilter, AnnouncementUpdate, Delete, Insert, Member, Query, Retrieve,
    Update,
};

use super::Context;

#[derive(Subcommand, Debug)]
pub enum Announcements {
    /// List announcements, newest first
    #[clap(name = "list")]
    List(ListAnnouncements),
    /// Show an announcement
    #[clap(name = "show")]
    Show(ShowAnnouncement),
    /// Publish an announcement
    #[clap(name = "add")]
    Add(AddAnnouncement),
    /// Update an announcement
    #[clap(name = "set")]
    Update(UpdateAnnouncement),
    /// Delete an announcement
    #[clap(name = "delete")]
    Delete(DeleteAnnouncement),
}

impl Announcements {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Announcements::List(cmd) => cmd.run(ctx).await,
            Announcements::Show(cmd) => cmd.run(ctx).await,
            Announcements::Add(cmd) => cmd.run(ctx).await,
            Announcements::Update(cmd) => cmd.run(ctx).await,
            Announcements::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListAnnouncements {
    #[clap(short, long)]
    pub author: Option<String>,
}

impl ListAnnouncements {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let filter = AnnouncementFilter {
            author: self.author,
            ..Default::default()
        };
        let announcements: Vec<Announcement> = ctx.guarded().query(&filter).await?;
        ctx.show(&announcements)
    }
}

#[derive(Args, Debug)]
pub struct ShowAnnouncement {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowAnnouncement {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let announcement: Announcement = ctx.guarded().retrieve(self.id).await?;
        ctx.show(&announcement)
    }
}

#[derive(Args, Debug)]
pub struct AddAnnouncement {
    #[clap(short, long)]
    pub title: String,
    #[clap(short, long)]
    pub content: String,
    /// Defaults to the name of the logged in member
    #[clap(short, long)]
    pub author: Option<String>,
}

impl AddAnnouncement {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let author = match (self.author, ctx.session.member_id()) {
            (Some(author), _) => Some(author),
            (None, Some(member_id)) => {
                let member: Member = db.retrieve(member_id).await?;
                Some(member.full_name())
            }
            (None, None) => None,
        };
        let announcement = Announcement {
            author,
            ..Announcement::new(&self.title, &self.content)
        };
        announcement.validate()?;

        ctx.show(&announcement)?;
        if !ctx.confirm("Publish announcement?")? {
            return Ok(());
        }
        let announcement = db.insert(announcement).await?;
        println!("Announcement published with id {}.", announcement.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateAnnouncement {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub title: Option<String>,
    #[clap(short, long)]
    pub content: Option<String>,
    #[clap(short, long)]
    pub author: Option<String>,
}

impl UpdateAnnouncement {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let changes = AnnouncementUpdate {
            title: self.title,
            content: self.content,
            author: self.author,
        };
        let announcement: Announcement = ctx.guarded().update(self.id, changes).await?;
        ctx.show(&announcement)
    }
}

#[derive(Args, Debug)]
pub struct DeleteAnnouncement {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteAnnouncement {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let announcement: Announcement = db.retrieve(self.id).await?;
        ctx.show(&announcement)?;
        if !ctx.confirm("Delete announcement?")? {
            return Ok(());
        }
        let announcement: Announcement = db.delete(announcement.id).await?;
        println!("Announcement {} deleted.", announcement.title);
        Ok(())
    }
}
