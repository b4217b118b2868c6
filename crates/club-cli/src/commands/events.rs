use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use club_data::{
    datetime, Delete, Event, EventFilter, EventParticipant, EventUpdate, Insert, Member,
    ParticipantFilter, Query, Retrieve, Update,
};

use super::Context;

#[derive(Subcommand, Debug)]
pub enum Events {
    /// List events
    #[clap(name = "list")]
    List(ListEvents),
    /// Show an event
    #[clap(name = "show")]
    Show(ShowEvent),
    /// Create an event
    #[clap(name = "add")]
    Add(AddEvent),
    /// Update an event
    #[clap(name = "set")]
    Update(UpdateEvent),
    /// Delete an event and its registrations
    #[clap(name = "delete")]
    Delete(DeleteEvent),
    /// Register for an event
    #[clap(name = "register")]
    Register(RegisterForEvent),
    /// Cancel a registration
    #[clap(name = "cancel")]
    Cancel(CancelRegistration),
    /// List who is registered for an event
    #[clap(name = "participants")]
    Participants(ListParticipants),
}

impl Events {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Events::List(cmd) => cmd.run(ctx).await,
            Events::Show(cmd) => cmd.run(ctx).await,
            Events::Add(cmd) => cmd.run(ctx).await,
            Events::Update(cmd) => cmd.run(ctx).await,
            Events::Delete(cmd) => cmd.run(ctx).await,
            Events::Register(cmd) => cmd.run(ctx).await,
            Events::Cancel(cmd) => cmd.run(ctx).await,
            Events::Participants(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListEvents {
    /// Only events from today on
    #[clap(short, long)]
    pub upcoming: bool,
    #[clap(short, long)]
    pub after_date: Option<NaiveDate>,
}

impl ListEvents {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let date_after = match (self.upcoming, self.after_date) {
            (_, Some(date)) => Some(date),
            (true, None) => Some(datetime::today()),
            (false, None) => None,
        };
        let filter = EventFilter {
            date_after,
            ..Default::default()
        };
        let events: Vec<Event> = ctx.guarded().query(&filter).await?;
        ctx.show(&events)
    }
}

#[derive(Args, Debug)]
pub struct ShowEvent {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowEvent {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let event: Event = ctx.guarded().retrieve(self.id).await?;
        ctx.show(&event)?;
        if !ctx.json {
            // The number of participants is public, their names are not
            let registered = event.participants(&ctx.db).await?.len();
            println!("Registered:\t\t{}", registered);
            if event.is_full(registered) {
                println!("This event is full.");
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddEvent {
    #[clap(short, long)]
    pub title: String,
    #[clap(short, long)]
    pub date: NaiveDate,
    #[clap(short = 'D', long)]
    pub description: Option<String>,
    #[clap(short, long)]
    pub location: Option<String>,
    /// Maximum number of participants, 0 for unlimited
    #[clap(short, long, default_value_t = 0)]
    pub capacity: u32,
    #[clap(short, long)]
    pub responsible_member_id: Option<u32>,
}

impl AddEvent {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let event = Event {
            description: self.description,
            location: self.location,
            capacity: self.capacity,
            responsible_member_id: self.responsible_member_id,
            ..Event::new(&self.title, self.date)
        };
        event.validate()?;

        ctx.show(&event)?;
        if !ctx.confirm("Create event?")? {
            return Ok(());
        }
        let event = ctx.guarded().insert(event).await?;
        println!("Event created with id {}.", event.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateEvent {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub title: Option<String>,
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    #[clap(short = 'D', long)]
    pub description: Option<String>,
    #[clap(short, long)]
    pub location: Option<String>,
    #[clap(short, long)]
    pub capacity: Option<u32>,
    #[clap(short, long)]
    pub responsible_member_id: Option<u32>,
}

impl UpdateEvent {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let changes = EventUpdate {
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            capacity: self.capacity,
            responsible_member_id: self.responsible_member_id,
        };
        let event: Event = ctx.guarded().update(self.id, changes).await?;
        ctx.show(&event)
    }
}

#[derive(Args, Debug)]
pub struct DeleteEvent {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteEvent {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let event: Event = db.retrieve(self.id).await?;
        ctx.show(&event)?;
        if !ctx.confirm("Delete event and all registrations?")? {
            return Ok(());
        }
        let event: Event = db.delete(event.id).await?;
        println!("Event {} deleted.", event.title);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RegisterForEvent {
    /// The event
    #[clap(short, long)]
    pub id: u32,
    /// Defaults to the logged in member
    #[clap(short, long)]
    pub member_id: Option<u32>,
}

impl RegisterForEvent {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let member_id = ctx.member_or_self(self.member_id)?;
        let db = ctx.guarded();
        let event: Event = db.retrieve(self.id).await?;
        let participant = event.register(&db, member_id).await?;
        if ctx.json {
            return ctx.show(&participant);
        }
        println!(
            "Registered for {} on {} (registration {}).",
            event.title, event.date, participant.id
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CancelRegistration {
    /// The event
    #[clap(short, long)]
    pub id: u32,
    /// Defaults to the logged in member
    #[clap(short, long)]
    pub member_id: Option<u32>,
}

impl CancelRegistration {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let member_id = ctx.member_or_self(self.member_id)?;
        let filter = ParticipantFilter {
            event_id: Some(self.id),
            member_id: Some(member_id),
            ..Default::default()
        };
        let db = ctx.guarded();
        let registrations: Vec<EventParticipant> = db.query(&filter).await?;
        let registration = registrations
            .first()
            .ok_or_else(|| anyhow!("member {} is not registered for event {}", member_id, self.id))?;

        if !ctx.confirm("Cancel registration?")? {
            return Ok(());
        }
        let _: EventParticipant = db.delete(registration.id).await?;
        println!("Registration cancelled.");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListParticipants {
    /// The event
    #[clap(short, long)]
    pub id: u32,
}

impl ListParticipants {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let db = ctx.guarded();
        let event: Event = db.retrieve(self.id).await?;
        let participants = event.participants(&db).await?;

        let mut rows = Vec::with_capacity(participants.len());
        for participant in participants {
            let member: Member = db.retrieve(participant.member_id).await?;
            rows.push((participant, member));
        }
        if !ctx.json {
            println!("{} participants for {}.", rows.len(), event.title);
        }
        ctx.show(&rows)
    }
}
