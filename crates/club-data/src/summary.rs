use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    Announcement, AnnouncementFilter, Event, EventFilter, Member, MemberFilter, Query, Result,
};

/// Counts shown on the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeSummary {
    pub total_members: usize,
    pub active_members: usize,
    pub announcements: usize,
    pub upcoming_events: Vec<Event>,
}

impl HomeSummary {
    pub async fn collect<DB>(db: &DB, today: NaiveDate) -> Result<Self>
    where
        DB: Query<Member, Filter = MemberFilter>
            + Query<Event, Filter = EventFilter>
            + Query<Announcement, Filter = AnnouncementFilter>,
    {
        let members = <DB as Query<Member>>::query(db, &MemberFilter::default()).await?;
        let upcoming_events = <DB as Query<Event>>::query(
            db,
            &EventFilter {
                date_after: Some(today),
                ..Default::default()
            },
        )
        .await?;
        let announcements =
            <DB as Query<Announcement>>::query(db, &AnnouncementFilter::default()).await?;

        Ok(Self {
            total_members: members.len(),
            active_members: members.iter().filter(|m| m.is_active()).count(),
            announcements: announcements.len(),
            upcoming_events,
        })
    }
}
