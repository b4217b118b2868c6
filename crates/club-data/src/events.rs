use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{datetime, Error, Insert, Query, Result};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventFilter {
    pub id: Option<u32>,
    /// Only events on or after this date
    pub date_after: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub location: Option<String>,
    /// Maximum number of participants, 0 means unlimited
    pub capacity: u32,
    pub responsible_member_id: Option<u32>,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            description: None,
            date: datetime::today(),
            location: None,
            capacity: 0,
            responsible_member_id: None,
        }
    }
}

impl Event {
    pub fn new(title: &str, date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            date,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("event title is required"));
        }
        Ok(())
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date >= today
    }

    /// Check if `registered` participants fill the event
    pub fn is_full(&self, registered: usize) -> bool {
        self.capacity > 0 && registered >= self.capacity as usize
    }

    pub async fn participants<DB>(&self, db: &DB) -> Result<Vec<EventParticipant>>
    where
        DB: Query<EventParticipant, Filter = ParticipantFilter>,
    {
        db.query(&ParticipantFilter {
            event_id: Some(self.id),
            ..Default::default()
        })
        .await
    }

    /// Register a member for this event. Registering twice
    /// returns the existing registration.
    pub async fn register<DB>(&self, db: &DB, member_id: u32) -> Result<EventParticipant>
    where
        DB: Insert<EventParticipant>,
    {
        db.insert(EventParticipant::new(self.id, member_id)).await
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub capacity: Option<u32>,
    pub responsible_member_id: Option<u32>,
}

impl EventUpdate {
    pub fn apply(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = self.location {
            event.location = Some(location);
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
        if let Some(member_id) = self.responsible_member_id {
            event.responsible_member_id = Some(member_id);
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ParticipantFilter {
    pub id: Option<u32>,
    pub event_id: Option<u32>,
    pub member_id: Option<u32>,
}

/// Registration of a member for an event
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EventParticipant {
    pub id: u32,
    pub event_id: u32,
    pub member_id: u32,
    pub registered_at: NaiveDateTime,
}

impl EventParticipant {
    pub fn new(event_id: u32, member_id: u32) -> Self {
        Self {
            id: 0,
            event_id,
            member_id,
            registered_at: datetime::now(),
        }
    }
}
