use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, Connection as _, QueryBuilder, Sqlite};
use tracing::{debug, info};

use club_data::{
    Delete, Error, Event, EventFilter, EventUpdate, Insert, Query, Result, Retrieve, Update,
};

use crate::{
    results::{check_reference, Id},
    Connection,
};

/// Fetch events matching the filter, earliest first
pub(crate) async fn fetch(conn: &mut SqliteConnection, filter: &EventFilter) -> Result<Vec<Event>> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            id,
            title,
            description,
            date,
            location,
            capacity,
            responsible_member_id
        FROM events
        WHERE 1
        "#,
    );
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(date_after) = filter.date_after {
        qry.push(" AND date >= ").push_bind(date_after);
    }
    qry.push(" ORDER BY date ASC, id ASC");

    let events: Vec<Event> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(events)
}

pub(crate) async fn fetch_one(conn: &mut SqliteConnection, id: u32) -> Result<Event> {
    let filter = EventFilter {
        id: Some(id),
        ..Default::default()
    };
    fetch(conn, &filter)
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("event", id))
}

async fn check_responsible(conn: &mut SqliteConnection, event: &Event) -> Result<()> {
    match event.responsible_member_id {
        Some(member_id) => {
            check_reference(conn, "members", member_id, "event", "responsible_member_id").await
        }
        None => Ok(()),
    }
}

#[async_trait]
impl Query<Event> for Connection {
    type Filter = EventFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Event>> {
        let mut conn = self.lock().await;
        let events = fetch(&mut conn, filter).await?;
        debug!(count = events.len(), "queried events");
        Ok(events)
    }
}

#[async_trait]
impl Retrieve<Event> for Connection {
    type Key = u32;

    async fn retrieve(&self, event_id: Self::Key) -> Result<Event> {
        let mut conn = self.lock().await;
        fetch_one(&mut conn, event_id).await
    }
}

#[async_trait]
impl Insert<Event> for Connection {
    async fn insert(&self, event: Event) -> Result<Event> {
        event.validate()?;

        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;
        check_responsible(&mut tx, &event).await?;

        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO events (
                title,
                description,
                date,
                location,
                capacity,
                responsible_member_id
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(event.title.trim().to_string())
            .push_bind(event.description.clone())
            .push_bind(event.date)
            .push_bind(event.location.clone())
            .push_bind(event.capacity)
            .push_bind(event.responsible_member_id);
        let insert: Id<u32> = qry
            .push(") RETURNING id ")
            .build_query_as()
            .fetch_one(&mut *tx)
            .await?;

        let event = fetch_one(&mut tx, insert.id).await?;
        tx.commit().await?;

        info!(event_id = event.id, date = %event.date, "event created");
        Ok(event)
    }
}

#[async_trait]
impl Update<Event> for Connection {
    type Key = u32;
    type Changes = EventUpdate;

    async fn update(&self, event_id: Self::Key, changes: Self::Changes) -> Result<Event> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let mut event = fetch_one(&mut tx, event_id).await?;
        changes.apply(&mut event);
        event.validate()?;
        check_responsible(&mut tx, &event).await?;

        QueryBuilder::<Sqlite>::new("UPDATE events SET")
            .push(" title = ")
            .push_bind(event.title.trim().to_string())
            .push(", description = ")
            .push_bind(event.description.clone())
            .push(", date = ")
            .push_bind(event.date)
            .push(", location = ")
            .push_bind(event.location.clone())
            .push(", capacity = ")
            .push_bind(event.capacity)
            .push(", responsible_member_id = ")
            .push_bind(event.responsible_member_id)
            .push(" WHERE id = ")
            .push_bind(event_id)
            .build()
            .execute(&mut *tx)
            .await?;

        let event = fetch_one(&mut tx, event_id).await?;
        tx.commit().await?;

        info!(event_id, "event updated");
        Ok(event)
    }
}

#[async_trait]
impl Delete<Event> for Connection {
    type Key = u32;

    /// Delete the event and all registrations for it
    async fn delete(&self, event_id: Self::Key) -> Result<Event> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let event = fetch_one(&mut tx, event_id).await?;
        QueryBuilder::<Sqlite>::new("DELETE FROM events WHERE id = ")
            .push_bind(event_id)
            .build()
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(event_id, "event deleted");
        Ok(event)
    }
}
