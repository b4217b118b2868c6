use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, Connection as _, QueryBuilder, Sqlite};
use tracing::{debug, info};

use club_data::{
    Delete, Error, EventParticipant, Insert, ParticipantFilter, Query, Result, Retrieve,
};

use crate::{events, results::check_reference, Connection};

/// Fetch registrations, in the order they were made
pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    filter: &ParticipantFilter,
) -> Result<Vec<EventParticipant>> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            id,
            event_id,
            member_id,
            registered_at
        FROM event_participants
        WHERE 1
        "#,
    );
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(event_id) = filter.event_id {
        qry.push(" AND event_id = ").push_bind(event_id);
    }
    if let Some(member_id) = filter.member_id {
        qry.push(" AND member_id = ").push_bind(member_id);
    }
    qry.push(" ORDER BY registered_at ASC, id ASC");

    let participants: Vec<EventParticipant> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(participants)
}

async fn fetch_pair(
    conn: &mut SqliteConnection,
    event_id: u32,
    member_id: u32,
) -> Result<Option<EventParticipant>> {
    let filter = ParticipantFilter {
        event_id: Some(event_id),
        member_id: Some(member_id),
        ..Default::default()
    };
    Ok(fetch(conn, &filter).await?.pop())
}

#[async_trait]
impl Query<EventParticipant> for Connection {
    type Filter = ParticipantFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<EventParticipant>> {
        let mut conn = self.lock().await;
        let participants = fetch(&mut conn, filter).await?;
        debug!(count = participants.len(), "queried event participants");
        Ok(participants)
    }
}

#[async_trait]
impl Retrieve<EventParticipant> for Connection {
    type Key = u32;

    async fn retrieve(&self, participant_id: Self::Key) -> Result<EventParticipant> {
        let mut conn = self.lock().await;
        let filter = ParticipantFilter {
            id: Some(participant_id),
            ..Default::default()
        };
        fetch(&mut conn, &filter)
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("event participant", participant_id))
    }
}

#[async_trait]
impl Insert<EventParticipant> for Connection {
    /// Register a member for an event.
    /// An existing registration for the same pair is returned as is.
    async fn insert(&self, participant: EventParticipant) -> Result<EventParticipant> {
        let EventParticipant {
            event_id,
            member_id,
            ..
        } = participant;

        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        // Start with a write so the database lock is held before the
        // capacity check. Other connections wait on it instead of
        // registering against a stale count.
        let mut lock =
            QueryBuilder::<Sqlite>::new("UPDATE events SET capacity = capacity WHERE id = ");
        lock.push_bind(event_id);
        lock.build().execute(&mut *tx).await?;

        let event = events::fetch_one(&mut tx, event_id)
            .await
            .map_err(|err| match err {
                Error::NotFound { .. } => Error::Reference {
                    entity: "event participant",
                    field: "event_id",
                    id: event_id,
                },
                err => err,
            })?;
        check_reference(&mut tx, "members", member_id, "event participant", "member_id").await?;

        if let Some(existing) = fetch_pair(&mut tx, event_id, member_id).await? {
            debug!(event_id, member_id, "member already registered");
            return Ok(existing);
        }

        let registered = fetch(
            &mut tx,
            &ParticipantFilter {
                event_id: Some(event_id),
                ..Default::default()
            },
        )
        .await?
        .len();
        if event.is_full(registered) {
            return Err(Error::validation(format!(
                "event '{}' is full ({} participants)",
                event.title, event.capacity
            )));
        }

        // The unique (event_id, member_id) constraint keeps concurrent
        // registrations from creating a second row.
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO event_participants (event_id, member_id, registered_at) VALUES (",
        );
        qry.separated(", ")
            .push_bind(event_id)
            .push_bind(member_id)
            .push_bind(participant.registered_at);
        qry.push(") ON CONFLICT(event_id, member_id) DO NOTHING")
            .build()
            .execute(&mut *tx)
            .await?;

        let participant = fetch_pair(&mut tx, event_id, member_id)
            .await?
            .ok_or_else(|| Error::not_found("event participant", 0))?;
        tx.commit().await?;

        info!(event_id, member_id, "member registered for event");
        Ok(participant)
    }
}

#[async_trait]
impl Delete<EventParticipant> for Connection {
    type Key = u32;

    /// Cancel a registration
    async fn delete(&self, participant_id: Self::Key) -> Result<EventParticipant> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let filter = ParticipantFilter {
            id: Some(participant_id),
            ..Default::default()
        };
        let participant = fetch(&mut tx, &filter)
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("event participant", participant_id))?;
        QueryBuilder::<Sqlite>::new("DELETE FROM event_participants WHERE id = ")
            .push_bind(participant_id)
            .build()
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            event_id = participant.event_id,
            member_id = participant.member_id,
            "registration cancelled"
        );
        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::connection;

    use club_data::{Event, EventUpdate, Member, Update};

    async fn setup(db: &Connection) -> (Member, Event) {
        let member = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        let event = db
            .insert(Event::new(
                "Plenum",
                NaiveDate::from_ymd_opt(2024, 6, 6).unwrap(),
            ))
            .await
            .unwrap();
        (member, event)
    }

    #[tokio::test]
    async fn test_register() {
        let (_handle, db) = connection::open_test().await;
        let (member, event) = setup(&db).await;

        let participant = event.register(&db, member.id).await.unwrap();
        assert!(participant.id > 0);
        assert_eq!(participant.event_id, event.id);
        assert_eq!(participant.member_id, member.id);

        let participations = member.participations(&db).await.unwrap();
        assert_eq!(participations, vec![participant]);
    }

    #[tokio::test]
    async fn test_register_twice_is_idempotent() {
        let (_handle, db) = connection::open_test().await;
        let (member, event) = setup(&db).await;

        let first = event.register(&db, member.id).await.unwrap();
        let second = event.register(&db, member.id).await.unwrap();
        assert_eq!(first, second);

        let participants = event.participants(&db).await.unwrap();
        assert_eq!(participants.len(), 1);
    }

    #[tokio::test]
    async fn test_register_concurrently() {
        let (_handle, db) = connection::open_test().await;
        let (member, event) = setup(&db).await;

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            let participant = EventParticipant::new(event.id, member.id);
            tasks.push(tokio::spawn(async move { db.insert(participant).await }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            let participant: EventParticipant = task.await.unwrap().unwrap();
            ids.push(participant.id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);

        let participants = event.participants(&db).await.unwrap();
        assert_eq!(participants.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_register_through_two_connections() {
        let (handle, db) = connection::open_test().await;
        let other = Connection::open(handle.filename()).await.unwrap();
        let (member, event) = setup(&db).await;

        let mut tasks = Vec::new();
        for i in 0..8 {
            let db = if i % 2 == 0 { db.clone() } else { other.clone() };
            let participant = EventParticipant::new(event.id, member.id);
            tasks.push(tokio::spawn(async move { db.insert(participant).await }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            let participant: EventParticipant = task.await.unwrap().unwrap();
            ids.push(participant.id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);

        let participants = event.participants(&other).await.unwrap();
        assert_eq!(participants.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_capacity_holds_across_connections() {
        let (handle, db) = connection::open_test().await;
        let other = Connection::open(handle.filename()).await.unwrap();
        let (member, event) = setup(&db).await;
        let second = db
            .insert(Member::new("Other", "Member", "o@club.org"))
            .await
            .unwrap();
        let event: Event = db
            .update(
                event.id,
                EventUpdate {
                    capacity: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let (first, last) = tokio::join!(
            db.insert(EventParticipant::new(event.id, member.id)),
            other.insert(EventParticipant::new(event.id, second.id)),
        );
        let failures = [&first, &last]
            .iter()
            .filter(|result| matches!(result, Err(Error::Validation(_))))
            .count();
        assert_eq!(failures, 1);
        assert!(first.is_ok() || last.is_ok());

        let participants = event.participants(&db).await.unwrap();
        assert_eq!(participants.len(), 1);
    }

    #[tokio::test]
    async fn test_register_unknown_event_or_member() {
        let (_handle, db) = connection::open_test().await;
        let (member, event) = setup(&db).await;

        let err = db
            .insert(EventParticipant::new(event.id + 100, member.id))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Reference { field: "event_id", .. }));

        let err = db
            .insert(EventParticipant::new(event.id, member.id + 100))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Reference { field: "member_id", .. }));
    }

    #[tokio::test]
    async fn test_register_full_event() {
        let (_handle, db) = connection::open_test().await;
        let (member, event) = setup(&db).await;
        let other = db
            .insert(Member::new("Other", "Member", "o@club.org"))
            .await
            .unwrap();
        let event: Event = db
            .update(
                event.id,
                EventUpdate {
                    capacity: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        event.register(&db, member.id).await.unwrap();
        let err = event.register(&db, other.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // Already registered members still get their registration back
        assert!(event.register(&db, member.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_registration() {
        let (_handle, db) = connection::open_test().await;
        let (member, event) = setup(&db).await;
        let participant = event.register(&db, member.id).await.unwrap();

        let cancelled: EventParticipant = db.delete(participant.id).await.unwrap();
        assert_eq!(cancelled, participant);
        assert!(event.participants(&db).await.unwrap().is_empty());
    }
}
