use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, Connection as _, QueryBuilder, Sqlite};
use tracing::{debug, info};

use club_data::{
    Announcement, AnnouncementFilter, AnnouncementUpdate, Delete, Error, Insert, Query, Result,
    Retrieve, Update,
};

use crate::{results::Id, Connection};

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    filter: &AnnouncementFilter,
) -> Result<Vec<Announcement>> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            id,
            title,
            content,
            date,
            author
        FROM announcements
        WHERE 1
        "#,
    );
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(author) = filter.author.clone() {
        qry.push(" AND author = ").push_bind(author);
    }
    qry.push(" ORDER BY date DESC, id DESC");

    let announcements: Vec<Announcement> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(announcements)
}

async fn fetch_one(conn: &mut SqliteConnection, id: u32) -> Result<Announcement> {
    let filter = AnnouncementFilter {
        id: Some(id),
        ..Default::default()
    };
    fetch(conn, &filter)
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("announcement", id))
}

#[async_trait]
impl Query<Announcement> for Connection {
    type Filter = AnnouncementFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Announcement>> {
        let mut conn = self.lock().await;
        let announcements = fetch(&mut conn, filter).await?;
        debug!(count = announcements.len(), "queried announcements");
        Ok(announcements)
    }
}

#[async_trait]
impl Retrieve<Announcement> for Connection {
    type Key = u32;

    async fn retrieve(&self, announcement_id: Self::Key) -> Result<Announcement> {
        let mut conn = self.lock().await;
        fetch_one(&mut conn, announcement_id).await
    }
}

#[async_trait]
impl Insert<Announcement> for Connection {
    async fn insert(&self, announcement: Announcement) -> Result<Announcement> {
        announcement.validate()?;

        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO announcements (title, content, date, author) VALUES (",
        );
        qry.separated(", ")
            .push_bind(announcement.title.trim().to_string())
            .push_bind(announcement.content.clone())
            .push_bind(announcement.date)
            .push_bind(announcement.author.clone());
        let insert: Id<u32> = qry
            .push(") RETURNING id ")
            .build_query_as()
            .fetch_one(&mut *tx)
            .await?;

        let announcement = fetch_one(&mut tx, insert.id).await?;
        tx.commit().await?;

        info!(announcement_id = announcement.id, "announcement published");
        Ok(announcement)
    }
}

#[async_trait]
impl Update<Announcement> for Connection {
    type Key = u32;
    type Changes = AnnouncementUpdate;

    async fn update(
        &self,
        announcement_id: Self::Key,
        changes: Self::Changes,
    ) -> Result<Announcement> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let mut announcement = fetch_one(&mut tx, announcement_id).await?;
        changes.apply(&mut announcement);
        announcement.validate()?;

        QueryBuilder::<Sqlite>::new("UPDATE announcements SET")
            .push(" title = ")
            .push_bind(announcement.title.trim().to_string())
            .push(", content = ")
            .push_bind(announcement.content.clone())
            .push(", author = ")
            .push_bind(announcement.author.clone())
            .push(" WHERE id = ")
            .push_bind(announcement_id)
            .build()
            .execute(&mut *tx)
            .await?;

        let announcement = fetch_one(&mut tx, announcement_id).await?;
        tx.commit().await?;

        info!(announcement_id, "announcement updated");
        Ok(announcement)
    }
}

#[async_trait]
impl Delete<Announcement> for Connection {
    type Key = u32;

    async fn delete(&self, announcement_id: Self::Key) -> Result<Announcement> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let announcement = fetch_one(&mut tx, announcement_id).await?;
        QueryBuilder::<Sqlite>::new("DELETE FROM announcements WHERE id = ")
            .push_bind(announcement_id)
            .build()
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(announcement_id, "announcement deleted");
        Ok(announcement)
    }
}
