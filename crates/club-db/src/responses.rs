use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, Connection as _, QueryBuilder, Sqlite};
use tracing::{debug, info};

use club_data::{
    Delete, Error, Insert, Query, Response, ResponseFilter, ResponseUpdate, Result, Retrieve,
    Update,
};

use crate::{
    results::{check_reference, Id},
    Connection,
};

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    filter: &ResponseFilter,
) -> Result<Vec<Response>> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            id,
            content,
            date,
            member_id,
            target_project_id
        FROM responses
        WHERE 1
        "#,
    );
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(member_id) = filter.member_id {
        qry.push(" AND member_id = ").push_bind(member_id);
    }
    if let Some(project_id) = filter.target_project_id {
        qry.push(" AND target_project_id = ").push_bind(project_id);
    }
    qry.push(" ORDER BY date DESC, id DESC");

    let responses: Vec<Response> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(responses)
}

async fn fetch_one(conn: &mut SqliteConnection, id: u32) -> Result<Response> {
    let filter = ResponseFilter {
        id: Some(id),
        ..Default::default()
    };
    fetch(conn, &filter)
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("response", id))
}

async fn check_target(conn: &mut SqliteConnection, response: &Response) -> Result<()> {
    match response.target_project_id {
        Some(project_id) => {
            check_reference(conn, "projects", project_id, "response", "target_project_id").await
        }
        None => Ok(()),
    }
}

#[async_trait]
impl Query<Response> for Connection {
    type Filter = ResponseFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Response>> {
        let mut conn = self.lock().await;
        let responses = fetch(&mut conn, filter).await?;
        debug!(count = responses.len(), "queried responses");
        Ok(responses)
    }
}

#[async_trait]
impl Retrieve<Response> for Connection {
    type Key = u32;

    async fn retrieve(&self, response_id: Self::Key) -> Result<Response> {
        let mut conn = self.lock().await;
        fetch_one(&mut conn, response_id).await
    }
}

#[async_trait]
impl Insert<Response> for Connection {
    async fn insert(&self, response: Response) -> Result<Response> {
        response.validate()?;

        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;
        check_reference(&mut tx, "members", response.member_id, "response", "member_id").await?;
        check_target(&mut tx, &response).await?;

        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO responses (
                content,
                date,
                member_id,
                target_project_id
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(response.content.clone())
            .push_bind(response.date)
            .push_bind(response.member_id)
            .push_bind(response.target_project_id);
        let insert: Id<u32> = qry
            .push(") RETURNING id ")
            .build_query_as()
            .fetch_one(&mut *tx)
            .await?;

        let response = fetch_one(&mut tx, insert.id).await?;
        tx.commit().await?;

        info!(
            response_id = response.id,
            member_id = response.member_id,
            "response added"
        );
        Ok(response)
    }
}

#[async_trait]
impl Update<Response> for Connection {
    type Key = u32;
    type Changes = ResponseUpdate;

    async fn update(&self, response_id: Self::Key, changes: Self::Changes) -> Result<Response> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let mut response = fetch_one(&mut tx, response_id).await?;
        changes.apply(&mut response);
        response.validate()?;
        check_target(&mut tx, &response).await?;

        QueryBuilder::<Sqlite>::new("UPDATE responses SET")
            .push(" content = ")
            .push_bind(response.content.clone())
            .push(", target_project_id = ")
            .push_bind(response.target_project_id)
            .push(" WHERE id = ")
            .push_bind(response_id)
            .build()
            .execute(&mut *tx)
            .await?;

        let response = fetch_one(&mut tx, response_id).await?;
        tx.commit().await?;

        info!(response_id, "response updated");
        Ok(response)
    }
}

#[async_trait]
impl Delete<Response> for Connection {
    type Key = u32;

    async fn delete(&self, response_id: Self::Key) -> Result<Response> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let response = fetch_one(&mut tx, response_id).await?;
        QueryBuilder::<Sqlite>::new("DELETE FROM responses WHERE id = ")
            .push_bind(response_id)
            .build()
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(response_id, "response deleted");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection;

    use club_data::{Member, Project};

    #[tokio::test]
    async fn test_response_insert() {
        let (_handle, db) = connection::open_test().await;
        let m = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        let project = db.insert(Project::new("Badge")).await.unwrap();

        let response = db
            .insert(Response {
                target_project_id: Some(project.id),
                ..Response::new(m.id, "Count me in")
            })
            .await
            .unwrap();
        assert!(response.id > 0);
        assert_eq!(response.content, "Count me in");
        assert_eq!(response.member_id, m.id);
        assert_eq!(response.target_project_id, Some(project.id));

        let responses = m.responses(&db).await.unwrap();
        assert_eq!(responses, vec![response]);
    }

    #[tokio::test]
    async fn test_response_insert_unknown_references() {
        let (_handle, db) = connection::open_test().await;
        let err = db
            .insert(Response::new(5, "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Reference { field: "member_id", .. }));

        let m = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        let err = db
            .insert(Response {
                target_project_id: Some(5),
                ..Response::new(m.id, "Hello")
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Reference {
                field: "target_project_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_response_update_content() {
        let (_handle, db) = connection::open_test().await;
        let m = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        let response = db.insert(Response::new(m.id, "Helo")).await.unwrap();
        let update = ResponseUpdate {
            content: Some("Hello".to_string()),
            ..Default::default()
        };
        let updated: Response = db.update(response.id, update).await.unwrap();
        assert_eq!(updated.content, "Hello");
        assert_eq!(updated.date, response.date);
    }
}
