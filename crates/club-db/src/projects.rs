use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, Connection as _, QueryBuilder, Sqlite};
use tracing::{debug, info};

use club_data::{
    Delete, Error, Insert, Project, ProjectFilter, ProjectUpdate, Query, Result, Retrieve, Update,
};

use crate::{
    results::{check_reference, Id},
    Connection,
};

/// Fetch projects, most recently started first
pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    filter: &ProjectFilter,
) -> Result<Vec<Project>> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            id,
            title,
            description,
            start_date,
            end_date,
            responsible_member_id
        FROM projects
        WHERE 1
        "#,
    );
    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(member_id) = filter.responsible_member_id {
        qry.push(" AND responsible_member_id = ").push_bind(member_id);
    }
    qry.push(" ORDER BY start_date DESC, id DESC");

    let projects: Vec<Project> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(projects)
}

async fn fetch_one(conn: &mut SqliteConnection, id: u32) -> Result<Project> {
    let filter = ProjectFilter {
        id: Some(id),
        ..Default::default()
    };
    fetch(conn, &filter)
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("project", id))
}

async fn check_responsible(conn: &mut SqliteConnection, project: &Project) -> Result<()> {
    match project.responsible_member_id {
        Some(member_id) => {
            check_reference(conn, "members", member_id, "project", "responsible_member_id").await
        }
        None => Ok(()),
    }
}

#[async_trait]
impl Query<Project> for Connection {
    type Filter = ProjectFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Project>> {
        let mut conn = self.lock().await;
        let projects = fetch(&mut conn, filter).await?;
        debug!(count = projects.len(), "queried projects");
        Ok(projects)
    }
}

#[async_trait]
impl Retrieve<Project> for Connection {
    type Key = u32;

    async fn retrieve(&self, project_id: Self::Key) -> Result<Project> {
        let mut conn = self.lock().await;
        fetch_one(&mut conn, project_id).await
    }
}

#[async_trait]
impl Insert<Project> for Connection {
    /// Create project. A responsible member must exist if one is given.
    async fn insert(&self, project: Project) -> Result<Project> {
        project.validate()?;

        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;
        check_responsible(&mut tx, &project).await?;

        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO projects (
                title,
                description,
                start_date,
                end_date,
                responsible_member_id
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(project.title.trim().to_string())
            .push_bind(project.description.clone())
            .push_bind(project.start_date)
            .push_bind(project.end_date)
            .push_bind(project.responsible_member_id);
        let insert: Id<u32> = qry
            .push(") RETURNING id ")
            .build_query_as()
            .fetch_one(&mut *tx)
            .await?;

        let project = fetch_one(&mut tx, insert.id).await?;
        tx.commit().await?;

        info!(project_id = project.id, "project created");
        Ok(project)
    }
}

#[async_trait]
impl Update<Project> for Connection {
    type Key = u32;
    type Changes = ProjectUpdate;

    async fn update(&self, project_id: Self::Key, changes: Self::Changes) -> Result<Project> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let mut project = fetch_one(&mut tx, project_id).await?;
        changes.apply(&mut project);
        project.validate()?;
        check_responsible(&mut tx, &project).await?;

        QueryBuilder::<Sqlite>::new("UPDATE projects SET")
            .push(" title = ")
            .push_bind(project.title.trim().to_string())
            .push(", description = ")
            .push_bind(project.description.clone())
            .push(", start_date = ")
            .push_bind(project.start_date)
            .push(", end_date = ")
            .push_bind(project.end_date)
            .push(", responsible_member_id = ")
            .push_bind(project.responsible_member_id)
            .push(" WHERE id = ")
            .push_bind(project_id)
            .build()
            .execute(&mut *tx)
            .await?;

        let project = fetch_one(&mut tx, project_id).await?;
        tx.commit().await?;

        info!(project_id, "project updated");
        Ok(project)
    }
}

#[async_trait]
impl Delete<Project> for Connection {
    type Key = u32;

    /// Delete project. Responses about it are kept without a target.
    async fn delete(&self, project_id: Self::Key) -> Result<Project> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let project = fetch_one(&mut tx, project_id).await?;
        QueryBuilder::<Sqlite>::new("DELETE FROM projects WHERE id = ")
            .push_bind(project_id)
            .build()
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(project_id, "project deleted");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::connection;

    use club_data::{Member, Response};

    #[tokio::test]
    async fn test_project_insert() {
        let (_handle, db) = connection::open_test().await;
        let m = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        let project = Project {
            description: Some("Soldering workshop badge".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            responsible_member_id: Some(m.id),
            ..Project::new("Badge")
        };
        let project = db.insert(project).await.unwrap();
        assert!(project.id > 0);
        assert_eq!(project.title, "Badge");
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(project.end_date, NaiveDate::from_ymd_opt(2024, 3, 1));

        let responsible = project.responsible_member(&db).await.unwrap();
        assert_eq!(responsible.map(|m| m.id), Some(m.id));
    }

    #[tokio::test]
    async fn test_project_insert_unknown_responsible() {
        let (_handle, db) = connection::open_test().await;
        let project = Project {
            responsible_member_id: Some(4242),
            ..Project::new("Badge")
        };
        let err = db.insert(project).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Reference {
                entity: "project",
                field: "responsible_member_id",
                id: 4242,
            }
        ));

        let projects: Vec<Project> = db.query(&ProjectFilter::default()).await.unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn test_project_update_unknown_responsible() {
        let (_handle, db) = connection::open_test().await;
        let project = db.insert(Project::new("Badge")).await.unwrap();

        let update = ProjectUpdate {
            title: Some("Badge v2".to_string()),
            responsible_member_id: Some(4242),
            ..Default::default()
        };
        let result: Result<Project> = db.update(project.id, update).await;
        assert!(matches!(result, Err(Error::Reference { .. })));

        // Nothing was written
        let project: Project = db.retrieve(project.id).await.unwrap();
        assert_eq!(project.title, "Badge");
    }

    #[tokio::test]
    async fn test_project_query_newest_start_first() {
        let (_handle, db) = connection::open_test().await;
        for (title, month) in [("Old", 1), ("New", 9), ("Mid", 5)] {
            db.insert(Project {
                start_date: NaiveDate::from_ymd_opt(2024, month, 1),
                ..Project::new(title)
            })
            .await
            .unwrap();
        }
        let projects: Vec<Project> = db.query(&ProjectFilter::default()).await.unwrap();
        let titles: Vec<&str> = projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Mid", "Old"]);
    }

    #[tokio::test]
    async fn test_project_delete_keeps_responses() {
        let (_handle, db) = connection::open_test().await;
        let m = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        let project = db.insert(Project::new("Badge")).await.unwrap();
        let response = db
            .insert(Response {
                target_project_id: Some(project.id),
                ..Response::new(m.id, "I can help with the PCB")
            })
            .await
            .unwrap();
        assert_eq!(project.responses(&db).await.unwrap().len(), 1);

        let _: Project = db.delete(project.id).await.unwrap();

        let response: Response = db.retrieve(response.id).await.unwrap();
        assert_eq!(response.target_project_id, None);
    }
}
