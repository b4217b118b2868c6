use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, Connection as _, QueryBuilder, Sqlite};
use tracing::{debug, info};

use club_data::{
    Delete, Error, Insert, Member, MemberFilter, MemberUpdate, Query, Result, Retrieve, Update,
};

use crate::{
    results::{Id, OnUnique},
    Connection,
};

/// Escape `text` so it matches literally in a `LIKE ... ESCAPE '\'` pattern
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fetch members matching the filter, ordered by name
pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    filter: &MemberFilter,
) -> Result<Vec<Member>> {
    let mut qry = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            id,
            first_name,
            last_name,
            email,
            password,
            birth_date,
            role,
            status,
            join_date
        FROM members
        WHERE 1
        "#,
    );

    if let Some(id) = filter.id {
        qry.push(" AND id = ").push_bind(id);
    }
    if let Some(name) = filter.name.clone() {
        qry.push(" AND (first_name || ' ' || last_name) LIKE ")
            .push_bind(format!("%{}%", escape_like(&name)))
            .push(" ESCAPE '\\'");
    }
    if let Some(email) = filter.email.clone() {
        qry.push(" AND email = ").push_bind(email);
    }
    qry.push(" ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, id");

    let members: Vec<Member> = qry.build_query_as().fetch_all(&mut *conn).await?;
    Ok(members)
}

pub(crate) async fn fetch_one(conn: &mut SqliteConnection, id: u32) -> Result<Member> {
    let filter = MemberFilter {
        id: Some(id),
        ..Default::default()
    };
    fetch(conn, &filter)
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("member", id))
}

/// Fail if another member already uses the email address
async fn check_email(conn: &mut SqliteConnection, email: &str, own_id: Option<u32>) -> Result<()> {
    let mut qry = QueryBuilder::<Sqlite>::new("SELECT id FROM members WHERE email = ");
    qry.push_bind(email.to_string());
    if let Some(id) = own_id {
        qry.push(" AND id <> ").push_bind(id);
    }
    let taken: Option<Id<u32>> = qry.build_query_as().fetch_optional(&mut *conn).await?;
    match taken {
        Some(_) => Err(duplicate_email(email)),
        None => Ok(()),
    }
}

fn duplicate_email(email: &str) -> Error {
    Error::DuplicateKey {
        entity: "member",
        field: "email",
        value: email.to_string(),
    }
}

#[async_trait]
impl Query<Member> for Connection {
    type Filter = MemberFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let members = fetch(&mut conn, filter).await?;
        debug!(count = members.len(), "queried members");
        Ok(members)
    }
}

#[async_trait]
impl Retrieve<Member> for Connection {
    type Key = u32;

    async fn retrieve(&self, member_id: Self::Key) -> Result<Member> {
        let mut conn = self.lock().await;
        fetch_one(&mut conn, member_id).await
    }
}

#[async_trait]
impl Insert<Member> for Connection {
    /// Create member. The email must not be in use.
    async fn insert(&self, member: Member) -> Result<Member> {
        member.validate()?;

        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;
        check_email(&mut tx, &member.email, None).await?;

        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO members (
                first_name,
                last_name,
                email,
                password,
                birth_date,
                role,
                status,
                join_date
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(member.first_name.trim().to_string())
            .push_bind(member.last_name.trim().to_string())
            .push_bind(member.email.trim().to_string())
            .push_bind(member.password.clone())
            .push_bind(member.birth_date)
            .push_bind(member.role)
            .push_bind(member.status)
            .push_bind(member.join_date);
        let insert: Id<u32> = qry
            .push(") RETURNING id ")
            .build_query_as()
            .fetch_one(&mut *tx)
            .await
            .on_unique(|| duplicate_email(&member.email))?;

        let member = fetch_one(&mut tx, insert.id).await?;
        tx.commit().await?;

        info!(member_id = member.id, "member added");
        Ok(member)
    }
}

#[async_trait]
impl Update<Member> for Connection {
    type Key = u32;
    type Changes = MemberUpdate;

    /// Update member, keeping all fields that are not changed
    async fn update(&self, member_id: Self::Key, changes: Self::Changes) -> Result<Member> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let mut member = fetch_one(&mut tx, member_id).await?;
        changes.apply(&mut member);
        member.validate()?;
        check_email(&mut tx, &member.email, Some(member_id)).await?;

        QueryBuilder::<Sqlite>::new("UPDATE members SET")
            .push(" first_name = ")
            .push_bind(member.first_name.trim().to_string())
            .push(", last_name = ")
            .push_bind(member.last_name.trim().to_string())
            .push(", email = ")
            .push_bind(member.email.trim().to_string())
            .push(", password = ")
            .push_bind(member.password.clone())
            .push(", birth_date = ")
            .push_bind(member.birth_date)
            .push(", role = ")
            .push_bind(member.role)
            .push(", status = ")
            .push_bind(member.status)
            .push(", join_date = ")
            .push_bind(member.join_date)
            .push(" WHERE id = ")
            .push_bind(member_id)
            .build()
            .execute(&mut *tx)
            .await
            .on_unique(|| duplicate_email(&member.email))?;

        let member = fetch_one(&mut tx, member_id).await?;
        tx.commit().await?;

        info!(member_id, "member updated");
        Ok(member)
    }
}

#[async_trait]
impl Delete<Member> for Connection {
    type Key = u32;

    /// Delete member with its payments, registrations and responses.
    /// Projects and events keep existing without a responsible member.
    async fn delete(&self, member_id: Self::Key) -> Result<Member> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        let member = fetch_one(&mut tx, member_id).await?;
        QueryBuilder::<Sqlite>::new("DELETE FROM members WHERE id = ")
            .push_bind(member_id)
            .build()
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(member_id, "member deleted");
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::connection;

    use club_data::{
        Event, EventParticipant, ParticipantFilter, Payment, PaymentFilter, Project, Response,
        ResponseFilter, Role, Status,
    };

    #[tokio::test]
    async fn test_member_insert() {
        let (_handle, db) = connection::open_test().await;
        let birth_date = NaiveDate::from_ymd_opt(1990, 5, 23).unwrap();
        let member = Member {
            birth_date: Some(birth_date),
            role: Role::Admin,
            ..Member::new("Test", "Member", "mail@test-member.club")
        };
        let member = db.insert(member).await.unwrap();

        assert!(member.id > 0);
        assert_eq!(member.first_name, "Test");
        assert_eq!(member.last_name, "Member");
        assert_eq!(member.email, "mail@test-member.club");
        assert_eq!(member.birth_date, Some(birth_date));
        assert_eq!(member.role, Role::Admin);
        assert_eq!(member.status, Status::Active);
        assert_eq!(member.join_date, club_data::datetime::today());

        let found: Member = db.retrieve(member.id).await.unwrap();
        assert_eq!(found, member);
    }

    #[tokio::test]
    async fn test_member_insert_duplicate_email() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member::new("Eris", "Discordia", "eris@club.org"))
            .await
            .unwrap();

        let err = db
            .insert(Member::new("Other", "Person", "eris@club.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { field: "email", .. }));

        // Emails are compared case insensitive
        let err = db
            .insert(Member::new("Other", "Person", "ERIS@club.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));

        let members: Vec<Member> = db.query(&MemberFilter::default()).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].first_name, "Eris");
    }

    #[tokio::test]
    async fn test_member_insert_invalid() {
        let (_handle, db) = connection::open_test().await;
        let err = db
            .insert(Member::new("Eris", "", "eris@club.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_member_update_partial() {
        let (_handle, db) = connection::open_test().await;
        let member = Member {
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..Member::new("Test", "Member", "eris@discordia.club")
        };
        let member = db.insert(member).await.unwrap();

        let update = MemberUpdate {
            status: Some(Status::Inactive),
            ..Default::default()
        };
        let updated: Member = db.update(member.id, update).await.unwrap();
        assert_eq!(updated.status, Status::Inactive);
        assert_eq!(updated.first_name, member.first_name);
        assert_eq!(updated.last_name, member.last_name);
        assert_eq!(updated.email, member.email);
        assert_eq!(updated.birth_date, member.birth_date);
        assert_eq!(updated.role, member.role);
        assert_eq!(updated.join_date, member.join_date);
    }

    #[tokio::test]
    async fn test_member_update_fields() {
        let (_handle, db) = connection::open_test().await;
        let member = db
            .insert(Member::new("Test", "Member", "eris@discordia.club"))
            .await
            .unwrap();

        let update = MemberUpdate {
            first_name: Some("Updated".to_string()),
            email: Some("new@discordia.club".to_string()),
            role: Some(Role::Admin),
            join_date: NaiveDate::from_ymd_opt(1900, 2, 2),
            ..Default::default()
        };
        let member: Member = db.update(member.id, update).await.unwrap();
        assert_eq!(member.first_name, "Updated");
        assert_eq!(member.email, "new@discordia.club");
        assert_eq!(member.role, Role::Admin);
        assert_eq!(member.join_date, NaiveDate::from_ymd_opt(1900, 2, 2).unwrap());

        // Keeping the own email is not a duplicate
        let update = MemberUpdate {
            email: Some("new@discordia.club".to_string()),
            ..Default::default()
        };
        let result: Result<Member> = db.update(member.id, update).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_member_update_duplicate_email() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member::new("A", "One", "a@club.org")).await.unwrap();
        let b = db.insert(Member::new("B", "Two", "b@club.org")).await.unwrap();

        let update = MemberUpdate {
            email: Some("a@club.org".to_string()),
            ..Default::default()
        };
        let result: Result<Member> = db.update(b.id, update).await;
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));

        let b: Member = db.retrieve(b.id).await.unwrap();
        assert_eq!(b.email, "b@club.org");
    }

    #[tokio::test]
    async fn test_member_update_not_found() {
        let (_handle, db) = connection::open_test().await;
        let result: Result<Member> = db.update(4711, MemberUpdate::default()).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "member", id: 4711 })));
    }

    #[tokio::test]
    async fn test_member_query_ordered_by_last_name() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member::new("Anna", "Zorn", "z@club.org")).await.unwrap();
        db.insert(Member::new("Bert", "adler", "a@club.org")).await.unwrap();
        db.insert(Member::new("Carl", "Meier", "m@club.org")).await.unwrap();

        let members: Vec<Member> = db.query(&MemberFilter::default()).await.unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.last_name.as_str()).collect();
        assert_eq!(names, vec!["adler", "Meier", "Zorn"]);
    }

    #[tokio::test]
    async fn test_member_query_name_like() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member::new("Test", "Member", "t@club.org")).await.unwrap();

        let filter = MemberFilter {
            name: Some("tEsT MeMber".to_string()),
            ..MemberFilter::default()
        };
        let members: Vec<Member> = db.query(&filter).await.unwrap();
        assert_eq!(members.len(), 1);

        let filter = MemberFilter {
            name: Some("f3st MeMber".to_string()),
            ..MemberFilter::default()
        };
        let members: Vec<Member> = db.query(&filter).await.unwrap();
        assert_eq!(members.len(), 0);
    }

    #[tokio::test]
    async fn test_member_query_name_matches_wildcards_literally() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member::new("Test", "Member", "t@club.org")).await.unwrap();
        db.insert(Member::new("Under_score", "Member", "u@club.org"))
            .await
            .unwrap();

        let query = |name: &str| MemberFilter {
            name: Some(name.to_string()),
            ..MemberFilter::default()
        };
        let members: Vec<Member> = db.query(&query("%")).await.unwrap();
        assert!(members.is_empty());

        let members: Vec<Member> = db.query(&query("_")).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].first_name, "Under_score");

        let members: Vec<Member> = db.query(&query("T\\st")).await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_member_retrieve_not_found() {
        let (_handle, db) = connection::open_test().await;
        let result: Result<Member> = db.retrieve(23).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_member_delete_cascades() {
        let (_handle, db) = connection::open_test().await;
        let member = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        let other = db
            .insert(Member::new("Other", "Member", "o@club.org"))
            .await
            .unwrap();

        db.insert(Payment::new(member.id, 20.0)).await.unwrap();
        db.insert(Payment::new(other.id, 20.0)).await.unwrap();
        let event = db
            .insert(Event::new("Plenum", NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()))
            .await
            .unwrap();
        event.register(&db, member.id).await.unwrap();
        event.register(&db, other.id).await.unwrap();
        db.insert(Response::new(member.id, "count me in")).await.unwrap();
        let project = db
            .insert(Project {
                responsible_member_id: Some(member.id),
                ..Project::new("Badge")
            })
            .await
            .unwrap();

        let deleted: Member = db.delete(member.id).await.unwrap();
        assert_eq!(deleted.id, member.id);

        let result: Result<Member> = db.retrieve(member.id).await;
        assert!(result.unwrap_err().is_not_found());

        let payments: Vec<Payment> = db.query(&PaymentFilter::default()).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].member_id, other.id);

        let participants: Vec<EventParticipant> =
            db.query(&ParticipantFilter::default()).await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].member_id, other.id);

        let responses: Vec<Response> = db.query(&ResponseFilter::default()).await.unwrap();
        assert!(responses.is_empty());

        // The project survives without a responsible member
        let project: Project = db.retrieve(project.id).await.unwrap();
        assert_eq!(project.responsible_member_id, None);
    }

    #[tokio::test]
    async fn test_member_delete_not_found() {
        let (_handle, db) = connection::open_test().await;
        let result: Result<Member> = db.delete(42).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_member_get_related_payments() {
        let (_handle, db) = connection::open_test().await;
        let m = db
            .insert(Member::new("Test", "Member", "t@club.org"))
            .await
            .unwrap();
        db.insert(Payment::new(m.id, 10.0)).await.unwrap();
        db.insert(Payment::new(m.id, 12.5)).await.unwrap();

        let payments = m.payments(&db).await.unwrap();
        assert_eq!(payments.len(), 2);
    }
}
