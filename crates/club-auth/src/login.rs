use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use club_data::{datetime, Insert, Member, MemberFilter, Query, Role, Session};

use crate::{password, AdminCredentials, Error, Result};

/// Authenticate a caller and open a session.
///
/// The admin logs in with the shared credentials. Members log in with
/// their email address and either their password, if one is set, or
/// their birth date as `YYYY-MM-DD`.
pub async fn login<DB>(
    db: &DB,
    admin: &AdminCredentials,
    identifier: &str,
    secret: &str,
) -> Result<Session>
where
    DB: Query<Member, Filter = MemberFilter>,
{
    if admin.matches(identifier, secret) {
        info!("admin logged in");
        return Ok(Session::Admin);
    }

    let filter = MemberFilter {
        email: Some(identifier.trim().to_string()),
        ..Default::default()
    };
    let Some(member) = db.query(&filter).await?.pop() else {
        warn!("login failed: unknown identifier");
        return Err(Error::InvalidCredentials);
    };

    if !check_secret(&member, secret) {
        warn!(member_id = member.id, "login failed: wrong secret");
        return Err(Error::InvalidCredentials);
    }
    if !member.is_active() {
        warn!(member_id = member.id, status = %member.status, "login refused");
        return Err(Error::Disabled(member.status));
    }

    info!(member_id = member.id, "member logged in");
    Ok(Session::Member {
        member_id: member.id,
        role: member.role,
    })
}

fn check_secret(member: &Member, secret: &str) -> bool {
    match (&member.password, member.birth_date) {
        (Some(hash), _) => password::verify(secret, hash),
        (None, Some(birth_date)) => datetime::format_date(birth_date) == secret,
        (None, None) => false,
    }
}

/// Self registration of a new member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    /// Plain text, hashed before it is stored
    pub password: Option<String>,
}

/// Create a member and log in as that member.
/// New members always get the plain member role.
pub async fn signup<DB>(db: &DB, signup: Signup) -> Result<(Member, Session)>
where
    DB: Insert<Member>,
{
    // Without either there is nothing to log in with later
    if signup.password.is_none() && signup.birth_date.is_none() {
        return Err(club_data::Error::validation("a password or birth date is required").into());
    }

    let member = Member {
        birth_date: signup.birth_date,
        password: signup.password.as_deref().map(password::hash),
        role: Role::Member,
        ..Member::new(&signup.first_name, &signup.last_name, &signup.email)
    };
    let member = db.insert(member).await?;

    info!(member_id = member.id, "member signed up");
    let session = Session::Member {
        member_id: member.id,
        role: member.role,
    };
    Ok((member, session))
}

#[cfg(test)]
mod tests {
    use super::*;

    use club_data::{MemberUpdate, Retrieve, Status, Update};
    use club_db::connection;

    fn admin() -> AdminCredentials {
        AdminCredentials::new("admin", Some("hunter2"))
    }

    #[tokio::test]
    async fn test_login_with_birth_date() {
        let (_handle, db) = connection::open_test().await;
        let member = db
            .insert(Member {
                birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
                ..Member::new("A", "Member", "a@x.com")
            })
            .await
            .unwrap();

        let session = login(&db, &admin(), "a@x.com", "2000-01-01").await.unwrap();
        assert_eq!(
            session,
            Session::Member {
                member_id: member.id,
                role: Role::Member
            }
        );
        assert_eq!(session.member_id(), Some(member.id));

        let err = login(&db, &admin(), "a@x.com", "2000-01-02")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (_handle, db) = connection::open_test().await;
        let err = login(&db, &admin(), "nobody@x.com", "2000-01-01")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_without_birth_date_or_password() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member::new("A", "Member", "a@x.com"))
            .await
            .unwrap();
        let err = login(&db, &admin(), "a@x.com", "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_admin() {
        let (_handle, db) = connection::open_test().await;
        let session = login(&db, &admin(), "admin", "hunter2").await.unwrap();
        assert_eq!(session, Session::Admin);

        let err = login(&db, &admin(), "admin", "hunter3").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_member_with_admin_role() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member {
            birth_date: NaiveDate::from_ymd_opt(1970, 1, 1),
            role: Role::Admin,
            ..Member::new("B", "Board", "board@x.com")
        })
        .await
        .unwrap();
        let session = login(&db, &admin(), "board@x.com", "1970-01-01")
            .await
            .unwrap();
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn test_login_inactive_member() {
        let (_handle, db) = connection::open_test().await;
        let member = db
            .insert(Member {
                birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
                ..Member::new("A", "Member", "a@x.com")
            })
            .await
            .unwrap();
        let _: Member = db
            .update(
                member.id,
                MemberUpdate {
                    status: Some(Status::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = login(&db, &admin(), "a@x.com", "2000-01-01")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Disabled(Status::Inactive)));
    }

    #[tokio::test]
    async fn test_password_replaces_birth_date() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member {
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            password: Some(password::hash_with_rounds("fnord23", 1000)),
            ..Member::new("A", "Member", "a@x.com")
        })
        .await
        .unwrap();

        assert!(login(&db, &admin(), "a@x.com", "fnord23").await.is_ok());
        let err = login(&db, &admin(), "a@x.com", "2000-01-01")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_signup() {
        let (_handle, db) = connection::open_test().await;
        let (member, session) = signup(
            &db,
            Signup {
                first_name: "New".to_string(),
                last_name: "Member".to_string(),
                email: "new@x.com".to_string(),
                password: Some("fnord23".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(member.role, Role::Member);
        assert_eq!(session.member_id(), Some(member.id));

        // The password is stored hashed
        let stored: Member = db.retrieve(member.id).await.unwrap();
        let hash = stored.password.unwrap();
        assert_ne!(hash, "fnord23");
        assert!(password::verify("fnord23", &hash));

        let session = login(&db, &admin(), "new@x.com", "fnord23").await.unwrap();
        assert_eq!(session.member_id(), Some(member.id));
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member::new("A", "Member", "a@x.com"))
            .await
            .unwrap();
        let err = signup(
            &db,
            Signup {
                first_name: "B".to_string(),
                last_name: "Member".to_string(),
                email: "a@x.com".to_string(),
                birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Data(club_data::Error::DuplicateKey { .. })
        ));
    }

    #[tokio::test]
    async fn test_signup_requires_secret() {
        let (_handle, db) = connection::open_test().await;
        let err = signup(
            &db,
            Signup {
                first_name: "No".to_string(),
                last_name: "Secret".to_string(),
                email: "n@x.com".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Data(club_data::Error::Validation(_))
        ));

        // Nothing was stored
        let members: Vec<Member> = db.query(&MemberFilter::default()).await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_login_secret_must_match_exactly() {
        let (_handle, db) = connection::open_test().await;
        db.insert(Member {
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..Member::new("A", "Member", "a@x.com")
        })
        .await
        .unwrap();

        let err = login(&db, &admin(), "a@x.com", "  2000-01-01\n")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        assert!(login(&db, &admin(), "a@x.com", "2000-01-01").await.is_ok());
    }
}
