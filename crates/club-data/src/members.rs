use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    datetime, Error, EventParticipant, ParticipantFilter, Payment, PaymentFilter, Query, Response,
    ResponseFilter, Result,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(Error::validation(format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Inactive => write!(f, "inactive"),
            Status::Suspended => write!(f, "suspended"),
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            "suspended" => Ok(Status::Suspended),
            other => Err(Error::validation(format!("unknown status '{}'", other))),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberFilter {
    pub id: Option<u32>,
    /// Substring of the first or last name, case insensitive
    pub name: Option<String>,
    /// Exact email address
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
    pub status: Status,
    pub join_date: NaiveDate,
}

impl Default for Member {
    fn default() -> Self {
        Self {
            id: 0,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: None,
            birth_date: None,
            role: Role::default(),
            status: Status::default(),
            join_date: datetime::today(),
        }
    }
}

impl Member {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    /// Name for display: first and last name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Check required fields before writing
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::validation("first name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::validation("last name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }

    /// Get payments of the member
    pub async fn payments<DB>(&self, db: &DB) -> Result<Vec<Payment>>
    where
        DB: Query<Payment, Filter = PaymentFilter>,
    {
        db.query(&PaymentFilter {
            member_id: Some(self.id),
            ..Default::default()
        })
        .await
    }

    /// Get event registrations of the member
    pub async fn participations<DB>(&self, db: &DB) -> Result<Vec<EventParticipant>>
    where
        DB: Query<EventParticipant, Filter = ParticipantFilter>,
    {
        db.query(&ParticipantFilter {
            member_id: Some(self.id),
            ..Default::default()
        })
        .await
    }

    pub async fn responses<DB>(&self, db: &DB) -> Result<Vec<Response>>
    where
        DB: Query<Response, Filter = ResponseFilter>,
    {
        db.query(&ResponseFilter {
            member_id: Some(self.id),
            ..Default::default()
        })
        .await
    }
}

/// Changes to a member. Only fields that are set are written.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Password hash
    pub password: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Option<Role>,
    pub status: Option<Status>,
    pub join_date: Option<NaiveDate>,
}

impl MemberUpdate {
    pub fn apply(self, member: &mut Member) {
        if let Some(first_name) = self.first_name {
            member.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            member.last_name = last_name;
        }
        if let Some(email) = self.email {
            member.email = email;
        }
        if let Some(password) = self.password {
            member.password = Some(password);
        }
        if let Some(birth_date) = self.birth_date {
            member.birth_date = Some(birth_date);
        }
        if let Some(role) = self.role {
            member.role = role;
        }
        if let Some(status) = self.status {
            member.status = status;
        }
        if let Some(join_date) = self.join_date {
            member.join_date = join_date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let member = Member::new("Eris", "Discordia", "eris@example.org");
        assert_eq!(member.full_name(), "Eris Discordia");
    }

    #[test]
    fn test_member_defaults() {
        let member = Member::new("Eris", "Discordia", "eris@example.org");
        assert_eq!(member.role, Role::Member);
        assert_eq!(member.status, Status::Active);
        assert_eq!(member.join_date, datetime::today());
        assert!(member.is_active());
    }

    #[test]
    fn test_validate() {
        assert!(Member::new("Eris", "Discordia", "eris@example.org")
            .validate()
            .is_ok());
        assert!(Member::new("", "Discordia", "eris@example.org")
            .validate()
            .is_err());
        assert!(Member::new("Eris", "Discordia", "not-an-email")
            .validate()
            .is_err());
    }

    #[test]
    fn test_update_apply_partial() {
        let mut member = Member::new("Eris", "Discordia", "eris@example.org");
        let update = MemberUpdate {
            status: Some(Status::Inactive),
            ..Default::default()
        };
        update.apply(&mut member);
        assert_eq!(member.status, Status::Inactive);
        assert_eq!(member.first_name, "Eris");
        assert_eq!(member.email, "eris@example.org");
        assert_eq!(member.role, Role::Member);
    }

    #[test]
    fn test_parse_role_and_status() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" inactive ".parse::<Status>().unwrap(), Status::Inactive);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_password_is_not_serialized() {
        let member = Member {
            password: Some("pbkdf2-sha256$1$00$00".to_string()),
            ..Member::new("Eris", "Discordia", "eris@example.org")
        };
        let json = serde_json::to_string(&member).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"role\":\"member\""));
    }
}
