use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{Error, Member, Query, Response, ResponseFilter, Result, Retrieve};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProjectFilter {
    pub id: Option<u32>,
    pub responsible_member_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Soft reference: cleared when the member is deleted
    pub responsible_member_id: Option<u32>,
}

impl Project {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("project title is required"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::validation(format!(
                    "project ends ({}) before it starts ({})",
                    end, start
                )));
            }
        }
        Ok(())
    }

    /// Get the responsible member, if one is assigned
    pub async fn responsible_member<DB>(&self, db: &DB) -> Result<Option<Member>>
    where
        DB: Retrieve<Member, Key = u32>,
    {
        match self.responsible_member_id {
            Some(id) => Ok(Some(db.retrieve(id).await?)),
            None => Ok(None),
        }
    }

    pub async fn responses<DB>(&self, db: &DB) -> Result<Vec<Response>>
    where
        DB: Query<Response, Filter = ResponseFilter>,
    {
        db.query(&ResponseFilter {
            target_project_id: Some(self.id),
            ..Default::default()
        })
        .await
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub responsible_member_id: Option<u32>,
}

impl ProjectUpdate {
    pub fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = Some(description);
        }
        if let Some(start_date) = self.start_date {
            project.start_date = Some(start_date);
        }
        if let Some(end_date) = self.end_date {
            project.end_date = Some(end_date);
        }
        if let Some(member_id) = self.responsible_member_id {
            project.responsible_member_id = Some(member_id);
        }
    }
}
