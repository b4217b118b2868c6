use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{datetime, Error, Result};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResponseFilter {
    pub id: Option<u32>,
    pub member_id: Option<u32>,
    pub target_project_id: Option<u32>,
}

/// A message written by a member, optionally about a project
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Response {
    pub id: u32,
    pub content: String,
    pub date: NaiveDateTime,
    pub member_id: u32,
    pub target_project_id: Option<u32>,
}

impl Response {
    pub fn new(member_id: u32, content: &str) -> Self {
        Self {
            id: 0,
            content: content.to_string(),
            date: datetime::now(),
            member_id,
            target_project_id: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(Error::validation("response content is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResponseUpdate {
    pub content: Option<String>,
    pub target_project_id: Option<u32>,
}

impl ResponseUpdate {
    pub fn apply(self, response: &mut Response) {
        if let Some(content) = self.content {
            response.content = content;
        }
        if let Some(project_id) = self.target_project_id {
            response.target_project_id = Some(project_id);
        }
    }
}
