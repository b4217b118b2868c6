use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{datetime, Error, Result};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AnnouncementFilter {
    pub id: Option<u32>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Announcement {
    pub id: u32,
    pub title: String,
    pub content: String,
    pub date: NaiveDateTime,
    pub author: Option<String>,
}

impl Announcement {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
            content: content.to_string(),
            date: datetime::now(),
            author: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("announcement title is required"));
        }
        if self.content.trim().is_empty() {
            return Err(Error::validation("announcement content is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

impl AnnouncementUpdate {
    pub fn apply(self, announcement: &mut Announcement) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        if let Some(author) = self.author {
            announcement.author = Some(author);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcement_validate() {
        assert!(Announcement::new("Plenum", "Thursday 20:00").validate().is_ok());
        assert!(Announcement::new("Plenum", "").validate().is_err());
        assert!(Announcement::new("", "Thursday 20:00").validate().is_err());
    }
}
