//! Event and resource records.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use devhub_core::{DomainError, DomainResult, Entity, RecordId};

/// A record kept in a [`ContentStore`](crate::ContentStore).
pub trait Record: Entity<Id = RecordId> + Clone {
    /// Collection name used in logs and error messages.
    const KIND: &'static str;

    /// Check required fields before the record is accepted.
    fn validate(&self) -> DomainResult<()>;

    fn title(&self) -> &str;
}

/// A community event.
///
/// `date` is `YYYY-MM-DD` and `time` is `HH:MM`, the shapes HTML date/time
/// inputs produce. `time`, `location` and `description` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: RecordId,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

impl Event {
    /// Unsaved event with only the required fields set.
    pub fn draft(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, time: impl Into<String>, location: impl Into<String>) -> Self {
        self.time = time.into();
        self.location = location.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Entity for Event {
    type Id = RecordId;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl Record for Event {
    const KIND: &'static str = "event";

    fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("event title is required"));
        }
        if self.date.trim().is_empty() {
            return Err(DomainError::validation("event date is required"));
        }
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| DomainError::validation("event date must be YYYY-MM-DD"))?;
        if !self.time.trim().is_empty() {
            NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
                .map_err(|_| DomainError::validation("event time must be HH:MM"))?;
        }
        Ok(())
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// A learning resource link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: RecordId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl Resource {
    /// Unsaved resource with only the required fields set.
    pub fn draft(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Entity for Resource {
    type Id = RecordId;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl Record for Resource {
    const KIND: &'static str = "resource";

    fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("resource title is required"));
        }
        let url = self.url.trim();
        if url.is_empty() {
            return Err(DomainError::validation("resource url is required"));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(DomainError::validation("resource url must start with http:// or https://"));
        }
        Ok(())
    }

    fn title(&self) -> &str {
        &self.title
    }
}
