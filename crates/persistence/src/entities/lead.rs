//! Lead entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Lead, LeadStatus};

/// Database enum for lead status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
pub enum LeadStatusDb {
    New,
    Contacted,
    Qualified,
    Converted,
    Closed,
}

impl From<LeadStatusDb> for LeadStatus {
    fn from(db: LeadStatusDb) -> Self {
        match db {
            LeadStatusDb::New => LeadStatus::New,
            LeadStatusDb::Contacted => LeadStatus::Contacted,
            LeadStatusDb::Qualified => LeadStatus::Qualified,
            LeadStatusDb::Converted => LeadStatus::Converted,
            LeadStatusDb::Closed => LeadStatus::Closed,
        }
    }
}

impl From<LeadStatus> for LeadStatusDb {
    fn from(status: LeadStatus) -> Self {
        match status {
            LeadStatus::New => LeadStatusDb::New,
            LeadStatus::Contacted => LeadStatusDb::Contacted,
            LeadStatus::Qualified => LeadStatusDb::Qualified,
            LeadStatus::Converted => LeadStatusDb::Converted,
            LeadStatus::Closed => LeadStatusDb::Closed,
        }
    }
}

/// Database row mapping for the leads table.
#[derive(Debug, Clone, FromRow)]
pub struct LeadEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub source: String,
    pub tool_result: serde_json::Value,
    pub status: LeadStatusDb,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadEntity> for Lead {
    fn from(entity: LeadEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            source: entity.source,
            tool_result: entity.tool_result,
            status: entity.status.into(),
            tags: entity.tags,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let entity = LeadEntity {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: None,
            source: "resp".to_string(),
            tool_result: serde_json::json!({ "tool": "resp" }),
            status: LeadStatusDb::Qualified,
            tags: vec!["resp".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let lead: Lead = entity.clone().into();
        assert_eq!(lead.id, entity.id);
        assert_eq!(lead.status, LeadStatus::Qualified);
        assert_eq!(lead.tags, vec!["resp"]);
    }

    #[test]
    fn test_status_conversion_is_symmetric() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Converted,
            LeadStatus::Closed,
        ] {
            let db: LeadStatusDb = status.into();
            assert_eq!(LeadStatus::from(db), status);
        }
    }
}
