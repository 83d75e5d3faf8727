//! Lead domain model and lead-capture payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::calculators::ToolKind;

/// Lead source tag for the contact form.
pub const CONTACT_SOURCE: &str = "contact";

/// Pipeline status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Closed,
}

impl LeadStatus {
    /// Drip emails stop once the lead has become a client or was closed.
    pub fn accepts_drip(&self) -> bool {
        !matches!(self, LeadStatus::Converted | LeadStatus::Closed)
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadStatus::New => write!(f, "new"),
            LeadStatus::Contacted => write!(f, "contacted"),
            LeadStatus::Qualified => write!(f, "qualified"),
            LeadStatus::Converted => write!(f, "converted"),
            LeadStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "converted" => Ok(LeadStatus::Converted),
            "closed" => Ok(LeadStatus::Closed),
            other => Err(format!("Unknown lead status: {}", other)),
        }
    }
}

/// A prospective client captured from a tool or the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub source: String,
    pub tool_result: serde_json::Value,
    pub status: LeadStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// First word of the name, used to greet the lead in emails.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }
}

/// Request payload for submitting a tool result as a lead.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ToolLeadRequest {
    #[validate(custom(function = "shared::validation::validate_name"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_email"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    pub tool: ToolKind,

    /// Calculator inputs as entered, kept alongside the result.
    #[serde(default)]
    #[validate(custom(function = "crate::models::ai::validate_result_size"))]
    pub inputs: Option<serde_json::Value>,

    #[validate(custom(function = "crate::models::ai::validate_result_size"))]
    pub result: serde_json::Value,
}

/// Request payload for the contact form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ContactRequest {
    #[validate(custom(function = "shared::validation::validate_name"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_email"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    #[validate(
        length(min = 1, max = 5000, message = "Message must be 1-5000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub message: String,
}

/// Normalized lead submission handed to the intake service, whatever form it came from.
#[derive(Debug, Clone)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub source: String,
    pub tool: Option<ToolKind>,
    pub tool_result: serde_json::Value,
}

impl From<ToolLeadRequest> for LeadSubmission {
    fn from(req: ToolLeadRequest) -> Self {
        let mut tool_result = serde_json::json!({
            "tool": req.tool,
            "result": req.result,
        });
        if let Some(inputs) = req.inputs {
            tool_result["inputs"] = inputs;
        }

        Self {
            name: req.name.trim().to_string(),
            email: shared::validation::normalize_email(&req.email),
            phone: clean_phone(req.phone),
            source: req.tool.as_str().to_string(),
            tool: Some(req.tool),
            tool_result,
        }
    }
}

impl From<ContactRequest> for LeadSubmission {
    fn from(req: ContactRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            email: shared::validation::normalize_email(&req.email),
            phone: clean_phone(req.phone),
            source: CONTACT_SOURCE.to_string(),
            tool: None,
            tool_result: serde_json::json!({ "message": req.message.trim() }),
        }
    }
}

fn clean_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

/// Response for a lead submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadIntakeResponse {
    pub ok: bool,
    pub lead_id: Uuid,
    /// True when an existing lead with the same email was updated.
    pub updated: bool,
    pub email_sent: bool,
}

/// Lead as returned by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct LeadResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub source: String,
    pub tool_result: serde_json::Value,
    pub status: LeadStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            source: lead.source,
            tool_result: lead.tool_result,
            status: lead.status,
            tags: lead.tags,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListLeadsResponse {
    pub ok: bool,
    pub leads: Vec<LeadResponse>,
    pub total: i64,
}

fn default_limit() -> i64 {
    50
}

/// Query parameters for listing leads.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListLeadsQuery {
    pub status: Option<LeadStatus>,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
    pub limit: i64,

    #[serde(default)]
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: i64,
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > 20 || tags.iter().any(|t| t.trim().is_empty() || t.len() > 40) {
        let mut err = ValidationError::new("tags");
        err.message = Some("Up to 20 tags of 1-40 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Admin update of a lead. Only status and tags are editable.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLeadRequest {
    pub status: Option<LeadStatus>,

    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
}

impl UpdateLeadRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.tags.is_none()
    }

    /// Tags trimmed, lower-cased and de-duplicated in first-seen order.
    pub fn normalized_tags(&self) -> Option<Vec<String>> {
        self.tags.as_ref().map(|tags| {
            let mut out: Vec<String> = Vec::with_capacity(tags.len());
            for tag in tags {
                let tag = tag.trim().to_lowercase();
                if !out.contains(&tag) {
                    out.push(tag);
                }
            }
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use serde_json::json;

    fn lead(name: &str, status: LeadStatus) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: "jane@example.com".to_string(),
            phone: None,
            source: "loan".to_string(),
            tool_result: json!({}),
            status,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Converted,
            LeadStatus::Closed,
        ] {
            assert_eq!(status.to_string().parse::<LeadStatus>().unwrap(), status);
        }
        assert!("lost".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_accepts_drip() {
        assert!(LeadStatus::New.accepts_drip());
        assert!(LeadStatus::Qualified.accepts_drip());
        assert!(!LeadStatus::Converted.accepts_drip());
        assert!(!LeadStatus::Closed.accepts_drip());
    }

    #[test]
    fn test_first_name() {
        assert_eq!(lead("Jane Q. Doe", LeadStatus::New).first_name(), "Jane");
        assert_eq!(lead("   ", LeadStatus::New).first_name(), "there");
    }

    #[test]
    fn test_tool_lead_request_validation() {
        let req: ToolLeadRequest = serde_json::from_value(json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "416-555-0199",
            "tool": "loan",
            "result": { "payment": 1753.77 }
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let bad: ToolLeadRequest = serde_json::from_value(json!({
            "name": "",
            "email": "not-an-email",
            "tool": "tax",
            "result": [1, 2, 3]
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("result"));
    }

    #[test]
    fn test_padded_fields_validate_as_trimmed() {
        let padded: ToolLeadRequest = serde_json::from_value(json!({
            "name": "  Jane ",
            "email": " jane@example.com ",
            "tool": "savings",
            "result": { "final_balance": 100.0 }
        }))
        .unwrap();
        assert!(padded.validate().is_ok());

        let blank = ContactRequest {
            name: "   ".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
            message: "  \n ".to_string(),
        };
        let errors = blank.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("message"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_oversized_tool_payload_rejected() {
        let blob = "x".repeat(crate::models::ai::MAX_RESULT_BYTES);
        let req: ToolLeadRequest = serde_json::from_value(json!({
            "name": "Jane",
            "email": "jane@example.com",
            "tool": "loan",
            "inputs": { "blob": blob },
            "result": { "blob": blob }
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("inputs"));
        assert!(fields.contains_key("result"));
    }

    #[test]
    fn test_unknown_tool_is_rejected_at_parse() {
        let result: Result<ToolLeadRequest, _> = serde_json::from_value(json!({
            "name": "Jane",
            "email": "jane@example.com",
            "tool": "crypto",
            "result": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_submission_from_tool_request_normalizes() {
        let req = ToolLeadRequest {
            name: "  Jane Doe ".to_string(),
            email: " Jane@Example.COM".to_string(),
            phone: Some("   ".to_string()),
            tool: ToolKind::Savings,
            inputs: Some(json!({ "years": 10 })),
            result: json!({ "final_balance": 100.0 }),
        };
        let submission = LeadSubmission::from(req);
        assert_eq!(submission.name, "Jane Doe");
        assert_eq!(submission.email, "jane@example.com");
        assert_eq!(submission.phone, None);
        assert_eq!(submission.source, "savings");
        assert_eq!(submission.tool_result["tool"], "savings");
        assert_eq!(submission.tool_result["inputs"]["years"], 10);
        assert_eq!(submission.tool_result["result"]["final_balance"], 100.0);
    }

    #[test]
    fn test_submission_from_contact_request() {
        let req = ContactRequest {
            name: "Sam".to_string(),
            email: "SAM@example.com".to_string(),
            phone: Some("(416) 555-0100".to_string()),
            message: " Can we talk about my RRSP? ".to_string(),
        };
        let submission = LeadSubmission::from(req);
        assert_eq!(submission.source, CONTACT_SOURCE);
        assert_eq!(submission.tool, None);
        assert_eq!(submission.phone.as_deref(), Some("(416) 555-0100"));
        assert_eq!(submission.tool_result["message"], "Can we talk about my RRSP?");
    }

    #[test]
    fn test_update_request_tags() {
        let req = UpdateLeadRequest {
            status: None,
            tags: Some(vec!["Hot".into(), " hot ".into(), "retirement".into()]),
        };
        assert!(req.validate().is_ok());
        assert_eq!(
            req.normalized_tags().unwrap(),
            vec!["hot".to_string(), "retirement".to_string()]
        );
        assert!(!req.is_empty());

        let too_many = UpdateLeadRequest {
            status: None,
            tags: Some((0..21).map(|i| format!("t{}", i)).collect()),
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListLeadsQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
        assert!(query.status.is_none());
    }

    #[test]
    fn test_generated_contacts_validate_and_normalize() {
        for _ in 0..20 {
            let name: String = Name().fake();
            let email: String = SafeEmail().fake();
            let req = ContactRequest {
                name: name.clone(),
                email: email.to_uppercase(),
                phone: None,
                message: "Hello".to_string(),
            };
            assert!(req.validate().is_ok(), "{} <{}>", name, email);

            let submission = LeadSubmission::from(req);
            assert_eq!(submission.email, email.to_lowercase());
        }
    }
}
