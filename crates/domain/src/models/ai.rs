//! AI summary request and response payloads.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::calculators::ToolKind;

/// Upper bound on a serialized tool result or input set accepted in a request.
pub const MAX_RESULT_BYTES: usize = 32 * 1024;

pub(crate) fn validate_result_size(value: &serde_json::Value) -> Result<(), ValidationError> {
    let size = serde_json::to_vec(value).map(|v| v.len()).unwrap_or(usize::MAX);
    if value.is_object() && size <= MAX_RESULT_BYTES {
        Ok(())
    } else {
        let mut err = ValidationError::new("result");
        err.message = Some("Result must be a JSON object of at most 32 KiB".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AiSummaryRequest {
    pub tool: ToolKind,

    #[validate(custom(function = "validate_result_size"))]
    pub result: serde_json::Value,

    #[validate(length(max = 500, message = "Question must be at most 500 characters"))]
    pub question: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSummaryResponse {
    pub ok: bool,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_validation() {
        let req: AiSummaryRequest = serde_json::from_value(json!({
            "tool": "cpp",
            "result": { "selected": { "monthly_benefit": 640.0 } },
            "question": "Should I start at 60?"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let not_object = AiSummaryRequest {
            tool: ToolKind::Tax,
            result: json!("text"),
            question: None,
        };
        assert!(not_object.validate().is_err());
    }

    #[test]
    fn test_oversized_result_rejected() {
        let req = AiSummaryRequest {
            tool: ToolKind::Loan,
            result: json!({ "blob": "x".repeat(MAX_RESULT_BYTES) }),
            question: None,
        };
        assert!(req.validate().is_err());
    }
}
