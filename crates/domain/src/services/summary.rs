//! Prompt construction for AI summaries of tool results.

use serde::Serialize;

use crate::calculators::ToolKind;

const SYSTEM_PROMPT: &str = "You are an assistant for a Canadian financial advisory firm. \
Explain calculator results in plain language in at most three short paragraphs. \
Do not give individual investment, tax or legal advice. \
Do not invent numbers that are not in the result. \
End by suggesting the reader book a conversation with an advisor.";

/// A chat message in the OpenAI-compatible format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Builds the system and user messages for a summary request.
pub fn build_messages(
    tool: ToolKind,
    result: &serde_json::Value,
    question: Option<&str>,
) -> Vec<ChatMessage> {
    let pretty = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());

    let mut user = format!(
        "Tool: {}\nResult (JSON):\n{}\n",
        tool.display_name(),
        pretty
    );
    match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => user.push_str(&format!("\nThe reader asks: {}\n", q)),
        None => user.push_str("\nSummarize what these numbers mean for the reader.\n"),
    }

    vec![
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_include_tool_and_result() {
        let messages = build_messages(ToolKind::Tax, &json!({ "marginal_rate_percent": 20.5 }), None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("Federal Tax Bracket Calculator"));
        assert!(messages[1].content.contains("20.5"));
        assert!(messages[1].content.contains("Summarize"));
    }

    #[test]
    fn test_question_is_appended() {
        let messages = build_messages(
            ToolKind::Cpp,
            &json!({}),
            Some("  Should I wait until 70?  "),
        );
        assert!(messages[1]
            .content
            .contains("The reader asks: Should I wait until 70?"));
        assert!(!messages[1].content.contains("Summarize"));
    }

    #[test]
    fn test_blank_question_ignored() {
        let messages = build_messages(ToolKind::Loan, &json!({}), Some("   "));
        assert!(messages[1].content.contains("Summarize"));
    }
}
