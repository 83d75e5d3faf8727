//! Follow-up email sequence sent to new leads.

use chrono::{DateTime, Duration, Utc};

use crate::calculators::ToolKind;
use crate::models::DripMetadata;
use shared::html::escape_html;

/// One step of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DripStep {
    pub step: u32,
    pub delay_days: i64,
    pub subject: &'static str,
}

/// The sequence, in send order.
pub const DRIP_SEQUENCE: [DripStep; 3] = [
    DripStep {
        step: 1,
        delay_days: 1,
        subject: "A closer look at your numbers",
    },
    DripStep {
        step: 2,
        delay_days: 3,
        subject: "Three questions worth asking your advisor",
    },
    DripStep {
        step: 3,
        delay_days: 7,
        subject: "Ready when you are",
    },
];

/// Failed sends after which a step is abandoned.
pub const MAX_DRIP_ATTEMPTS: u32 = 3;

/// Whether a step that has now failed `attempts` times should stop retrying.
pub fn exhausted(attempts: u32) -> bool {
    attempts >= MAX_DRIP_ATTEMPTS
}

pub fn step(step: u32) -> Option<&'static DripStep> {
    DRIP_SEQUENCE.iter().find(|s| s.step == step)
}

/// Metadata for each `drip_scheduled` event of a lead created at `created_at`.
pub fn schedule(created_at: DateTime<Utc>) -> Vec<DripMetadata> {
    DRIP_SEQUENCE
        .iter()
        .map(|s| DripMetadata {
            step: s.step,
            send_at: created_at + Duration::days(s.delay_days),
            sent: false,
            attempts: 0,
            failed: false,
        })
        .collect()
}

/// A rendered drip email.
#[derive(Debug, Clone, PartialEq)]
pub struct DripEmail {
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

/// Values substituted into a drip template.
#[derive(Debug, Clone)]
pub struct DripContext<'a> {
    pub first_name: &'a str,
    /// `None` for contact-form leads.
    pub tool: Option<ToolKind>,
    pub site_name: &'a str,
    pub booking_url: &'a str,
}

fn paragraphs(step: u32, topic: &str) -> Vec<String> {
    match step {
        1 => vec![
            format!("Thanks again for using our {topic}. A calculator gives you a starting point, but the right decision depends on the rest of your picture: income, goals, timing, and taxes."),
            "If any of the results surprised you, reply to this email and we will walk through them with you.".to_string(),
        ],
        2 => vec![
            format!("Since you looked at our {topic}, here are three questions our clients often find useful:"),
            "1. What happens to this plan if my income changes? 2. Which accounts should I use first? 3. How often should I revisit it?".to_string(),
            "We are happy to answer them for your situation.".to_string(),
        ],
        _ => vec![
            "We will not keep filling your inbox. This is our last note for now.".to_string(),
            "Whenever you want a second opinion on your plan, a short introductory call is free and comes with no obligation.".to_string(),
        ],
    }
}

/// Renders the template for `step`, or `None` when the step is not part of the sequence.
pub fn render(step_number: u32, ctx: &DripContext<'_>) -> Option<DripEmail> {
    let drip_step = step(step_number)?;
    let topic = match ctx.tool {
        Some(tool) => tool.display_name().to_lowercase(),
        None => "website contact form".to_string(),
    };

    let body = paragraphs(drip_step.step, &topic);
    let greeting = format!("Hi {},", ctx.first_name);

    let mut body_text = format!("{greeting}\n\n");
    for p in &body {
        body_text.push_str(p);
        body_text.push_str("\n\n");
    }
    body_text.push_str(&format!(
        "Book a call: {}\n\n{}",
        ctx.booking_url, ctx.site_name
    ));

    let mut body_html = format!("<p>{}</p>", escape_html(&greeting));
    for p in &body {
        body_html.push_str(&format!("<p>{}</p>", escape_html(p)));
    }
    body_html.push_str(&format!(
        r#"<p><a href="{url}">Book a call</a></p><p>{site}</p>"#,
        url = escape_html(ctx.booking_url),
        site = escape_html(ctx.site_name)
    ));

    Some(DripEmail {
        subject: drip_step.subject.to_string(),
        body_text,
        body_html,
    })
}
