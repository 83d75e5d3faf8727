//! Email bodies for lead, drip and newsletter mail.

use domain::calculators::{loan, ToolKind};
use domain::models::{Lead, LeadSubmission, NewsletterPost};
use domain::services::drip::{self, DripContext};
use shared::html::escape_html;
use uuid::Uuid;
use validator::Validate;

use crate::config::SiteConfig;
use crate::services::email::{EmailAttachment, EmailMessage};

/// Tells the advisor about a new or returning lead. `None` when no advisor inbox is configured.
pub fn advisor_notification(
    site: &SiteConfig,
    lead_id: Uuid,
    submission: &LeadSubmission,
    updated: bool,
) -> Option<EmailMessage> {
    if site.advisor_email.is_empty() {
        return None;
    }

    let what = match submission.tool {
        Some(tool) => tool.display_name().to_string(),
        None => "Contact form".to_string(),
    };
    let kind = if updated { "Returning lead" } else { "New lead" };
    let subject = format!("{}: {} ({})", kind, submission.name, what);
    let details = serde_json::to_string_pretty(&submission.tool_result)
        .unwrap_or_else(|_| submission.tool_result.to_string());
    let phone = submission.phone.as_deref().unwrap_or("-");

    let body_text = format!(
        "{kind} from {what}\n\nName: {name}\nEmail: {email}\nPhone: {phone}\nLead ID: {lead_id}\n\n{details}\n",
        name = submission.name,
        email = submission.email,
    );

    let body_html = format!(
        "<h2>{kind} from {what}</h2>\
         <p><strong>Name:</strong> {name}<br><strong>Email:</strong> {email}<br>\
         <strong>Phone:</strong> {phone}<br><strong>Lead ID:</strong> {lead_id}</p>\
         <pre>{details}</pre>",
        kind = kind,
        what = escape_html(&what),
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        phone = escape_html(phone),
        details = escape_html(&details),
    );

    Some(
        EmailMessage::new(&site.advisor_email, subject, body_text)
            .with_name(&site.name)
            .with_html(body_html),
    )
}

/// Thanks the lead for the submission. Loan leads get their amortization schedule attached.
pub fn lead_confirmation(site: &SiteConfig, submission: &LeadSubmission) -> EmailMessage {
    let first_name = submission.name.split_whitespace().next().unwrap_or("there");
    let (subject, intro) = match submission.tool {
        Some(tool) => (
            format!("Your {} results", tool.display_name()),
            format!(
                "Thanks for using our {}. We have your results and an advisor will follow up shortly.",
                tool.display_name()
            ),
        ),
        None => (
            format!("Thanks for contacting {}", site.name),
            "Thanks for your message. An advisor will get back to you within one business day."
                .to_string(),
        ),
    };

    let attachment = loan_schedule_attachment(submission);
    let attachment_note = if attachment.is_some() {
        "Your full amortization schedule is attached as a spreadsheet."
    } else {
        ""
    };

    let body_text = format!(
        "Hi {first_name},\n\n{intro}\n\n{attachment_note}\n\n{site_name}\n",
        site_name = site.name
    );
    let mut body_html = format!(
        "<p>Hi {}</p><p>{}</p>",
        escape_html(first_name),
        escape_html(&intro)
    );
    if !attachment_note.is_empty() {
        body_html.push_str(&format!("<p>{}</p>", attachment_note));
    }
    if !site.booking_url.is_empty() {
        body_html.push_str(&format!(
            r#"<p><a href="{}">Book a call</a></p>"#,
            escape_html(&site.booking_url)
        ));
    }
    body_html.push_str(&format!("<p>{}</p>", escape_html(&site.name)));

    let mut message = EmailMessage::new(&submission.email, subject, body_text)
        .with_name(&submission.name)
        .with_html(body_html);
    if let Some(attachment) = attachment {
        message = message.with_attachment(attachment);
    }
    message
}

/// The schedule is always recomputed from the submitted inputs; the submitted
/// result is never mailed back as-is.
fn loan_schedule_attachment(submission: &LeadSubmission) -> Option<EmailAttachment> {
    if submission.tool != Some(ToolKind::Loan) {
        return None;
    }

    let input =
        serde_json::from_value::<loan::LoanInput>(submission.tool_result["inputs"].clone()).ok()?;
    input.validate().ok()?;
    let result = loan::calculate(&input);

    Some(EmailAttachment {
        filename: "amortization-schedule.csv".to_string(),
        content_type: "text/csv".to_string(),
        content: loan::schedule_csv(&result).into_bytes(),
    })
}

/// Drip email for `step`, or `None` when the step is not part of the sequence.
pub fn drip_message(site: &SiteConfig, lead: &Lead, step: u32) -> Option<EmailMessage> {
    let tool = lead.source.parse::<ToolKind>().ok();
    let rendered = drip::render(
        step,
        &DripContext {
            first_name: lead.first_name(),
            tool,
            site_name: &site.name,
            booking_url: &site.booking_url,
        },
    )?;

    Some(
        EmailMessage::new(&lead.email, rendered.subject, rendered.body_text)
            .with_name(&lead.name)
            .with_html(rendered.body_html),
    )
}

/// One newsletter issue for one subscriber, with a personal unsubscribe footer.
pub fn newsletter_issue(
    site: &SiteConfig,
    post: &NewsletterPost,
    email: &str,
    unsubscribe_link: &str,
) -> EmailMessage {
    let body_html = format!(
        "{content}<hr><p style=\"font-size:12px;color:#666\">You are receiving this because you \
         subscribed to the {site} newsletter. <a href=\"{link}\">Unsubscribe</a></p>",
        content = post.content_html,
        site = escape_html(&site.name),
        link = escape_html(unsubscribe_link),
    );
    let body_text = format!(
        "{}\n\n--\nUnsubscribe: {}\n",
        strip_tags(&post.content_html),
        unsubscribe_link
    );

    EmailMessage::new(email, &post.subject, body_text).with_html(body_html)
}

/// Plain-text fallback for HTML content.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
