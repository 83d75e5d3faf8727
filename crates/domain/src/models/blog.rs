//! Blog posts stored as markdown files with a YAML frontmatter block.
//!
//! ```text
//! ---
//! title: Five RRSP questions to ask in February
//! description: A short checklist before the contribution deadline.
//! date: 2024-02-01
//! tags: [rrsp, retirement]
//! slug: five-rrsp-questions
//! status: published
//! ---
//! Markdown body...
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

const FENCE: &str = "---";
const WORDS_PER_MINUTE: usize = 200;
const SUMMARY_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
}

/// Frontmatter metadata of a blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    pub slug: String,
    #[serde(default)]
    pub status: BlogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Frontmatter codec errors.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("missing frontmatter block")]
    MissingBlock,

    #[error("unterminated frontmatter block")]
    Unterminated,

    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A parsed blog post file.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl BlogPost {
    pub fn slug(&self) -> &str {
        &self.frontmatter.slug
    }

    pub fn is_published(&self) -> bool {
        self.frontmatter.status == BlogStatus::Published
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.frontmatter
            .tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Parses a post file: frontmatter fences must be the first line and a later line.
    pub fn parse(source: &str) -> Result<Self, FrontmatterError> {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut lines = source.split_inclusive('\n');

        match lines.next() {
            Some(first) if first.trim_end() == FENCE => {}
            _ => return Err(FrontmatterError::MissingBlock),
        }

        let mut yaml = String::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim_end() == FENCE {
                closed = true;
                break;
            }
            yaml.push_str(line);
        }
        if !closed {
            return Err(FrontmatterError::Unterminated);
        }

        let frontmatter: Frontmatter = serde_yaml::from_str(&yaml)?;
        let body: String = lines.collect();

        Ok(Self {
            frontmatter,
            body: body.trim_start_matches(['\r', '\n']).to_string(),
        })
    }

    /// Serializes the post back into file form.
    pub fn to_file_string(&self) -> Result<String, FrontmatterError> {
        let yaml = serde_yaml::to_string(&self.frontmatter)?;
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n\n{}", self.body))
    }

    pub fn render_html(&self) -> String {
        render_markdown(&self.body)
    }

    pub fn reading_time_minutes(&self) -> u32 {
        reading_time_minutes(&self.body)
    }

    /// The description, or the first characters of the body when it is empty.
    pub fn summary(&self) -> String {
        if !self.frontmatter.description.trim().is_empty() {
            return self.frontmatter.description.clone();
        }
        let plain: String = self
            .body
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join(" ");
        let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");
        if plain.chars().count() <= SUMMARY_CHARS {
            plain
        } else {
            let cut: String = plain.chars().take(SUMMARY_CHARS).collect();
            format!("{}...", cut.trim_end())
        }
    }
}

/// Renders markdown with tables, footnotes and strikethrough enabled.
pub fn render_markdown(markdown: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Estimated reading time, at least one minute.
pub fn reading_time_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Listing entry for the public blog index.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPostSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
    pub status: BlogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub reading_time_minutes: u32,
}

impl From<&BlogPost> for BlogPostSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            slug: post.frontmatter.slug.clone(),
            title: post.frontmatter.title.clone(),
            description: post.summary(),
            date: post.frontmatter.date,
            tags: post.frontmatter.tags.clone(),
            status: post.frontmatter.status,
            author: post.frontmatter.author.clone(),
            reading_time_minutes: post.reading_time_minutes(),
        }
    }
}

/// A single post with rendered HTML.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPostDetail {
    #[serde(flatten)]
    pub summary: BlogPostSummary,
    pub html: String,
    /// Raw markdown, only included for admin reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

impl BlogPostDetail {
    pub fn public(post: &BlogPost) -> Self {
        Self {
            summary: BlogPostSummary::from(post),
            html: post.render_html(),
            markdown: None,
        }
    }

    pub fn admin(post: &BlogPost) -> Self {
        Self {
            markdown: Some(post.body.clone()),
            ..Self::public(post)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListBlogQuery {
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListBlogResponse {
    pub ok: bool,
    pub posts: Vec<BlogPostSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogPostResponse {
    pub ok: bool,
    pub post: BlogPostDetail,
}

/// Admin payload for creating or replacing a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BlogPostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,

    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Derived from the title when omitted.
    #[validate(custom(function = "shared::validation::validate_slug"))]
    pub slug: Option<String>,

    #[serde(default)]
    pub status: BlogStatus,

    pub author: Option<String>,

    #[validate(length(max = 200_000, message = "Body must be at most 200000 characters"))]
    pub body: String,
}

impl BlogPostRequest {
    /// Slug from the payload, or from the title.
    pub fn resolved_slug(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            _ => shared::validation::slugify(&self.title),
        }
    }

    pub fn into_post(self, slug: String, today: NaiveDate) -> BlogPost {
        let tags = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        BlogPost {
            frontmatter: Frontmatter {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                date: self.date.unwrap_or(today),
                tags,
                slug,
                status: self.status,
                author: self.author.filter(|a| !a.trim().is_empty()),
            },
            body: self.body,
        }
    }
}
