//! File-backed blog post store.
//!
//! Each post is `<content_dir>/<slug>.md`. The directory is the source of
//! truth, so posts can also be edited by hand and picked up on the next read.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use domain::models::{BlogPost, FrontmatterError};

const EXTENSION: &str = "md";

/// Errors from the blog store.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("post not found: {0}")]
    NotFound(String),

    #[error("post already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    #[error("invalid post file: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("content directory error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct BlogStore {
    dir: PathBuf,
}

impl BlogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the content directory if it does not exist.
    pub async fn ensure_dir(&self) -> Result<(), BlogError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn path_for(&self, slug: &str) -> Result<PathBuf, BlogError> {
        if shared::validation::validate_slug(slug).is_err() {
            return Err(BlogError::InvalidSlug(slug.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", slug, EXTENSION)))
    }

    /// All parseable posts, newest first. Unparseable files are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<BlogPost>, BlogError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Content directory missing, no posts");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut posts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            let source = match fs::read_to_string(&path).await {
                Ok(source) => source,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable post file");
                    continue;
                }
            };

            match BlogPost::parse(&source) {
                Ok(post) if stem_matches(&path, post.slug()) => posts.push(post),
                Ok(post) => {
                    warn!(
                        path = %path.display(),
                        slug = %post.slug(),
                        "Skipping post whose file name does not match its slug"
                    );
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unparseable post file");
                }
            }
        }

        sort_newest_first(&mut posts);
        Ok(posts)
    }

    /// Published posts, optionally filtered by tag, newest first.
    pub async fn list_published(&self, tag: Option<&str>) -> Result<Vec<BlogPost>, BlogError> {
        let posts = self.list().await?;
        Ok(posts
            .into_iter()
            .filter(|p| p.is_published())
            .filter(|p| tag.map_or(true, |t| p.has_tag(t)))
            .collect())
    }

    pub async fn get(&self, slug: &str) -> Result<BlogPost, BlogError> {
        let path = self.path_for(slug)?;
        let source = match fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlogError::NotFound(slug.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let post = BlogPost::parse(&source)?;
        if post.slug() != slug {
            warn!(path = %path.display(), slug = %post.slug(), "Post file name does not match its slug");
            return Err(BlogError::NotFound(slug.to_string()));
        }
        Ok(post)
    }

    /// Writes a new post file. Fails if a file for the slug already exists.
    pub async fn create(&self, post: &BlogPost) -> Result<(), BlogError> {
        let path = self.path_for(post.slug())?;
        let contents = post.to_file_string()?;
        self.ensure_dir().await?;

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(BlogError::AlreadyExists(post.slug().to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        use tokio::io::AsyncWriteExt;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Replaces the post stored under `slug`. If the post's slug differs the
    /// file is renamed, failing when the new slug is taken.
    pub async fn update(&self, slug: &str, post: &BlogPost) -> Result<(), BlogError> {
        let old_path = self.path_for(slug)?;
        if !fs::try_exists(&old_path).await? {
            return Err(BlogError::NotFound(slug.to_string()));
        }

        if post.slug() != slug {
            self.create(post).await?;
            fs::remove_file(&old_path).await?;
            return Ok(());
        }

        let contents = post.to_file_string()?;
        let tmp = old_path.with_extension("md.tmp");
        fs::write(&tmp, contents.as_bytes()).await?;
        fs::rename(&tmp, &old_path).await?;
        Ok(())
    }

    pub async fn delete(&self, slug: &str) -> Result<(), BlogError> {
        let path = self.path_for(slug)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlogError::NotFound(slug.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn stem_matches(path: &Path, slug: &str) -> bool {
    path.file_stem().and_then(|s| s.to_str()) == Some(slug)
}

fn sort_newest_first(posts: &mut [BlogPost]) {
    posts.sort_by(|a, b| {
        b.frontmatter
            .date
            .cmp(&a.frontmatter.date)
            .then_with(|| a.frontmatter.slug.cmp(&b.frontmatter.slug))
    });
}
