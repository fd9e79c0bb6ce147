use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to articles submitted without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// A registered author. The password hash never leaves the db/api crates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Published,
    Draft,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Published => "published",
            ArticleStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown article status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ArticleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(ArticleStatus::Published),
            "draft" => Ok(ArticleStatus::Draft),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// An article as stored. `content` is markup; `date` is whatever the author typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub content: String,
    pub date: String,
    pub status: ArticleStatus,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }
}

/// An owner's articles plus the counts shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub articles: Vec<Article>,
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
}

impl Dashboard {
    pub fn new(articles: Vec<Article>) -> Self {
        let published = articles.iter().filter(|a| a.is_published()).count();
        Self {
            total: articles.len(),
            drafts: articles.len() - published,
            published,
            articles,
        }
    }
}
