use serde::{Deserialize, Serialize};

use crate::models::{Article, ArticleStatus};

// -- Forms --
//
// Every form field defaults to an empty string so a missing field is
// reported by validation instead of by the extractor.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    pub category: String,
    pub date: String,
    pub content: String,
    pub status: String,
}

impl Default for ArticleForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            date: String::new(),
            content: String::new(),
            status: ArticleStatus::Published.as_str().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub q: String,
}

// -- Flash --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot notice shown by the next rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Error, message: message.into() }
    }
}

// -- Views --

/// Listing entry: everything but the full content, which is replaced by a plain-text excerpt.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub date: String,
    pub status: ArticleStatus,
    pub excerpt: String,
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub articles: Vec<ArticleSummary>,
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub article: Article,
    pub author: String,
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub query: String,
    pub results: Vec<ArticleSummary>,
}

#[derive(Debug, Serialize)]
pub struct ContactView {
    pub success: bool,
    pub error: Option<String>,
}

/// Login/register page state. Submission errors are sent as the 401/422 body instead.
#[derive(Debug, Default, Serialize)]
pub struct FormView {
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub username: String,
    pub articles: Vec<ArticleSummary>,
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize)]
pub struct NewArticleView {
    pub today: String,
    pub flash: Option<Flash>,
}

/// Edit page: `article.content` holds the tag-stripped text the author edits.
#[derive(Debug, Serialize)]
pub struct EditArticleView {
    pub article: Article,
    pub flash: Option<Flash>,
}
