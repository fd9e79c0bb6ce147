//! Database row types — these map directly to SQLite rows.
//! Distinct from storynest-types models to keep the DB layer independent.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use storynest_types::models::{Article, ArticleStatus, User};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            created_at: parse_timestamp(&self.created_at),
            id: self.id,
            username: self.username,
            email: self.email,
        }
    }
}

pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub content: String,
    pub date: String,
    pub status: String,
    pub owner_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl ArticleRow {
    pub fn into_article(self) -> Article {
        let status = self.status.parse::<ArticleStatus>().unwrap_or_else(|e| {
            warn!("Article {}: {}, treating as draft", self.id, e);
            ArticleStatus::Draft
        });

        Article {
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
            id: self.id,
            title: self.title,
            category: self.category,
            content: self.content,
            date: self.date,
            status,
            owner_id: self.owner_id,
        }
    }
}

/// Column values for inserting or rewriting an article.
#[derive(Debug, Clone, Copy)]
pub struct ArticleFields<'a> {
    pub title: &'a str,
    pub category: &'a str,
    pub date: &'a str,
    pub content: &'a str,
    pub status: ArticleStatus,
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; it is UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let sqlite = parse_timestamp("2024-03-15 10:20:30");
        assert_eq!(sqlite.to_rfc3339(), "2024-03-15T10:20:30+00:00");

        let rfc = parse_timestamp("2024-03-15T10:20:30Z");
        assert_eq!(rfc, sqlite);

        assert_eq!(parse_timestamp("yesterday"), DateTime::<Utc>::default());
    }

    #[test]
    fn unknown_status_row_becomes_draft() {
        let row = ArticleRow {
            id: 7,
            title: "t".into(),
            category: "c".into(),
            content: "x".into(),
            date: "2024-01-01".into(),
            status: "archived".into(),
            owner_id: 1,
            created_at: "2024-01-01 00:00:00".into(),
            updated_at: "2024-01-01 00:00:00".into(),
        };
        assert_eq!(row.into_article().status, ArticleStatus::Draft);
    }
}
