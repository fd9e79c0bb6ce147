//! Owner-scoped article lifecycle.

use tracing::{info, warn};

use storynest_db::Database;
use storynest_db::models::ArticleFields;
use storynest_types::api::{ArticleForm, ArticleSummary};
use storynest_types::models::{Article, ArticleStatus, DEFAULT_CATEGORY, Dashboard};

use crate::error::{AuthzError, ServiceError, ValidationError};
use crate::format;

pub const EXCERPT_LEN: usize = 120;

const REQUIRED_FIELDS: &str = "Please fill in all required fields.";

/// A submitted form after trimming, defaulting and paragraph formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidArticle {
    pub title: String,
    pub category: String,
    pub date: String,
    pub content: String,
    pub status: ArticleStatus,
}

impl ValidArticle {
    fn fields(&self) -> ArticleFields<'_> {
        ArticleFields {
            title: &self.title,
            category: &self.category,
            date: &self.date,
            content: &self.content,
            status: self.status,
        }
    }
}

pub fn validate(form: &ArticleForm) -> Result<ValidArticle, ValidationError> {
    let title = form.title.trim();
    let date = form.date.trim();
    let content = form.content.trim();

    for (field, value) in [("title", title), ("content", content), ("date", date)] {
        if value.is_empty() {
            return Err(ValidationError::new(field, REQUIRED_FIELDS));
        }
    }

    let status = match form.status.trim() {
        "" => ArticleStatus::default(),
        s => s
            .parse::<ArticleStatus>()
            .map_err(|_| ValidationError::new("status", format!("Unknown status '{}'.", s)))?,
    };

    let category = match form.category.trim() {
        "" => DEFAULT_CATEGORY,
        c => c,
    };

    Ok(ValidArticle {
        title: title.to_string(),
        category: category.to_string(),
        date: date.to_string(),
        content: format::paragraphs(content),
        status,
    })
}

pub fn list_published(db: &Database) -> Result<Vec<Article>, ServiceError> {
    Ok(db
        .list_published_articles()?
        .into_iter()
        .map(|row| row.into_article())
        .collect())
}

/// Every article `owner_id` wrote, drafts included, with dashboard counts.
pub fn list_by_owner(db: &Database, owner_id: i64) -> Result<Dashboard, ServiceError> {
    let articles = db
        .list_articles_by_owner(owner_id)?
        .into_iter()
        .map(|row| row.into_article())
        .collect();
    Ok(Dashboard::new(articles))
}

pub fn get_by_id(db: &Database, id: i64) -> Result<Option<Article>, ServiceError> {
    Ok(db.get_article(id)?.map(|row| row.into_article()))
}

pub fn create(db: &Database, owner_id: i64, form: &ArticleForm) -> Result<Article, ServiceError> {
    let valid = validate(form)?;
    let id = db.insert_article(owner_id, &valid.fields())?;
    info!("User {} created article {} ({})", owner_id, id, valid.status);

    get_by_id(db, id)?.ok_or(ServiceError::NotFound("article"))
}

/// Loads article `id` for a mutation by `caller`, refusing anyone but its owner.
fn owned(db: &Database, id: i64, caller: i64, action: &'static str) -> Result<Article, ServiceError> {
    let article = get_by_id(db, id)?.ok_or(ServiceError::NotFound("article"))?;
    if article.owner_id != caller {
        warn!("User {} tried to {} article {} owned by {}", caller, action, id, article.owner_id);
        return Err(AuthzError::NotOwner { action }.into());
    }
    Ok(article)
}

/// The owner's article with content turned back into editable text.
pub fn for_edit(db: &Database, id: i64, caller: i64) -> Result<Article, ServiceError> {
    let mut article = owned(db, id, caller, "edit")?;
    article.content = format::editable_text(&article.content);
    Ok(article)
}

pub fn update(db: &Database, id: i64, caller: i64, form: &ArticleForm) -> Result<(), ServiceError> {
    owned(db, id, caller, "edit")?;
    let valid = validate(form)?;

    if !db.update_article(id, caller, &valid.fields())? {
        return Err(ServiceError::NotFound("article"));
    }
    info!("User {} updated article {} ({})", caller, id, valid.status);
    Ok(())
}

pub fn delete(db: &Database, id: i64, caller: i64) -> Result<(), ServiceError> {
    owned(db, id, caller, "delete")?;

    if !db.delete_article(id, caller)? {
        return Err(ServiceError::NotFound("article"));
    }
    info!("User {} deleted article {}", caller, id);
    Ok(())
}

pub fn summarize(article: &Article) -> ArticleSummary {
    ArticleSummary {
        id: article.id,
        title: article.title.clone(),
        category: article.category.clone(),
        date: article.date.clone(),
        status: article.status,
        excerpt: format::excerpt(&article.content, EXCERPT_LEN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn form(title: &str, content: &str, date: &str, status: &str) -> ArticleForm {
        ArticleForm {
            title: title.into(),
            category: String::new(),
            date: date.into(),
            content: content.into(),
            status: status.into(),
        }
    }

    #[test]
    fn create_formats_and_defaults() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");

        let article = create(&db, alice.id, &form("First", "Para one.\n\nPara two.", "2024-01-01", "draft")).unwrap();
        assert_eq!(article.content, "<p>Para one.</p><p>Para two.</p>");
        assert_eq!(article.category, DEFAULT_CATEGORY);
        assert_eq!(article.status, ArticleStatus::Draft);
        assert_eq!(article.owner_id, alice.id);

        let dash = list_by_owner(&db, alice.id).unwrap();
        assert_eq!((dash.total, dash.published, dash.drafts), (1, 0, 1));
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let cases = [
            form("  ", "body", "2024-01-01", "published"),
            form("t", " \n ", "2024-01-01", "published"),
            form("t", "body", "   ", "published"),
        ];
        for f in &cases {
            let err = validate(f).unwrap_err();
            assert_eq!(err.reason, REQUIRED_FIELDS);
        }
        assert_eq!(validate(&cases[1]).unwrap_err().field, "content");
    }

    #[test]
    fn status_defaults_and_rejects_unknown() {
        assert_eq!(validate(&form("t", "b", "d", "")).unwrap().status, ArticleStatus::Published);
        assert_eq!(validate(&form("t", "b", "d", " draft ")).unwrap().status, ArticleStatus::Draft);
        assert_eq!(validate(&form("t", "b", "d", "archived")).unwrap_err().field, "status");
    }

    #[test]
    fn explicit_category_is_kept_trimmed() {
        let mut f = form("t", "b", "d", "draft");
        f.category = "  Essays ".into();
        assert_eq!(validate(&f).unwrap().category, "Essays");
    }

    #[test]
    fn owner_can_flip_status_both_ways() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let a = create(&db, alice.id, &form("T", "Body", "2024-01-01", "draft")).unwrap();

        update(&db, a.id, alice.id, &form("T", "Body", "2024-01-01", "published")).unwrap();
        assert!(get_by_id(&db, a.id).unwrap().unwrap().is_published());

        update(&db, a.id, alice.id, &form("T", "Body", "2024-01-01", "draft")).unwrap();
        assert!(!get_by_id(&db, a.id).unwrap().unwrap().is_published());
    }

    #[test]
    fn non_owner_update_leaves_record_untouched() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let bob = testing::user(&db, &creds, "bob");
        let a = create(&db, alice.id, &form("Mine", "Body", "2024-01-01", "draft")).unwrap();
        let before = get_by_id(&db, a.id).unwrap().unwrap();

        let err = update(&db, a.id, bob.id, &form("Hijacked", "Spam", "2030-01-01", "published")).unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::NotOwner { action: "edit" })));

        let err = update(&db, a.id, bob.id, &form("", "", "", "")).unwrap_err();
        assert!(matches!(err, ServiceError::Authz(_)), "authorization is checked before validation");

        assert_eq!(get_by_id(&db, a.id).unwrap().unwrap(), before);
    }

    #[test]
    fn non_owner_delete_is_rejected() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let bob = testing::user(&db, &creds, "bob");
        let a = create(&db, alice.id, &form("Mine", "Body", "2024-01-01", "published")).unwrap();
        let before = get_by_id(&db, a.id).unwrap().unwrap();

        let err = delete(&db, a.id, bob.id).unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::NotOwner { action: "delete" })));
        assert_eq!(get_by_id(&db, a.id).unwrap().unwrap(), before);
        assert_eq!(list_by_owner(&db, alice.id).unwrap().total, 1);
    }

    #[test]
    fn owner_delete_is_permanent() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let a = create(&db, alice.id, &form("Gone", "Body", "2024-01-01", "published")).unwrap();

        delete(&db, a.id, alice.id).unwrap();
        assert!(get_by_id(&db, a.id).unwrap().is_none());
        assert!(matches!(delete(&db, a.id, alice.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn missing_article_is_not_found_before_ownership() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let err = update(&db, 999, alice.id, &form("T", "B", "D", "draft")).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("article")));
    }

    #[test]
    fn edit_view_returns_plain_text_to_owner_only() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let bob = testing::user(&db, &creds, "bob");
        let a = create(&db, alice.id, &form("T", "One.\n\nTwo.", "2024-01-01", "draft")).unwrap();

        assert_eq!(for_edit(&db, a.id, alice.id).unwrap().content, "One.\n\nTwo.");
        assert!(matches!(for_edit(&db, a.id, bob.id), Err(ServiceError::Authz(_))));
    }

    #[test]
    fn published_listing_spans_owners_newest_first() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let bob = testing::user(&db, &creds, "bob");
        create(&db, alice.id, &form("Old", "B", "2024-01-01", "published")).unwrap();
        create(&db, bob.id, &form("New", "B", "2024-06-01", "published")).unwrap();
        create(&db, bob.id, &form("Hidden", "B", "2024-12-01", "draft")).unwrap();

        let titles: Vec<_> = list_published(&db).unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[test]
    fn summary_uses_excerpt() {
        let (db, creds) = testing::services();
        let alice = testing::user(&db, &creds, "alice");
        let long = "word ".repeat(60);
        let a = create(&db, alice.id, &form("T", &long, "2024-01-01", "published")).unwrap();

        let summary = summarize(&a);
        assert!(summary.excerpt.ends_with(format::ELLIPSIS));
        assert!(!summary.excerpt.contains("<p>"));
    }
}
