use storynest_db::Database;
use storynest_types::models::Article;

use crate::articles;
use crate::error::ServiceError;

/// Published articles whose title, category or raw content contains `query`,
/// ignoring case. A blank query matches nothing.
pub fn search(db: &Database, query: &str) -> Result<Vec<Article>, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(vec![]);
    }

    let needle = query.to_lowercase();
    Ok(articles::list_published(db)?
        .into_iter()
        .filter(|article| matches(article, &needle))
        .collect())
}

/// `needle` must already be lowercase.
pub fn matches(article: &Article, needle: &str) -> bool {
    [&article.title, &article.category, &article.content]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
