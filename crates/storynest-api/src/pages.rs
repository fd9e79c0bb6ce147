//! Public pages: home, article, search and the contact form.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use storynest_types::api::{ArticleView, ContactForm, ContactView, HomeView, SearchQuery, SearchView};

use crate::articles;
use crate::auth::{AppState, blocking};
use crate::contact;
use crate::error::ServiceError;
use crate::flash;
use crate::search;

pub async fn home(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse, ServiceError> {
    let published = blocking(&state, |app| articles::list_published(&app.db)).await?;
    let flash = flash::take(&session).await?;

    Ok(Json(HomeView {
        articles: published.iter().map(articles::summarize).collect(),
        flash,
    }))
}

/// Any stored article resolves by id, drafts included; only a missing id is a 404.
pub async fn article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    session: Session,
) -> Result<impl IntoResponse, ServiceError> {
    let (article, author) = blocking(&state, move |app| {
        let article = articles::get_by_id(&app.db, id)?.ok_or(ServiceError::NotFound("article"))?;
        let author = app
            .db
            .get_user_by_id(article.owner_id)?
            .map(|row| row.username)
            .unwrap_or_default();
        Ok((article, author))
    })
    .await?;

    let flash = flash::take(&session).await?;
    Ok(Json(ArticleView { article, author, flash }))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let q = query.q.trim().to_string();
    let needle = q.clone();
    let results = blocking(&state, move |app| search::search(&app.db, &needle)).await?;

    Ok(Json(SearchView {
        query: q,
        results: results.iter().map(articles::summarize).collect(),
    }))
}

pub async fn contact_form() -> impl IntoResponse {
    Json(ContactView { success: false, error: None })
}

pub async fn submit_contact(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response, ServiceError> {
    match blocking(&state, move |app| contact::submit(&app.db, &form)).await {
        Ok(_) => Ok(Json(ContactView { success: true, error: None }).into_response()),
        Err(ServiceError::Validation(e)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ContactView { success: false, error: Some(e.reason) }),
        )
            .into_response()),
        Err(e) => Err(e),
    }
}

pub async fn health() -> &'static str {
    "ok"
}
