//! Author dashboard and article management. Every route here sits behind
//! `require_auth`, so `CurrentUser` is always present.

use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use storynest_types::api::{ArticleForm, DashboardView, EditArticleView, Flash, NewArticleView};
use storynest_types::models::ArticleStatus;

use crate::articles;
use crate::auth::{AppState, blocking};
use crate::error::ServiceError;
use crate::flash;
use crate::session::CurrentUser;

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<impl IntoResponse, ServiceError> {
    let owner = user.id;
    let dash = blocking(&state, move |app| articles::list_by_owner(&app.db, owner)).await?;
    let flash = flash::take(&session).await?;

    Ok(Json(DashboardView {
        username: user.username,
        articles: dash.articles.iter().map(articles::summarize).collect(),
        total: dash.total,
        published: dash.published,
        drafts: dash.drafts,
        flash,
    }))
}

pub async fn new_article_form(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let flash = flash::take(&session).await?;
    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    Ok(Json(NewArticleView { today, flash }))
}

pub async fn create_article(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ArticleForm>,
) -> Result<Response, ServiceError> {
    let article = blocking(&state, move |app| articles::create(&app.db, user.id, &form)).await?;

    let notice = match article.status {
        ArticleStatus::Published => "Article published successfully!",
        ArticleStatus::Draft => "Article saved as draft.",
    };
    Ok(flash::redirect("/dashboard", Flash::success(notice)))
}

pub async fn edit_article_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<impl IntoResponse, ServiceError> {
    let article = blocking(&state, move |app| articles::for_edit(&app.db, id, user.id)).await?;
    let flash = flash::take(&session).await?;
    Ok(Json(EditArticleView { article, flash }))
}

pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ArticleForm>,
) -> Result<Response, ServiceError> {
    blocking(&state, move |app| articles::update(&app.db, id, user.id, &form)).await?;
    Ok(flash::redirect("/dashboard", Flash::success("Article updated successfully!")))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ServiceError> {
    blocking(&state, move |app| articles::delete(&app.db, id, user.id)).await?;
    Ok(flash::redirect("/dashboard", Flash::success("Article deleted.")))
}
