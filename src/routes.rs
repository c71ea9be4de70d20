use std::{str::FromStr, sync::Arc};

use axum::{
    Router,
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    AppState,
    error::{AppError, AppResult},
    forms::{AddForm, EditForm, FieldErrors},
    models::{Movie, NewMovie, assign_rankings},
    store::StoreError,
    templates,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/edit", get(edit_form).post(edit))
        .route("/delete", get(delete))
        .route("/add", get(add_form).post(add))
        .route("/find", get(find))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    fn parse<T: FromStr>(&self) -> AppResult<T> {
        let raw = self.id.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(AppError::NotFound("no movie id given".to_string()));
        }
        raw.parse().map_err(|_| AppError::NotFound(format!("no movie with id \"{raw}\"")))
    }
}

async fn load_movie(state: &AppState, id: i32) -> AppResult<Movie> {
    state.store.get_by_id(id).await?.ok_or_else(|| StoreError::NotFound(id).into())
}

pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let mut movies = state.store.list_all().await?;
    let rankings = assign_rankings(&mut movies);
    state.store.save_rankings(&rankings).await?;

    debug!(count = movies.len(), "listing movies");
    Ok(Html(templates::index_page(&movies)))
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdQuery>,
) -> AppResult<Html<String>> {
    let movie = load_movie(&state, q.parse()?).await?;

    let rating = movie.rating.map(|r| r.to_string()).unwrap_or_default();
    let review = movie.review.clone().unwrap_or_default();
    Ok(Html(templates::edit_page(&movie, &rating, &review, &FieldErrors::default())))
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdQuery>,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    let mut movie = load_movie(&state, q.parse()?).await?;

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            debug!(movie_id = movie.id, "edit form rejected");
            let body = templates::edit_page(&movie, &form.rating, &form.review, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
    };

    movie.rating = Some(valid.rating);
    movie.review = Some(valid.review);
    state.store.update(&movie).await?;

    debug!(movie_id = movie.id, rating = valid.rating, "movie rated");
    Ok(Redirect::to("/").into_response())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdQuery>,
) -> AppResult<Redirect> {
    state.store.delete_by_id(q.parse()?).await?;
    Ok(Redirect::to("/"))
}

pub async fn add_form() -> Html<String> {
    Html(templates::add_page("", &FieldErrors::default()))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddForm>,
) -> AppResult<Response> {
    let title = match form.validate() {
        Ok(title) => title,
        Err(errors) => {
            let body = templates::add_page(&form.title, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
        },
    };

    let candidates = state.search.search_by_title(&title).await?;
    Ok(Html(templates::select_page(&title, &candidates)).into_response())
}

pub async fn find(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IdQuery>,
) -> AppResult<Redirect> {
    let external_id: i64 = q.parse()?;

    let detail = state.search.fetch_detail(external_id).await?;
    let movie = state.store.insert(NewMovie::try_from(detail)?).await?;

    debug!(movie_id = movie.id, external_id = external_id, title = %movie.title, "movie added");
    Ok(Redirect::to(&format!("/edit?id={}", movie.id)))
}
