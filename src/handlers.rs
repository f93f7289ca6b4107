use crate::{
    errors::AppError,
    listing,
    models::{
        DownloadResponse, MemeListResponse, MemeRecord, NewMeme, PopularTagsResponse,
        SearchResponse, TagMemesResponse, TagSuggestionsResponse, TrendingResponse, UpvoteResponse,
    },
    pagination::{self, Sort},
    search, tags, trending, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

// Query values stay strings so non-numeric input can fall back to defaults.

#[derive(Deserialize, Debug, Default)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct TagParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

pub async fn create_meme(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewMeme>,
) -> Result<(StatusCode, Json<MemeRecord>), AppError> {
    let meme = payload.into_record(Uuid::new_v4(), Utc::now())?;
    state.catalog.create(&meme).await?;
    tracing::info!(meme_id = %meme.id, tags = ?meme.tags, "Meme created successfully via handler");
    Ok((StatusCode::CREATED, Json(meme)))
}

pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<MemeRecord>, AppError> {
    let meme_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%meme_id, "Fetching meme details via handler");
    match state.catalog.get_by_id(meme_id).await? {
        Some(meme) => Ok(Json(meme)),
        None => Err(AppError::MemeNotFound(meme_id)),
    }
}

pub async fn list_memes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<MemeListResponse>, AppError> {
    let page = pagination::normalize(params.page.as_deref(), params.limit.as_deref())?;
    let sort = Sort::parse(params.sort_by.as_deref(), params.order.as_deref())?;
    let response = listing::list_memes(state.catalog.as_ref(), &page, sort).await?;
    tracing::debug!("Handler listed {} of {} memes", response.memes.len(), response.pagination.total_items);
    Ok(Json(response))
}

pub async fn memes_by_tag(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<TagMemesResponse>, AppError> {
    let page = pagination::normalize(params.page.as_deref(), params.limit.as_deref())?;
    let response = listing::memes_by_tag(state.catalog.as_ref(), &tag, &page).await?;
    Ok(Json(response))
}

pub async fn search_memes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.q.unwrap_or_default();
    let page = pagination::normalize(params.page.as_deref(), params.limit.as_deref())?;
    let response = search::search_memes(state.catalog.as_ref(), &query, &page).await?;
    Ok(Json(response))
}

pub async fn trending_memes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<TrendingResponse>, AppError> {
    let page = pagination::normalize(params.page.as_deref(), params.limit.as_deref())?;
    let response = trending::trending_memes(state.catalog.as_ref(), &page, Utc::now()).await?;
    Ok(Json(response))
}

pub async fn popular_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagParams>,
) -> Result<Json<PopularTagsResponse>, AppError> {
    let limit = pagination::normalize_limit(params.limit.as_deref(), tags::DEFAULT_POPULAR_LIMIT)?;
    let popular_tags = tags::popular_tags(state.catalog.as_ref(), limit).await?;
    Ok(Json(PopularTagsResponse { popular_tags }))
}

pub async fn suggest_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagParams>,
) -> Result<Json<TagSuggestionsResponse>, AppError> {
    let limit = pagination::normalize_limit(params.limit.as_deref(), tags::DEFAULT_SUGGESTION_LIMIT)?;
    let fragment = params.q.unwrap_or_default();
    let suggestions = tags::suggest_tags(state.catalog.as_ref(), &fragment, limit).await?;
    Ok(Json(TagSuggestionsResponse { suggestions }))
}

pub async fn upvote_meme(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<UpvoteResponse>, AppError> {
    let id = Uuid::parse_str(&id_str)?;
    let upvotes = state.catalog.increment_upvotes(id).await?;
    tracing::info!(meme_id = %id, upvotes, "Meme upvoted");
    Ok(Json(UpvoteResponse { id, upvotes }))
}

pub async fn download_meme(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<DownloadResponse>, AppError> {
    let id = Uuid::parse_str(&id_str)?;
    let downloads = state.catalog.increment_downloads(id).await?;
    tracing::info!(meme_id = %id, downloads, "Meme download recorded");
    Ok(Json(DownloadResponse { id, downloads }))
}
