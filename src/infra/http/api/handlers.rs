use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use super::error::{ApiError, page_service_to_api, query_to_api, repo_to_api};
use super::models::{CommentsQuery, ListQuery, SearchQuery};
use super::state::ApiState;

type QueryResult<T> = Result<Query<T>, QueryRejection>;

pub async fn search_pages(
    State(state): State<ApiState>,
    query: QueryResult<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;
    let (page, limit) = query.window();
    let results = state
        .browse
        .search_pages(&query.filter(), page, limit)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(results))
}

pub async fn get_page(
    State(state): State<ApiState>,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .pages
        .resolve_page(&page_id)
        .await
        .map_err(page_service_to_api)?;
    Ok(Json(page))
}

pub async fn get_insights(
    State(state): State<ApiState>,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let insights = state
        .pages
        .resolve_insights(&page_id)
        .await
        .map_err(page_service_to_api)?;
    Ok(Json(insights))
}

pub async fn list_posts(
    State(state): State<ApiState>,
    Path(page_id): Path<String>,
    query: QueryResult<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;
    let (page, limit) = query.posts();
    let posts = state
        .browse
        .list_posts(&page_id, page, limit)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(posts))
}

pub async fn list_employees(
    State(state): State<ApiState>,
    Path(page_id): Path<String>,
    query: QueryResult<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;
    let (page, limit) = query.employees();
    let employees = state
        .browse
        .list_employees(&page_id, page, limit)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(employees))
}

pub async fn list_comments(
    State(state): State<ApiState>,
    Path(page_id): Path<String>,
    query: QueryResult<CommentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;
    let (page, limit) = query.window();
    let comments = state
        .browse
        .list_comments(&page_id, query.post_id(), page, limit)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(comments))
}

pub async fn list_followers(
    State(state): State<ApiState>,
    Path(page_id): Path<String>,
    query: QueryResult<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;
    let (page, limit) = query.relations();
    let followers = state
        .browse
        .list_followers(&page_id, page, limit)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(followers))
}

pub async fn list_following(
    State(state): State<ApiState>,
    Path(page_id): Path<String>,
    query: QueryResult<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_to_api)?;
    let (page, limit) = query.relations();
    let following = state
        .browse
        .list_following(&page_id, page, limit)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(following))
}
