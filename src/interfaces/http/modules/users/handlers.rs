//! User management API handlers
//!
//! Thin wrappers that delegate to `UserService` and `UserIngestionService`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use super::dto::{
    AddUsersParams, AddUsersResponse, CreateUserRequest, DeleteUsersResponse, ListUsersParams,
    UpdateUserRequest, UserDto, UserStatsDto,
};
use crate::application::{UserIngestionService, UserService};
use crate::domain::{DomainError, UserRepositoryInterface};
use crate::interfaces::http::common::{
    invalid_json, ApiResponse, PaginatedResponse, ValidatedJson,
};

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService<dyn UserRepositoryInterface>>,
    pub ingestion: Arc<UserIngestionService>,
}

type ApiError<T> = (StatusCode, Json<ApiResponse<T>>);

pub(crate) fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Upstream(_) => StatusCode::BAD_GATEWAY,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn domain_error<T>(e: DomainError) -> ApiError<T> {
    let status = status_for(&e);
    if status.is_server_error() {
        warn!(error = %e, "Request failed");
    }
    (status, Json(ApiResponse::error(e.to_string())))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Page of users, newest first", body = PaginatedResponse<UserDto>),
        (status = 500, description = "Store failure", body = ApiResponse<String>)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<PaginatedResponse<UserDto>>, ApiError<()>> {
    let result = state
        .user_service
        .list_users(params.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(result.map(UserDto::from).into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found", body = ApiResponse<String>)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError<UserDto>> {
    let user = state.user_service.get_user(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 409, description = "Email already registered", body = ApiResponse<String>),
        (status = 422, description = "Validation error", body = ApiResponse<String>)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError<UserDto>> {
    let user = state
        .user_service
        .create_user(request.into())
        .await
        .map_err(domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found", body = ApiResponse<String>),
        (status = 409, description = "Email used by another user", body = ApiResponse<String>),
        (status = 422, description = "Validation error", body = ApiResponse<String>)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError<UserDto>> {
    let user = state
        .user_service
        .update_user(id, request.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "Not found", body = ApiResponse<String>)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError<()>> {
    state
        .user_service
        .delete_user(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/delete-multiple",
    tag = "Users",
    request_body(content = Vec<i32>, description = "Ids to delete (1-100)"),
    responses(
        (status = 200, description = "Deletion report", body = ApiResponse<DeleteUsersResponse>),
        (status = 400, description = "Malformed, empty or oversized id list", body = ApiResponse<String>),
        (status = 500, description = "Store failure; data holds the partial report", body = ApiResponse<DeleteUsersResponse>)
    )
)]
pub async fn delete_multiple_users(
    State(state): State<UserHandlerState>,
    payload: Result<Json<Vec<i32>>, JsonRejection>,
) -> Result<Json<ApiResponse<DeleteUsersResponse>>, ApiError<DeleteUsersResponse>> {
    let Json(ids) = payload.map_err(|rejection| invalid_json(&rejection))?;

    match state.user_service.delete_many(&ids).await {
        Ok(report) => Ok(Json(ApiResponse::success(report.into()))),
        Err(e) if matches!(e.cause, DomainError::Validation(_)) => Err(domain_error(e.cause)),
        Err(e) => {
            warn!(deleted = e.deleted_count, error = %e.cause, "Bulk delete failed part-way");
            let partial = DeleteUsersResponse {
                message: format!("Stopped after deleting {} users", e.deleted_count),
                deleted_count: e.deleted_count,
                not_found_count: e.not_found_ids.len(),
                not_found_ids: e.not_found_ids,
            };
            Err((
                status_for(&e.cause),
                Json(ApiResponse::failure(e.cause.to_string(), partial)),
            ))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/add",
    tag = "Users",
    params(AddUsersParams),
    responses(
        (status = 200, description = "Users fetched and stored", body = ApiResponse<AddUsersResponse>),
        (status = 400, description = "count outside 1-100", body = ApiResponse<String>),
        (status = 502, description = "Random user API failed; data holds partial progress", body = ApiResponse<AddUsersResponse>),
        (status = 500, description = "Store failure; data holds partial progress", body = ApiResponse<AddUsersResponse>)
    )
)]
pub async fn add_users(
    State(state): State<UserHandlerState>,
    Query(params): Query<AddUsersParams>,
) -> Result<Json<ApiResponse<AddUsersResponse>>, ApiError<AddUsersResponse>> {
    let max_target = state.ingestion.settings().max_target;
    let target = match usize::try_from(params.count) {
        Ok(n) if (1..=max_target).contains(&n) => n,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!(
                    "count must be between 1 and {max_target}"
                ))),
            ))
        }
    };

    let previous_total = state
        .user_service
        .stats()
        .await
        .map_err(domain_error)?
        .total_users;

    match state.ingestion.ingest(target).await {
        Ok(report) => {
            let current_total = state
                .user_service
                .stats()
                .await
                .map_err(domain_error)?
                .total_users;
            Ok(Json(ApiResponse::success(AddUsersResponse::completed(
                &report,
                previous_total,
                current_total,
            ))))
        }
        Err(e) => Err((
            status_for(&e.cause),
            Json(ApiResponse::failure(
                e.cause.to_string(),
                AddUsersResponse::partial(e.added, e.batches),
            )),
        )),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/stats",
    tag = "Users",
    responses(
        (status = 200, description = "Store statistics", body = ApiResponse<UserStatsDto>)
    )
)]
pub async fn user_stats(
    State(state): State<UserHandlerState>,
) -> Result<Json<ApiResponse<UserStatsDto>>, ApiError<UserStatsDto>> {
    let stats = state.user_service.stats().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(stats.into())))
}
