use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use models::sample_query::SampleQuery;
use serde::Deserialize;
use service::samples::ListOutcome;
use tracing::info;

use crate::errors::JsonApiError;
use crate::locale::resolve_locale;
use crate::routes::auth::{AuthenticatedUser, ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive text matched against category, name and tip.
    pub search: Option<String>,
}

#[utoipa::path(
    get, path = "/api/samples", tag = "samples",
    params(SearchQuery),
    responses(
        (status = 200, description = "Whole list, or the records matching `search`", body = crate::openapi::SampleQueriesListDoc),
        (status = 204, description = "List is empty"),
        (status = 404, description = "Search matched nothing"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_samples(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(q): Query<SearchQuery>,
) -> Result<Response, JsonApiError> {
    let locale = resolve_locale(&headers, &state.default_locale);
    let res = match state.samples.list(&locale, q.search.as_deref()).await? {
        ListOutcome::All(list) => Json(list.as_ref()).into_response(),
        ListOutcome::Filtered(found) => Json(found).into_response(),
    };
    Ok(res)
}

#[utoipa::path(
    get, path = "/api/samples/{id}", tag = "samples",
    params(("id" = String, Path, description = "Sample query id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::SampleQueryDoc),
        (status = 204, description = "List is empty"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_sample(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SampleQuery>, JsonApiError> {
    let locale = resolve_locale(&headers, &state.default_locale);
    Ok(Json(state.samples.get(&locale, &id).await?))
}

#[utoipa::path(
    put, path = "/api/samples/{id}", tag = "samples",
    params(("id" = String, Path, description = "Sample query id")),
    request_body = crate::openapi::SampleQueryDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::SampleQueryDoc),
        (status = 400, description = "Validation Error or malformed JSON body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not authorized for the category"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_sample(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<SampleQuery>, JsonRejection>,
) -> Result<Json<SampleQuery>, JsonApiError> {
    let Json(record) = payload?;
    let updated = state.samples.update(user.upn(), &id, record).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    post, path = "/api/samples", tag = "samples",
    request_body = crate::openapi::SampleQueryDoc,
    responses(
        (status = 201, description = "Created; Location points at the new record", body = crate::openapi::SampleQueryDoc),
        (status = 400, description = "Validation Error or malformed JSON body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not authorized for the category")
    )
)]
pub async fn create_sample(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthenticatedUser>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    payload: Result<Json<SampleQuery>, JsonRejection>,
) -> Result<Response, JsonApiError> {
    let Json(record) = payload?;
    let created = state.samples.create(user.upn(), record).await?;

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let location = format!("{}://{}{}/{}", scheme, host, uri.path().trim_end_matches('/'), created.id);
    info!(%location, "created sample query");

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

#[utoipa::path(
    delete, path = "/api/samples/{id}", tag = "samples",
    params(("id" = String, Path, description = "Sample query id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not authorized for the category"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_sample(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.samples.delete(user.upn(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
