//! HTTP routes over a shared [`SearchIndexManager`].

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use protestmap_index::SearchIndexManager;
use protestmap_primitives::{DatasetInfo, QueryResponse};
use tracing::{debug, error};

use crate::api::parse_query_request;
use crate::error::{InternalDetail, ServerError};

/// Builds the application router.
///
/// - `POST /api/getValues`: ranked suggestions for `{query, valueType}`
/// - `GET /api/dataset`: which dataset version is being served
pub fn router(manager: SearchIndexManager) -> Router {
	Router::new()
		.route("/api/getValues", post(get_values))
		.route("/api/dataset", get(dataset))
		.layer(middleware::from_fn(log_internal_errors))
		.with_state(manager)
}

async fn get_values(
	State(manager): State<SearchIndexManager>,
	body: Bytes,
) -> Result<Json<QueryResponse>, ServerError> {
	let request = parse_query_request(&body)?;
	let values = manager.query(request.value_type, &request.query).await?;
	debug!(value_type = %request.value_type, query = %request.query, count = values.len(), "api.get_values");
	Ok(Json(QueryResponse { values }))
}

async fn dataset(State(manager): State<SearchIndexManager>) -> Result<Json<DatasetInfo>, ServerError> {
	let index = manager.get_index().await?;
	let manifest = index.manifest();
	Ok(Json(DatasetInfo {
		dataset_id: manifest.dataset_id.clone(),
		last_updated: manifest.last_updated.clone(),
		content_hash: manifest.content_hash.clone(),
		created_at: index.created_at(),
	}))
}

/// Logs 500 responses with the request line and the hidden failure detail.
async fn log_internal_errors(request: Request, next: Next) -> Response {
	let method = request.method().clone();
	let path = request.uri().path().to_owned();
	let response = next.run(request).await;
	if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
		let detail = response
			.extensions()
			.get::<InternalDetail>()
			.map_or("unknown", |detail| detail.0.as_str());
		error!(%method, path, error = detail, "api.internal_error");
	}
	response
}
