use axum::{http::StatusCode, response::IntoResponse, Json};
use request_validator::{ValidBody, ValidParams, ValidQuery};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ContractPath, CreateReviewRequest, ListContractsQuery, ReviewResponse};

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// GET /api/contracts
pub async fn list_contracts(ValidQuery(query): ValidQuery<ListContractsQuery>) -> impl IntoResponse {
    Json(json!({
        "filters": {
            "network": query.network,
            "category": query.category,
        },
        "page": query.page(),
        "limit": query.limit(),
        "items": [],
    }))
}

/// POST /api/contracts/:id/reviews
pub async fn create_review(
    ValidParams(path): ValidParams<ContractPath>,
    ValidBody(payload): ValidBody<CreateReviewRequest>,
) -> impl IntoResponse {
    let review = ReviewResponse {
        id: Uuid::new_v4(),
        contract_id: path.id,
        version: payload.version,
        rating: payload.rating,
        review_text: payload.review_text,
    };

    tracing::info!(contract_id = %review.contract_id, review_id = %review.id, "review accepted");

    (StatusCode::CREATED, Json(review))
}

pub async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Route not found"})))
}
