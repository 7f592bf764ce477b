use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use request_validator::{
    validate_request, RequestSchemas, RequestValidator, TypedSchema, ValidatorConfig,
};

use crate::{
    handlers,
    models::{ContractPath, CreateReviewRequest, ListContractsQuery},
};

pub fn health_routes() -> Router {
    Router::new().route("/health", get(handlers::health_check))
}

pub fn contract_routes(config: ValidatorConfig) -> Router {
    let list_validator =
        RequestValidator::query(TypedSchema::<ListContractsQuery>::new()).with_config(config);

    let review_validator = RequestValidator::new(
        RequestSchemas::new()
            .params(TypedSchema::<ContractPath>::new())
            .body(TypedSchema::<CreateReviewRequest>::new()),
    )
    .with_config(config);

    let list = Router::new()
        .route("/api/contracts", get(handlers::list_contracts))
        .route_layer(middleware::from_fn_with_state(list_validator, validate_request));

    let reviews = Router::new()
        .route("/api/contracts/:id/reviews", post(handlers::create_review))
        .route_layer(middleware::from_fn_with_state(review_validator, validate_request));

    list.merge(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        contract_routes(ValidatorConfig::default())
            .merge(health_routes())
            .fallback(handlers::route_not_found)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const CONTRACT: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    #[tokio::test]
    async fn lists_with_normalized_filters() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/contracts?network=TESTNET&page=3&utm_source=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["filters"]["network"], "testnet");
        assert_eq!(body["page"], 3);
        assert_eq!(body["limit"], 20);
    }

    #[tokio::test]
    async fn rejects_bad_list_query() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/contracts?limit=1000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body[0]["type"], "Query");
        assert_eq!(body[0]["errors"]["issues"][0]["field"], "limit");
    }

    #[tokio::test]
    async fn creates_review() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/contracts/{}/reviews", CONTRACT.to_uppercase()))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "version": "1.0.0", "rating": 5, "review_text": " solid " })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["contract_id"], CONTRACT);
        assert_eq!(body["review_text"], "solid");
    }

    #[tokio::test]
    async fn reports_bad_path_and_body_together() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/contracts/not-a-uuid/reviews")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "version": "1.0.0", "rating": 0 }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body[0]["type"], "Params");
        assert_eq!(body[1]["type"], "Body");
    }

    #[tokio::test]
    async fn health_is_not_validated() {
        let response = app()
            .oneshot(Request::builder().uri("/health?junk=1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
