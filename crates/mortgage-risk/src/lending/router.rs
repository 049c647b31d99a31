use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::info;

use super::domain::{LoanApplication, LoanApplicationForm};
use super::evaluation::RiskEngine;
use super::regions::{OverheatBand, RegionSource};

/// Router builder exposing the evaluator and the region watchlist over HTTP.
pub fn risk_router<S>(engine: Arc<RiskEngine<S>>) -> Router
where
    S: RegionSource + 'static,
{
    Router::new()
        .route("/api/v1/risk/evaluate", post(evaluate_handler::<S>))
        .route("/api/v1/regions", get(regions_handler::<S>))
        .route("/api/v1/regions/:region_id", get(region_handler::<S>))
        .with_state(engine)
}

pub(crate) async fn evaluate_handler<S>(
    State(engine): State<Arc<RiskEngine<S>>>,
    payload: Result<axum::Json<LoanApplicationForm>, JsonRejection>,
) -> Response
where
    S: RegionSource + 'static,
{
    let axum::Json(form) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let body = json!({
                "error": rejection.body_text(),
                "field": null,
            });
            return (rejection.status(), axum::Json(body)).into_response();
        }
    };

    let outcome =
        LoanApplication::try_from(form).and_then(|application| engine.evaluate(&application));

    match outcome {
        Ok(assessment) => {
            info!(
                grade = assessment.grade.label(),
                decision = assessment.decision.label(),
                region_matched = assessment.region.matched,
                "risk evaluation served"
            );
            (StatusCode::OK, axum::Json(assessment.view())).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn regions_handler<S>(State(engine): State<Arc<RiskEngine<S>>>) -> Response
where
    S: RegionSource + 'static,
{
    let ranked = engine.regions().snapshot().ranked(engine.config());
    (StatusCode::OK, axum::Json(ranked)).into_response()
}

pub(crate) async fn region_handler<S>(
    State(engine): State<Arc<RiskEngine<S>>>,
    Path(region_id): Path<String>,
) -> Response
where
    S: RegionSource + 'static,
{
    let table = engine.regions().snapshot();
    match table.lookup(&region_id) {
        Some(entry) => {
            let band = entry.band(engine.config());
            let payload = json!({
                "region_id": entry.region_id,
                "overheat_index": entry.overheat_index,
                "yoy_change_percent": entry.yoy_change_percent,
                "band": band,
                "band_label": band.label(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        None => {
            let config = engine.config();
            let fallback = config.default_overheat_index;
            let payload = json!({
                "error": "region not found",
                "region_id": region_id,
                "default_overheat_index": fallback,
                "default_band": OverheatBand::classify(fallback, config),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::domain::FormNumber;
    use crate::lending::regions::{RegionRiskEntry, RegionRiskTable};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn form(count: FormNumber, region: &str, price: FormNumber, presale: bool) -> LoanApplicationForm {
        LoanApplicationForm {
            existing_property_count: count,
            region_id: region.to_string(),
            total_price: price,
            is_presale: presale,
        }
    }

    #[tokio::test]
    async fn evaluate_handler_returns_assessment() {
        let engine = Arc::new(RiskEngine::standard());

        let response = evaluate_handler(
            State(engine),
            Ok(axum::Json(form(FormNumber::Integer(2), "新竹市", "30000000".into(), true))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["decision"], "CONDITIONAL");
        assert_eq!(payload["grade"], "D");
        assert_eq!(payload["max_ltv_percent"], 36.0);
        assert_eq!(payload["risk_weight"], 1.6);
        assert_eq!(payload["triggered_rules"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn evaluate_handler_rejects_invalid_price() {
        let engine = Arc::new(RiskEngine::standard());

        let response = evaluate_handler(
            State(engine),
            Ok(axum::Json(form(FormNumber::Integer(0), "台北市", FormNumber::Integer(0), false))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert_eq!(payload["field"], "total_price");
    }

    #[tokio::test]
    async fn evaluate_handler_rejects_non_numeric_count() {
        let engine = Arc::new(RiskEngine::standard());

        let response = evaluate_handler(
            State(engine),
            Ok(axum::Json(form("two".into(), "台北市", FormNumber::Integer(10_000_000), false))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert_eq!(payload["field"], "existing_property_count");
    }

    #[tokio::test]
    async fn region_handler_reports_missing_regions_with_default() {
        let engine = Arc::new(RiskEngine::standard());

        let response = region_handler(State(engine), Path("未知市".to_string())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload = read_json_body(response).await;
        assert_eq!(payload["default_overheat_index"], 50);
        assert_eq!(payload["default_band"], "low");
    }

    #[tokio::test]
    async fn region_route_returns_entry() {
        let table = RegionRiskTable::new(vec![RegionRiskEntry::new("hsinchu-city", 88, 18.2)])
            .expect("valid table");
        let engine = RiskEngine::new(crate::lending::PolicyConfig::standard(), Arc::new(table))
            .expect("valid policy");
        let router = risk_router(Arc::new(engine));

        let response = router
            .oneshot(
                axum::http::Request::get("/api/v1/regions/hsinchu-city")
                    .body(axum::body::Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["overheat_index"], 88);
        assert_eq!(payload["band"], "high");
    }

    #[tokio::test]
    async fn regions_route_lists_watchlist() {
        let router = risk_router(Arc::new(RiskEngine::standard()));

        let response = router
            .oneshot(
                axum::http::Request::get("/api/v1/regions")
                    .body(axum::body::Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        let regions = payload.as_array().expect("array payload");
        assert_eq!(regions.len(), 8);
        assert_eq!(regions[0]["region_id"], "新竹市");
        assert_eq!(regions[0]["rank"], 1);
    }

    async fn post_evaluate(router: Router, body: &'static str) -> Response {
        router
            .oneshot(
                axum::http::Request::post("/api/v1/risk/evaluate")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("route executes")
    }

    #[tokio::test]
    async fn evaluate_route_reports_fractional_price_as_field_error() {
        let router = risk_router(Arc::new(RiskEngine::standard()));

        let response = post_evaluate(
            router,
            r#"{"existing_property_count": 2, "region_id": "新竹市", "total_price": 30000000.5}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert_eq!(payload["field"], "total_price");
        assert!(payload["error"].is_string());
    }

    #[tokio::test]
    async fn evaluate_route_reports_missing_and_null_numbers_as_field_errors() {
        let router = risk_router(Arc::new(RiskEngine::standard()));

        let missing = post_evaluate(
            router.clone(),
            r#"{"existing_property_count": 0, "region_id": "台北市"}"#,
        )
        .await;
        assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(read_json_body(missing).await["field"], "total_price");

        let null = post_evaluate(
            router,
            r#"{"existing_property_count": null, "region_id": "台北市", "total_price": 1000}"#,
        )
        .await;
        assert_eq!(null.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(read_json_body(null).await["field"], "existing_property_count");
    }

    #[tokio::test]
    async fn evaluate_route_answers_malformed_json_with_json_error() {
        let router = risk_router(Arc::new(RiskEngine::standard()));

        let response = post_evaluate(router, r#"{"existing_property_count": 0,"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json_body(response).await;
        assert!(payload["error"].is_string());
        assert!(payload["field"].is_null());
    }

    #[tokio::test]
    async fn region_bands_follow_engine_policy() {
        let mut config = crate::lending::PolicyConfig::standard();
        config.high_overheat_threshold = 80;
        let table = RegionRiskTable::new(vec![RegionRiskEntry::new("x", 75, 9.0)])
            .expect("valid table");
        let engine = Arc::new(RiskEngine::new(config, Arc::new(table)).expect("valid policy"));

        let assessment = engine
            .evaluate(&crate::lending::LoanApplication::new(0, "x", 10_000_000, false))
            .expect("evaluates");
        assert!(assessment.fired(crate::lending::RuleKind::OverheatMedium));
        assert!(!assessment.fired(crate::lending::RuleKind::OverheatHigh));

        let watchlist = regions_handler(State(Arc::clone(&engine))).await;
        assert_eq!(read_json_body(watchlist).await[0]["band"], "medium");

        let entry = region_handler(State(engine), Path("x".to_string())).await;
        assert_eq!(read_json_body(entry).await["band"], "medium");
    }
}
