//! Tests for schema report HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{
    FixtureReportCommand, FixtureReportQuery, MockReportCommand, MockReportQuery, ReportCommand,
    ReportQuery,
};
use crate::domain::{
    Error, ErrorCode, NewRuleResult, NewSchemaReport, NewViolation, ReportDraft, ReportId,
};
use crate::inbound::http::error::{json_error_handler, query_error_handler};

fn test_app(
    command: impl ReportCommand + 'static,
    query: impl ReportQuery + 'static,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(Arc::new(command), Arc::new(query));
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/api")
                .service(store_report)
                .service(list_reports)
                .service(get_report)
                .service(get_report_by_query)
                .service(dashboard)
                .service(subgraph_history),
        )
}

fn sample_payload() -> Value {
    json!({
        "timestamp": "2025-06-01T12:00:00Z",
        "subgraphName": "accounts",
        "score": 85.5,
        "totalFields": 120,
        "totalWeightedViolations": 4.25,
        "ruleResults": [
            {
                "rule": "naming",
                "message": "fields should be camelCase",
                "violations": [
                    {"message": "bad name", "location": {"line": 3, "column": 7, "type": "User"}}
                ]
            }
        ],
        "metadata": {"commit": "abc123"}
    })
}

fn stored_report() -> SchemaReport {
    let draft = ReportDraft {
        id: ReportId::random(),
        subgraph_name: Some("accounts".to_owned()),
        score: 85.5,
        total_fields: 120,
        total_weighted_violations: 4.25,
        timestamp: Utc
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
        metadata: Some(json!({"commit": "abc123"})),
        rule_results: vec![
            NewRuleResult {
                rule_name: "descriptions".to_owned(),
                message: "types need descriptions".to_owned(),
                violations: Vec::new(),
            },
            NewRuleResult {
                rule_name: "naming".to_owned(),
                message: "fields should be camelCase".to_owned(),
                violations: vec![NewViolation {
                    message: "bad name".to_owned(),
                    location: ViolationLocation {
                        line: Some(3),
                        column: Some(7),
                        type_name: Some("User".to_owned()),
                        ..ViolationLocation::default()
                    },
                }],
            },
        ],
    };
    NewSchemaReport::try_from(draft)
        .expect("valid draft")
        .to_stored(Utc::now())
        .expect("stored tree")
}

#[actix_web::test]
async fn store_report_returns_acknowledgement() {
    let stored = stored_report();
    let stored_id = stored.id;
    let mut command = MockReportCommand::new();
    command
        .expect_store_report()
        .withf(|draft| {
            draft.subgraph_name.as_deref() == Some("accounts")
                && draft.total_fields == 120
                && draft.rule_results.len() == 1
                && draft.rule_results[0].violations[0].location.line == Some(3)
        })
        .times(1)
        .return_once(move |_| Ok(stored));

    let app = actix_test::init_service(test_app(command, FixtureReportQuery)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/reports")
        .set_json(sample_payload())
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: StoreReportResponseBody = actix_test::read_body_json(res).await;
    assert!(body.success);
    assert_eq!(body.report_id, stored_id.to_string());
    assert_eq!(body.message, "Report stored successfully");
}

#[rstest]
#[case::not_json("{not json", "invalid_json")]
#[case::missing_score(r#"{"timestamp":"2025-06-01T12:00:00Z","totalFields":1,"totalWeightedViolations":0}"#, "invalid_json")]
#[actix_web::test]
async fn store_report_rejects_malformed_bodies(#[case] body: &str, #[case] code: &str) {
    let mut command = MockReportCommand::new();
    command.expect_store_report().never();

    let app = actix_test::init_service(test_app(command, FixtureReportQuery)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/reports")
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_owned())
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        payload.details().and_then(|details| details.get("code")),
        Some(&json!(code))
    );
}

#[rstest]
#[case::bad_timestamp("timestamp", json!("yesterday"), "timestamp", "invalid_timestamp")]
#[case::negative_fields("totalFields", json!(-1), "totalFields", "out_of_range")]
#[case::fields_beyond_integer("totalFields", json!(2_147_483_648_i64), "totalFields", "out_of_range")]
#[actix_web::test]
async fn store_report_rejects_untranslatable_fields(
    #[case] key: &str,
    #[case] value: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut command = MockReportCommand::new();
    command.expect_store_report().never();
    let mut payload = sample_payload();
    payload[key] = value;

    let app = actix_test::init_service(test_app(command, FixtureReportQuery)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/reports")
        .set_json(payload)
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Error = actix_test::read_body_json(res).await;
    let details = error.details().expect("details");
    assert_eq!(details["field"], field);
    assert_eq!(details["code"], code);
}

#[rstest]
#[case::invalid(Error::invalid_request("score must be finite"), StatusCode::BAD_REQUEST)]
#[case::unavailable(Error::service_unavailable("pool timed out"), StatusCode::SERVICE_UNAVAILABLE)]
#[case::internal(Error::internal("insert failed"), StatusCode::INTERNAL_SERVER_ERROR)]
#[actix_web::test]
async fn store_report_maps_service_failures(#[case] error: Error, #[case] status: StatusCode) {
    let mut command = MockReportCommand::new();
    command
        .expect_store_report()
        .times(1)
        .return_once(move |_| Err(error));

    let app = actix_test::init_service(test_app(command, FixtureReportQuery)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/reports")
        .set_json(sample_payload())
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), status);
}

#[actix_web::test]
async fn list_reports_without_subgraph_uses_recent_reports() {
    let report = stored_report();
    let summary = report.summary();
    let mut query = MockReportQuery::new();
    query
        .expect_recent_reports()
        .with(eq(50))
        .times(1)
        .return_once(move |_| Ok(vec![summary]));
    query.expect_subgraph_history().never();

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/reports")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    let items = body.as_array().expect("array body");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], report.id.to_string());
    assert_eq!(items[0]["subgraphName"], "accounts");
    assert!(items[0].get("metadata").is_none());
    assert!(items[0].get("ruleResults").is_none());
}

#[actix_web::test]
async fn list_reports_with_subgraph_uses_history() {
    let mut query = MockReportQuery::new();
    query
        .expect_subgraph_history()
        .withf(|name, limit| name == "inventory" && *limit == 5)
        .times(1)
        .return_once(|_, _| Ok(Vec::new()));
    query.expect_recent_reports().never();

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/reports?subgraph=inventory&limit=5")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!([]));
}

#[rstest]
#[case::zero("/api/reports?limit=0")]
#[case::too_large("/api/reports?limit=501")]
#[case::not_a_number("/api/reports?limit=ten")]
#[case::history("/api/subgraphs/accounts/reports?limit=-1")]
#[actix_web::test]
async fn listing_rejects_invalid_limits(#[case] uri: &str) {
    let mut query = MockReportQuery::new();
    query.expect_recent_reports().never();
    query.expect_subgraph_history().never();

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get().uri(uri).to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Error = actix_test::read_body_json(res).await;
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[actix_web::test]
async fn get_report_returns_full_tree_in_rule_order() {
    let report = stored_report();
    let id = report.id;
    let mut query = MockReportQuery::new();
    query
        .expect_get_report()
        .with(eq(id))
        .times(1)
        .return_once(move |_| Ok(report));

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/reports/{id}"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["totalFields"], 120);
    assert_eq!(body["metadata"], json!({"commit": "abc123"}));
    let rules = body["ruleResults"].as_array().expect("rule results");
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["ruleName"], "naming");
    assert_eq!(rules[0]["violationCount"], 1);
    assert_eq!(rules[1]["ruleName"], "descriptions");
    assert_eq!(rules[1]["violationCount"], 0);
    let location = &rules[0]["violations"][0]["location"];
    assert_eq!(location, &json!({"line": 3, "column": 7, "type": "User"}));
}

#[actix_web::test]
async fn get_report_by_query_accepts_id_parameter() {
    let report = stored_report();
    let id = report.id;
    let mut query = MockReportQuery::new();
    query
        .expect_get_report()
        .with(eq(id))
        .times(1)
        .return_once(move |_| Ok(report));

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/report?id={id}"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case::missing("/api/report", "missing_field")]
#[case::blank("/api/report?id=", "missing_field")]
#[case::malformed("/api/report?id=abc", "invalid_uuid")]
#[case::malformed_path("/api/reports/abc", "invalid_uuid")]
#[actix_web::test]
async fn get_report_rejects_bad_ids(#[case] uri: &str, #[case] code: &str) {
    let mut query = MockReportQuery::new();
    query.expect_get_report().never();

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get().uri(uri).to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Error = actix_test::read_body_json(res).await;
    assert_eq!(error.details().expect("details")["code"], code);
}

#[actix_web::test]
async fn get_report_returns_not_found_for_absent_reports() {
    let app = actix_test::init_service(test_app(FixtureReportCommand, FixtureReportQuery)).await;
    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/reports/{}", ReportId::random()))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let error: Error = actix_test::read_body_json(res).await;
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[actix_web::test]
async fn dashboard_renders_summaries_and_totals() {
    let report = stored_report();
    let latest_report = report.timestamp;
    let data = DashboardData {
        subgraphs: vec![SubgraphSummary {
            name: "accounts".to_owned(),
            latest_score: 85.5,
            latest_report,
            report_count: 2,
            trend: Trend::Up,
        }],
        recent_reports: vec![report.summary()],
        total_reports: 2,
    };
    let mut query = MockReportQuery::new();
    query
        .expect_dashboard()
        .times(1)
        .return_once(move || Ok(data));

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/dashboard")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["totalReports"], 2);
    assert_eq!(body["subgraphs"][0]["trend"], "up");
    assert_eq!(body["subgraphs"][0]["reportCount"], 2);
    assert_eq!(body["recentReports"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn dashboard_failure_fails_whole_request() {
    let mut query = MockReportQuery::new();
    query
        .expect_dashboard()
        .times(1)
        .return_once(|| Err(Error::service_unavailable("connection refused")));

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/dashboard")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let error: Error = actix_test::read_body_json(res).await;
    assert_eq!(error.message(), "Service temporarily unavailable");
}

#[actix_web::test]
async fn subgraph_history_passes_path_name_through() {
    let mut query = MockReportQuery::new();
    query
        .expect_subgraph_history()
        .withf(|name, limit| name == "Unknown" && *limit == 50)
        .times(1)
        .return_once(|_, _| Ok(Vec::new()));

    let app = actix_test::init_service(test_app(FixtureReportCommand, query)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/subgraphs/Unknown/reports")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
}
