use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::core::{Chart, ChartKind, HouseholdForm, build_chart};
use crate::error::{PlannerError, Result};
use crate::report::ProjectionSummary;
use crate::report::export::{CSV_CONTENT_TYPE, report_csv_string};
use crate::report::report_file_name;
use crate::report::workbook::{XLSX_CONTENT_TYPE, report_xlsx};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChartQuery {
    chart: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/projection/chart",
            get(chart_get_handler).post(chart_post_handler),
        )
        .route(
            "/api/projection/charts",
            get(charts_get_handler).post(charts_post_handler),
        )
        .route(
            "/api/projection/export.csv",
            get(export_get_handler).post(export_post_handler),
        )
        .route(
            "/api/projection/export.xlsx",
            get(workbook_get_handler).post(workbook_post_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Retirement planner API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{}/api/projection", addr.port());

    axum::serve(listener, router()).await?;
    Ok(())
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(Query(form): Query<HouseholdForm>) -> Response {
    projection_handler_impl(form)
}

async fn projection_post_handler(Json(form): Json<HouseholdForm>) -> Response {
    projection_handler_impl(form)
}

async fn chart_get_handler(
    Query(query): Query<ChartQuery>,
    Query(form): Query<HouseholdForm>,
) -> Response {
    chart_handler_impl(query, form)
}

async fn chart_post_handler(
    Query(query): Query<ChartQuery>,
    Json(form): Json<HouseholdForm>,
) -> Response {
    chart_handler_impl(query, form)
}

async fn charts_get_handler(Query(form): Query<HouseholdForm>) -> Response {
    charts_handler_impl(form)
}

async fn charts_post_handler(Json(form): Json<HouseholdForm>) -> Response {
    charts_handler_impl(form)
}

async fn export_get_handler(Query(form): Query<HouseholdForm>) -> Response {
    export_handler_impl(form)
}

async fn export_post_handler(Json(form): Json<HouseholdForm>) -> Response {
    export_handler_impl(form)
}

async fn workbook_get_handler(Query(form): Query<HouseholdForm>) -> Response {
    workbook_handler_impl(form)
}

async fn workbook_post_handler(Json(form): Json<HouseholdForm>) -> Response {
    workbook_handler_impl(form)
}

fn summarize(form: HouseholdForm) -> ProjectionSummary {
    let summary = ProjectionSummary::run(form.into_params(current_year()));
    debug!(
        household = %summary.household_name,
        years = summary.records.len(),
        "projection computed"
    );
    summary
}

fn projection_handler_impl(form: HouseholdForm) -> Response {
    json_response(StatusCode::OK, summarize(form))
}

fn chart_handler_impl(query: ChartQuery, form: HouseholdForm) -> Response {
    let kind = match parse_chart_kind(query.chart.as_deref()) {
        Ok(kind) => kind,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    let summary = summarize(form);
    json_response(
        StatusCode::OK,
        build_chart(kind, &summary.records, summary.retirement_age),
    )
}

fn charts_handler_impl(form: HouseholdForm) -> Response {
    let summary = summarize(form);
    let charts: Vec<Chart> = ChartKind::ALL
        .into_iter()
        .map(|kind| build_chart(kind, &summary.records, summary.retirement_age))
        .collect();
    json_response(StatusCode::OK, charts)
}

fn export_handler_impl(form: HouseholdForm) -> Response {
    let summary = summarize(form);
    match report_csv_string(&summary.report()) {
        Ok(body) => attachment_response(
            CSV_CONTENT_TYPE,
            &report_file_name(&summary.household_name, "Projection.csv"),
            body,
        ),
        Err(e) => {
            error!("CSV export failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Export failed")
        }
    }
}

fn workbook_handler_impl(form: HouseholdForm) -> Response {
    let summary = summarize(form);
    match report_xlsx(&summary.report()) {
        Ok(body) => attachment_response(
            XLSX_CONTENT_TYPE,
            &report_file_name(&summary.household_name, "Projection.xlsx"),
            body,
        ),
        Err(e) => {
            error!("Spreadsheet export failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Export failed")
        }
    }
}

fn attachment_response(
    content_type: &'static str,
    file_name: &str,
    body: impl IntoResponse,
) -> Response {
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        body,
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, content_disposition(file_name));
    with_cache_control(response)
}

fn parse_chart_kind(raw: Option<&str>) -> Result<ChartKind> {
    match raw {
        Some(name) => name.parse(),
        None => Err(PlannerError::UnknownChart(String::new())),
    }
}

/// Quoted ASCII `filename` for every client, plus an RFC 5987 `filename*`
/// when the name has characters the quoted form cannot carry.
fn content_disposition(file_name: &str) -> HeaderValue {
    let cleaned: String = file_name
        .chars()
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect();
    let fallback: String = cleaned
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();

    let value = if fallback == cleaned {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            rfc5987_encode(&cleaned)
        )
    };
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn rfc5987_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    const SAMPLE_QUERY: &str = "firstName1=John&lastName1=Smith&currentAge1=30\
        &firstName2=Jane&lastName2=Smith&currentAge2=28&retirementAge=65\
        &currentSavings=75000&annualSavings=25000&annualSavingsIncrease=1\
        &preRetirementReturn=6.75&postRetirementReturn=4&currentExpenses=60000\
        &inflationRate=2.5&lifeExpectancy=100&startYear=2025";

    async fn send(request: Request<Body>) -> Response {
        router()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    async fn get(uri: &str) -> Response {
        send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }

    async fn post_json(uri: &str, json: &str) -> Response {
        send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("valid request"),
        )
        .await
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).expect("body should be JSON")
    }

    #[tokio::test]
    async fn projection_query_returns_full_record_sequence() {
        let response = get(&format!("/api/projection?{SAMPLE_QUERY}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let json = body_json(response).await;
        assert_eq!(json["householdName"], "John and Jane Smith");
        assert_eq!(json["retirementAge"], 65);
        assert_eq!(json["retirementIndex"], 35);

        let records = json["records"].as_array().expect("records array");
        assert_eq!(records.len(), 71);
        assert_eq!(records[0]["year"], 2025);
        assert_eq!(records[0]["beginningBalance"], 75000.0);
        assert_eq!(records[0]["age2"], 28);
        assert_eq!(records[35]["isRetired"], true);
        assert_eq!(records[35]["contribution"], 0.0);
    }

    #[tokio::test]
    async fn projection_post_tolerates_bad_fields() {
        let response = post_json(
            "/api/projection",
            r#"{
              "currentAge1": "40",
              "retirementAge": "",
              "currentSavings": "lots",
              "annualSavings": null,
              "lifeExpectancy": 45,
              "startYear": 2030
            }"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["householdName"], "Retirement Projection");
        assert_eq!(json["retirementIndex"], 0);
        let records = json["records"].as_array().expect("records array");
        assert_eq!(records.len(), 6);
        assert_eq!(records[0]["beginningBalance"], 0.0);
        assert!(records[0]["age2"].is_null());
    }

    #[tokio::test]
    async fn inverted_bounds_return_empty_records() {
        let response = get("/api/projection?currentAge1=80&lifeExpectancy=70").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["records"].as_array().map(Vec::len), Some(0));
        assert!(json["retirementIndex"].is_null());
    }

    #[tokio::test]
    async fn chart_endpoint_returns_requested_preset() {
        let response = get(&format!("/api/projection/chart?chart=withdrawal&{SAMPLE_QUERY}")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["kind"], "withdrawal");
        assert_eq!(json["title"], "Withdrawal Rate Risk");
        assert_eq!(json["referenceLines"][0]["value"], 0.04);
        let points = json["series"][0]["points"].as_array().expect("points");
        assert_eq!(points.len(), 36);
        assert_eq!(points[0]["age"], 65);
    }

    #[tokio::test]
    async fn chart_post_reads_kind_from_query() {
        let response = post_json(
            "/api/projection/chart?chart=netWorth",
            r#"{ "currentAge1": 30, "retirementAge": 65, "lifeExpectancy": 90 }"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "net-worth");
        assert_eq!(json["retirementMarker"], 65);
        assert_eq!(
            json["series"][0]["points"].as_array().map(Vec::len),
            Some(61)
        );
    }

    #[tokio::test]
    async fn chart_endpoint_rejects_unknown_or_missing_kind() {
        let response = get("/api/projection/chart?chart=pie").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap_or_default().contains("pie"));

        let response = get("/api/projection/chart").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn charts_endpoint_returns_all_presets_in_order() {
        let response = get(&format!("/api/projection/charts?{SAMPLE_QUERY}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let kinds: Vec<&str> = json
            .as_array()
            .expect("chart array")
            .iter()
            .filter_map(|chart| chart["kind"].as_str())
            .collect();
        assert_eq!(kinds, ["net-worth", "compounding", "cash-flow", "withdrawal"]);
    }

    #[tokio::test]
    async fn export_returns_csv_attachment() {
        let response = get(&format!("/api/projection/export.csv?{SAMPLE_QUERY}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static(CSV_CONTENT_TYPE))
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION),
            Some(&HeaderValue::from_static(
                "attachment; filename=\"John_and_Jane_Smith_Projection.csv\""
            ))
        );

        let body = body_text(response).await;
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "John and Jane Smith");
        assert_eq!(lines.len(), 3 + 71);
        assert!(lines[3].starts_with("2025,30,28,\"$75,000\",\"$25,000\",6.75%,-,"));
    }

    #[tokio::test]
    async fn workbook_export_returns_xlsx_attachment() {
        let response = post_json(
            "/api/projection/export.xlsx",
            r#"{ "firstName1": "José", "lastName1": "García", "currentAge1": 64,
                 "retirementAge": 65, "lifeExpectancy": 66, "startYear": 2025 }"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static(XLSX_CONTENT_TYPE))
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION),
            Some(&HeaderValue::from_static(
                "attachment; filename=\"Jos__Garc_a_Projection.xlsx\"; \
                 filename*=UTF-8''Jos%C3%A9_Garc%C3%ADa_Projection.xlsx"
            ))
        );

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn health_and_fallback_routes() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let response = get("/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }

    #[test]
    fn content_disposition_strips_quotes() {
        let value = content_disposition("Bob \"The Saver\"_Projection.csv");
        assert_eq!(
            value.to_str().ok(),
            Some("attachment; filename=\"Bob The Saver_Projection.csv\"")
        );
    }

    #[test]
    fn content_disposition_adds_encoded_name_for_non_ascii() {
        let value = content_disposition("Zoë \"Z\"_Projection.csv");
        assert_eq!(
            value.to_str().ok(),
            Some(
                "attachment; filename=\"Zo_ Z_Projection.csv\"; \
                 filename*=UTF-8''Zo%C3%AB%20Z_Projection.csv"
            )
        );
    }
}
