//! HTTP API for the Attendance Engine.
//!
//! This module exposes a minimal, stateless REST API around the
//! summary engine and roster analytics using the
//! [`axum`](https://crates.io/crates/axum) framework.  Clients post the
//! data to compute over and receive the results; nothing is persisted
//! server side.  The only shared state is the holiday table the engine
//! consults.

use crate::analytics::{compare, monthly_statistics, report, MonthComparison, MonthlyStatistics};
use crate::calendar::HolidayTable;
use crate::codes::normalize;
use crate::config::Config;
use crate::engine::{summarize, SummaryMismatch};
use crate::error::AttendanceError;
use crate::io::{import_rows, read_csv, write_csv};
use crate::models::{DayAttendance, EmployeeRecord, EmployeeSummary, Month, Roster};
use crate::mutators::refresh;
use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Application state shared across requests.
pub struct AppState {
    pub holidays: RwLock<HolidayTable>,
    /// Year assumed for CSV imports.
    pub default_year: i32,
}

/// Build the API router and load the holiday table named by the
/// configuration.  Returns the router and a handle to the state.
pub async fn build_router(config: &Config) -> Result<(Router, Arc<AppState>)> {
    let holidays = config.holiday_table()?;
    let state = Arc::new(AppState {
        holidays: RwLock::new(holidays),
        default_year: config.default_year,
    });
    let router = Router::new()
        .route("/api/summary", post(summary_handler))
        .route("/api/statistics", post(statistics_handler))
        .route("/api/report", post(report_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/export", post(export_handler))
        .route("/api/import", post(import_handler))
        .with_state(state.clone());
    Ok((router, state))
}

/// Error body returned by every handler.
pub struct ApiError(AttendanceError);

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AttendanceError::Validation(_)
            | AttendanceError::UnknownCode(_)
            | AttendanceError::UnknownMonth(_)
            | AttendanceError::MalformedRow { .. }
            | AttendanceError::UnsupportedVersion(_)
            | AttendanceError::Csv(_)
            | AttendanceError::Json(_) => StatusCode::BAD_REQUEST,
            AttendanceError::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Io(_) => {
                error!("request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({
            "error": self.0.to_string(),
            "messages": self.0.messages(),
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    /// Raw cell values keyed by day; normalised before use.
    pub attendance: BTreeMap<u32, String>,
    pub month: Month,
    pub year: i32,
}

/// Handler for POST /api/summary
async fn summary_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> Json<EmployeeSummary> {
    let attendance: DayAttendance = request
        .attendance
        .iter()
        .filter_map(|(day, raw)| normalize(raw).map(|code| (*day, code)))
        .collect();
    let holidays = app_state.holidays.read().await;
    Json(summarize(&attendance, request.month, request.year, &holidays))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRequest {
    pub employees: Vec<EmployeeRecord>,
    pub as_of: NaiveDate,
}

/// Handler for POST /api/statistics
async fn statistics_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<StatisticsRequest>,
) -> Result<Json<MonthlyStatistics>, ApiError> {
    let holidays = app_state.holidays.read().await;
    let roster = Roster::from_records(request.employees, &holidays)?;
    Ok(Json(monthly_statistics(&roster, request.as_of)))
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub employee: EmployeeRecord,
}

/// Handler for POST /api/report.  Responds with plain text.
async fn report_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> String {
    let holidays = app_state.holidays.read().await;
    report(&refresh(&request.employee, &holidays))
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub current: EmployeeSummary,
    pub previous: EmployeeSummary,
}

/// Handler for POST /api/compare
async fn compare_handler(Json(request): Json<CompareRequest>) -> Json<MonthComparison> {
    Json(compare(&request.current, &request.previous))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub employees: Vec<EmployeeRecord>,
}

/// Handler for POST /api/export.  Responds with CSV.
async fn export_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let holidays = app_state.holidays.read().await;
    let roster = Roster::from_records(request.employees, &holidays)?;
    let mut buf = Vec::new();
    write_csv(&roster, &mut buf)?;
    info!(employees = roster.len(), bytes = buf.len(), "exported roster");
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], buf))
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub employees: Roster,
    pub mismatches: Vec<SummaryMismatch>,
}

/// Handler for POST /api/import.  Accepts the CSV layout produced by
/// the export endpoint.
async fn import_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let rows = read_csv(body.as_bytes())?;
    let holidays = app_state.holidays.read().await;
    let outcome = import_rows(rows, app_state.default_year, &holidays)?;
    Ok(Json(ImportResponse {
        employees: outcome.roster,
        mismatches: outcome.mismatches,
    }))
}

/// Launch the API server.  This function builds the router from the
/// configuration and binds to the configured address.  It blocks until
/// the server terminates (e.g. when interrupted).
pub async fn serve(config: Config) -> Result<()> {
    let (router, _state) = build_router(&config).await?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
