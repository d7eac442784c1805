// ============================================================
// HTTP INTERFACE
// ============================================================
// The boundary the UI layer talks to. Each handler re-runs the whole
// preparation pipeline against the session's stored upload bytes; every
// domain error is caught here and surfaced as a user-visible message.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder, Scope};
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::aggregates::{
    correlation_matrix, describe, group_max, group_mean, rates_by_flag, top_n, ColumnSummary,
    CorrelationMatrix, FlagSplit, GroupStat,
};
use crate::application::use_cases::amenities::{amenity_distribution, filter_by_amenities};
use crate::application::use_cases::export::export_table;
use crate::application::use_cases::filters::{extremum, filter_by_range, Direction};
use crate::application::use_cases::preparer::{PreparedTable, TablePreparer};
use crate::domain::error::{AppError, Result as AppResult};
use crate::domain::schema::{
    COL_LOCATION, COL_NAME, COL_STARTING_RATE, COL_TOTAL_ROOMS, COL_DINING_AREA,
};
use crate::domain::table::{DataTable, TableRow};
use crate::infrastructure::server_config::ServerConfig;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    /// Raw upload bytes per session. Only the bytes are kept; everything
    /// derived is rebuilt per request.
    pub sessions: Mutex<HashMap<String, Vec<u8>>>,
    pub preparer: TablePreparer,
    pub export_dir: PathBuf,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Debug, Deserialize)]
pub struct RangeFilterRequest {
    pub rate_min: f64,
    pub rate_max: f64,
    pub rooms_min: f64,
    pub rooms_max: f64,
}

#[derive(Debug, Deserialize)]
pub struct AmenityFilterRequest {
    pub selected: Vec<String>,
}

#[derive(Serialize)]
pub struct OverviewResponse {
    pub session_id: String,
    pub row_count: usize,
    pub column_count: usize,
    pub headers: Vec<String>,
    pub preview: Vec<TableRow>,
    pub summary: Vec<ColumnSummary>,
}

#[derive(Serialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub row_count: usize,
}

/// The columns shown for the most/least expensive hotels
#[derive(Serialize)]
pub struct HotelHighlight {
    pub name: String,
    pub location: String,
    pub starting_rate: String,
    pub total_rooms: String,
}

#[derive(Serialize)]
pub struct ExtremesResponse {
    pub most_expensive: HotelHighlight,
    pub least_expensive: HotelHighlight,
}

#[derive(Serialize)]
pub struct AmenitiesResponse {
    pub amenities: Vec<String>,
}

#[derive(Serialize)]
pub struct AggregatesResponse {
    pub location_rate_means: Vec<GroupStat>,
    pub top_dining_by_max_rate: Vec<GroupStat>,
    pub top_amenities: Vec<(String, usize)>,
    pub rates_by_flags: Vec<FlagSplit>,
    pub correlation: CorrelationMatrix,
}

#[derive(Serialize)]
pub struct ExportResponse {
    pub message: String,
    pub path: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl TableView {
    fn from_table(table: &DataTable) -> Self {
        Self {
            headers: table.headers().to_vec(),
            rows: table.rows().to_vec(),
            row_count: table.row_count(),
        }
    }
}

impl HotelHighlight {
    fn from_row(table: &DataTable, row: &TableRow) -> Self {
        let cell = |name: &str| table.value(row, name).unwrap_or("").to_string();
        Self {
            name: cell(COL_NAME),
            location: cell(COL_LOCATION),
            starting_rate: cell(COL_STARTING_RATE),
            total_rooms: cell(COL_TOTAL_ROOMS),
        }
    }
}

/// Map a domain error to a visible message and an HTTP status. Nothing
/// here crashes the session; the UI renders the message.
fn error_response(logs: &Mutex<Vec<LogEntry>>, err: AppError) -> HttpResponse {
    add_log(logs, "ERROR", "Analysis", &err.to_string());
    tracing::error!(error = %err, "Request failed");

    let body = ErrorBody {
        error: err.to_string(),
    };
    match err {
        AppError::Range { .. } => HttpResponse::BadRequest().json(body),
        AppError::IoError(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::UnprocessableEntity().json(body),
    }
}

fn unknown_session(logs: &Mutex<Vec<LogEntry>>, id: &str) -> HttpResponse {
    let message = format!("Unknown session: {}", id);
    add_log(logs, "ERROR", "Analysis", &message);
    HttpResponse::NotFound().json(ErrorBody { error: message })
}

/// Re-run the preparation pipeline for a session
fn prepare_session(data: &web::Data<HttpState>, id: &str) -> Option<AppResult<PreparedTable>> {
    let bytes = {
        let sessions = data.sessions.lock().unwrap();
        sessions.get(id).cloned()?
    };
    Some(data.preparer.prepare_bytes(&bytes))
}

fn apply_range_filters(
    table: &DataTable,
    req: &RangeFilterRequest,
) -> AppResult<DataTable> {
    let by_rate = filter_by_range(table, COL_STARTING_RATE, req.rate_min, req.rate_max)?;
    filter_by_range(&by_rate, COL_TOTAL_ROOMS, req.rooms_min, req.rooms_max)
}

#[post("/upload")]
async fn upload(data: web::Data<HttpState>, body: web::Bytes) -> impl Responder {
    let prepared = match data.preparer.prepare_bytes(&body) {
        Ok(prepared) => prepared,
        Err(e) => return error_response(&data.logs, e),
    };

    let session_id = Uuid::new_v4().to_string();
    data.sessions
        .lock()
        .unwrap()
        .insert(session_id.clone(), body.to_vec());

    add_log(
        &data.logs,
        "INFO",
        "Analysis",
        &format!(
            "Uploaded dataset: {} rows, {} columns",
            prepared.row_count, prepared.column_count
        ),
    );

    HttpResponse::Ok().json(OverviewResponse {
        session_id,
        row_count: prepared.row_count,
        column_count: prepared.column_count,
        headers: prepared.headers.clone(),
        preview: prepared.preview.clone(),
        summary: describe(&prepared.table),
    })
}

#[get("/sessions/{id}/overview")]
async fn overview(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match prepare_session(&data, &id) {
        None => unknown_session(&data.logs, &id),
        Some(Err(e)) => error_response(&data.logs, e),
        Some(Ok(prepared)) => HttpResponse::Ok().json(OverviewResponse {
            session_id: id,
            row_count: prepared.row_count,
            column_count: prepared.column_count,
            headers: prepared.headers.clone(),
            preview: prepared.preview.clone(),
            summary: describe(&prepared.table),
        }),
    }
}

#[post("/sessions/{id}/filter")]
async fn filter(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<RangeFilterRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let prepared = match prepare_session(&data, &id) {
        None => return unknown_session(&data.logs, &id),
        Some(Err(e)) => return error_response(&data.logs, e),
        Some(Ok(prepared)) => prepared,
    };

    match apply_range_filters(&prepared.table, &req) {
        Ok(filtered) => {
            add_log(
                &data.logs,
                "INFO",
                "Analysis",
                &format!("Filtered dataset contains {} rows", filtered.row_count()),
            );
            HttpResponse::Ok().json(TableView::from_table(&filtered))
        }
        Err(e) => error_response(&data.logs, e),
    }
}

#[get("/sessions/{id}/extremes")]
async fn extremes(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let prepared = match prepare_session(&data, &id) {
        None => return unknown_session(&data.logs, &id),
        Some(Err(e)) => return error_response(&data.logs, e),
        Some(Ok(prepared)) => prepared,
    };

    let most = extremum(&prepared.table, COL_STARTING_RATE, Direction::Max);
    let least = extremum(&prepared.table, COL_STARTING_RATE, Direction::Min);

    match (most, least) {
        (Ok(most), Ok(least)) => HttpResponse::Ok().json(ExtremesResponse {
            most_expensive: HotelHighlight::from_row(&prepared.table, &most),
            least_expensive: HotelHighlight::from_row(&prepared.table, &least),
        }),
        (Err(e), _) | (_, Err(e)) => error_response(&data.logs, e),
    }
}

#[get("/sessions/{id}/amenities")]
async fn amenities(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match prepare_session(&data, &id) {
        None => unknown_session(&data.logs, &id),
        Some(Err(e)) => error_response(&data.logs, e),
        Some(Ok(prepared)) => HttpResponse::Ok().json(AmenitiesResponse {
            amenities: prepared.amenities,
        }),
    }
}

#[post("/sessions/{id}/amenities/filter")]
async fn amenities_filter(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<AmenityFilterRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let prepared = match prepare_session(&data, &id) {
        None => return unknown_session(&data.logs, &id),
        Some(Err(e)) => return error_response(&data.logs, e),
        Some(Ok(prepared)) => prepared,
    };

    match filter_by_amenities(&prepared.table, &req.selected) {
        Ok(filtered) => {
            add_log(
                &data.logs,
                "INFO",
                "Analysis",
                &format!(
                    "Filtered by amenities dataset contains {} rows",
                    filtered.row_count()
                ),
            );
            HttpResponse::Ok().json(TableView::from_table(&filtered))
        }
        Err(e) => error_response(&data.logs, e),
    }
}

#[get("/sessions/{id}/aggregates")]
async fn aggregates(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let prepared = match prepare_session(&data, &id) {
        None => return unknown_session(&data.logs, &id),
        Some(Err(e)) => return error_response(&data.logs, e),
        Some(Ok(prepared)) => prepared,
    };
    let table = &prepared.table;
    let config = data.preparer.config();

    let location_rate_means = match group_mean(table, COL_LOCATION, COL_STARTING_RATE) {
        Ok(stats) => stats,
        Err(e) => return error_response(&data.logs, e),
    };
    let top_dining = match group_max(table, COL_DINING_AREA, COL_STARTING_RATE) {
        Ok(stats) => top_n(stats, config.top_n),
        // Dining Area is optional; without it the ranking is just empty.
        Err(AppError::Schema(_)) => Vec::new(),
        Err(e) => return error_response(&data.logs, e),
    };

    let mut rates_by_flags = Vec::new();
    for flag in &config.amenity_flags {
        match rates_by_flag(table, &flag.column, COL_STARTING_RATE) {
            Ok(split) => rates_by_flags.push(split),
            Err(e) => return error_response(&data.logs, e),
        }
    }

    let mut top_amenities = amenity_distribution(table);
    top_amenities.truncate(config.top_n);

    HttpResponse::Ok().json(AggregatesResponse {
        location_rate_means,
        top_dining_by_max_rate: top_dining,
        top_amenities,
        rates_by_flags,
        correlation: correlation_matrix(table),
    })
}

#[post("/sessions/{id}/export")]
async fn export(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<RangeFilterRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let prepared = match prepare_session(&data, &id) {
        None => return unknown_session(&data.logs, &id),
        Some(Err(e)) => return error_response(&data.logs, e),
        Some(Ok(prepared)) => prepared,
    };

    let filtered = match apply_range_filters(&prepared.table, &req) {
        Ok(filtered) => filtered,
        Err(e) => return error_response(&data.logs, e),
    };

    let file_name = &data.preparer.config().export_file_name;
    match export_table(&filtered, &data.export_dir, file_name) {
        Ok(path) => {
            let message = format!("Filtered data has been saved as '{}'", file_name);
            add_log(&data.logs, "INFO", "Analysis", &message);
            HttpResponse::Ok().json(ExportResponse {
                message,
                path: path.display().to_string(),
            })
        }
        Err(e) => error_response(&data.logs, e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap().clone();
    HttpResponse::Ok().json(logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap();
    logs.push(entry.clone());
    if logs.len() > 100 {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

fn api_scope() -> Scope {
    web::scope("/api")
        .service(upload)
        .service(overview)
        .service(filter)
        .service(extremes)
        .service(amenities)
        .service(amenities_filter)
        .service(aggregates)
        .service(export)
        .service(get_logs)
}

pub fn start_server(config: &ServerConfig) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState {
        sessions: Mutex::new(HashMap::new()),
        preparer: TablePreparer::default_config(),
        export_dir: config.export_dir.clone(),
        logs: Arc::new(Mutex::new(Vec::new())),
    });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new().wrap(cors).app_data(state.clone()).service(api_scope())
    })
    .bind(config.bind_addr())?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    const HOTELS_CSV: &str = "\
Name,Location,Starting Rate in ($),Total Rooms,Dining Area,Hotel Ammenties
Aman Tokyo,Tokyo,1200,84,Rooftop,\"Spa/wellness centre, Gym\"
The Connaught,London,780,121,Garden,\"Swimming pool, Bar\"
Cheval Blanc,Paris,999,72,Terrace,\"Swimming pool, Spa/wellness centre\"
";

    fn test_state() -> web::Data<HttpState> {
        web::Data::new(HttpState {
            sessions: Mutex::new(HashMap::new()),
            preparer: TablePreparer::default_config(),
            export_dir: std::env::temp_dir().join("hotelscope_http_test"),
            logs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    macro_rules! upload_fixture {
        ($app:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/upload")
                .set_payload(HOTELS_CSV)
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json($app, req).await;
            body["session_id"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn test_upload_returns_overview() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(api_scope()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/upload")
            .set_payload(HOTELS_CSV)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["row_count"], 3);
        assert!(body["headers"]
            .as_array()
            .unwrap()
            .iter()
            .any(|h| h.as_str() == Some("Has Swimming Pool")));
        assert!(!body["session_id"].as_str().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_upload_missing_column_is_rejected() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(api_scope()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/upload")
            .set_payload("Name,Location\nAman Tokyo,Tokyo\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 422);
    }

    #[actix_web::test]
    async fn test_filter_and_extremes() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(api_scope()),
        )
        .await;
        let session_id = upload_fixture!(&app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/filter", session_id))
            .set_json(serde_json::json!({
                "rate_min": 900.0, "rate_max": 1300.0,
                "rooms_min": 0.0, "rooms_max": 1000.0
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["row_count"], 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/extremes", session_id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["most_expensive"]["name"], "Aman Tokyo");
        assert_eq!(body["least_expensive"]["name"], "The Connaught");
    }

    #[actix_web::test]
    async fn test_inverted_range_is_bad_request() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(api_scope()),
        )
        .await;
        let session_id = upload_fixture!(&app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/filter", session_id))
            .set_json(serde_json::json!({
                "rate_min": 500.0, "rate_max": 100.0,
                "rooms_min": 0.0, "rooms_max": 1000.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_amenity_filter_or_match() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(api_scope()),
        )
        .await;
        let session_id = upload_fixture!(&app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/amenities/filter", session_id))
            .set_json(serde_json::json!({ "selected": ["Spa"] }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["row_count"], 2);
    }

    #[actix_web::test]
    async fn test_aggregates_shape() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(api_scope()),
        )
        .await;
        let session_id = upload_fixture!(&app);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/aggregates", session_id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["location_rate_means"].as_array().unwrap().len(), 3);
        assert!(body["correlation"]["columns"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c.as_str() == Some("Starting Rate in ($)")));
        assert_eq!(body["rates_by_flags"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_unknown_session_is_not_found() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(api_scope()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/sessions/nope/overview")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
