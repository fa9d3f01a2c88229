use crate::api::api_error::APIError;
use crate::api::model::{BulkRecordRequest, RecordRequest, ZoneQuery};
use crate::api::server::AppState;
use crate::dns::{DnsRecord, DnsRecordType};
use crate::error::Error;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use lazy_static::lazy_static;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Windows DNS API", description = "API for interacting with Windows DNS"),
    paths(
        health_check,
        app_info,
        list_records,
        get_records_by_hostname,
        create_record,
        bulk_create_records,
        delete_record,
    ),
    components(schemas(DnsRecord, DnsRecordType, RecordRequest, BulkRecordRequest))
)]
struct ApiDoc;

lazy_static! {
    static ref OPENAPI: utoipa::openapi::OpenApi = ApiDoc::openapi();
}

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/info", get(app_info))
        .route("/openapi.json", get(openapi))
        .route(
            "/dns",
            get(list_records).post(create_record).delete(delete_record),
        )
        .route("/dns/bulk", post(bulk_create_records))
        .route("/dns/:host_name", get(get_records_by_hostname))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

fn authorize(state: &AppState, client_addr: SocketAddr) -> Result<(), Error> {
    let client_addr = client_addr.ip();
    if state.config.update_permitted(client_addr) {
        return Ok(());
    }
    tracing::debug!("rejected update from {client_addr}");
    Err(Error::AuthForbidden(client_addr))
}

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "Health",
    responses(
        (status = 200, description = "PowerShell and the DnsServer module are usable"),
        (status = 503, description = "PowerShell failed or DnsServer is missing")
    )
)]
async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, APIError> {
    state.records.check_health().await?;
    Ok(Json(json!({"ok":"healthy"})))
}

#[utoipa::path(
    get,
    path = "/info",
    tag = "Info",
    responses((status = 200, description = "Application version", body = String))
)]
#[allow(clippy::unused_async)]
async fn app_info() -> impl IntoResponse {
    Json(env!("CARGO_PKG_VERSION"))
}

#[allow(clippy::unused_async)]
async fn openapi() -> impl IntoResponse {
    Json(&*OPENAPI)
}

#[utoipa::path(
    get,
    path = "/dns",
    tag = "DNS",
    params(ZoneQuery),
    responses(
        (status = 200, description = "A, AAAA and CNAME records of the zone", body = [DnsRecord]),
        (status = 400, description = "The records could not be retrieved")
    )
)]
async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> Result<Json<Vec<DnsRecord>>, APIError> {
    tracing::info!("fielding DNS records request (/dns)");
    let zone_name = query.zone_name.as_deref();
    match state.records.list_records(zone_name).await {
        Some(records) => Ok(Json(records)),
        None => Err(Error::ListFailed(state.records.resolve_zone(zone_name).to_string()).into()),
    }
}

#[utoipa::path(
    get,
    path = "/dns/{hostName}",
    tag = "DNS",
    params(
        ("hostName" = String, Path, description = "Host name within the zone"),
        ZoneQuery
    ),
    responses(
        (status = 200, description = "Records with this host name", body = [DnsRecord]),
        (status = 404, description = "No record found")
    )
)]
async fn get_records_by_hostname(
    State(state): State<AppState>,
    Path(host_name): Path<String>,
    Query(query): Query<ZoneQuery>,
) -> Result<Json<Vec<DnsRecord>>, APIError> {
    tracing::info!(
        "fielding DNS record request for \"{host_name}\" in zone {:?}",
        query.zone_name
    );
    match state
        .records
        .get_records_by_hostname(&host_name, query.zone_name.as_deref())
        .await
    {
        Some(records) => Ok(Json(records)),
        None => Err(Error::NotFound(host_name).into()),
    }
}

#[utoipa::path(
    post,
    path = "/dns",
    tag = "DNS",
    request_body = RecordRequest,
    responses(
        (status = 201, description = "Record created, or an identical record already existed", body = DnsRecord),
        (status = 400, description = "Record was invalid or could not be created"),
        (status = 403, description = "Client is outside the configured ACL")
    )
)]
async fn create_record(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordRequest>, APIError>,
) -> Result<impl IntoResponse, APIError> {
    authorize(&state, client_addr)?;
    tracing::info!("creating DNS record");
    let record = payload.validate()?;
    match state.records.create_record(&record).await {
        Some(created) => {
            let location = format!("/dns/{}?zoneName={}", created.host_name, created.zone_name);
            Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
        }
        None => Err(Error::CreateFailed(record.record_type.to_string(), record.host_name).into()),
    }
}

#[utoipa::path(
    post,
    path = "/dns/bulk",
    tag = "DNS",
    request_body = BulkRecordRequest,
    responses(
        (status = 201, description = "Records that were created or already existed", body = [DnsRecord]),
        (status = 400, description = "A record was invalid, or none could be created"),
        (status = 403, description = "Client is outside the configured ACL")
    )
)]
async fn bulk_create_records(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Json(payload), _): WithRejection<Json<BulkRecordRequest>, APIError>,
) -> Result<impl IntoResponse, APIError> {
    authorize(&state, client_addr)?;
    tracing::info!("creating {} DNS records", payload.records.len());
    let mut created = Vec::with_capacity(payload.records.len());
    // Records are created one at a time, the first invalid one ends the request.
    for request in &payload.records {
        let record = request.validate()?;
        if let Some(record) = state.records.create_record(&record).await {
            created.push(record);
        }
    }
    if created.is_empty() {
        return Err(Error::BulkCreateFailed.into());
    }
    Ok((StatusCode::CREATED, [(header::LOCATION, "/dns/")], Json(created)))
}

#[utoipa::path(
    delete,
    path = "/dns",
    tag = "DNS",
    request_body = RecordRequest,
    responses(
        (status = 202, description = "Record deleted"),
        (status = 400, description = "Record was invalid or could not be deleted"),
        (status = 403, description = "Client is outside the configured ACL")
    )
)]
async fn delete_record(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordRequest>, APIError>,
) -> Result<StatusCode, APIError> {
    authorize(&state, client_addr)?;
    tracing::info!("deleting DNS record");
    let record = payload.validate()?;
    if state.records.delete_record(&record).await {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(Error::DeleteFailed(record.record_type.to_string(), record.host_name).into())
    }
}
