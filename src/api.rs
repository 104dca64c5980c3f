//! Route definitions for the `/image` resource

use actix_web::error::JsonPayloadError;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use crate::app_state::AppState;
use crate::error::IngestError;
use crate::metadata::ImageUpdate;
use crate::service;

#[post("/image/upload")]
pub async fn upload(
    payload: web::Payload,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    service::upload_service(payload, req, app_state).await
}

#[put("/image/entity")]
pub async fn update(
    body: web::Json<ImageUpdate>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    service::update_service(body.into_inner(), req, app_state).await
}

#[delete("/image/entity/{id}")]
pub async fn delete_image(
    path: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    service::delete_service(path.into_inner(), req, app_state).await
}

#[get("/image/entity/{id}")]
pub async fn get_image(
    path: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    service::get_service(path.into_inner(), req, app_state).await
}

#[get("/image/entity")]
pub async fn list(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, IngestError> {
    service::list_service(req, app_state).await
}

#[get("/image/content/{id}")]
pub async fn content(
    path: web::Path<String>,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    service::content_service(path.into_inner(), req, app_state).await
}

#[get("/image/amount")]
pub async fn amount(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, IngestError> {
    service::amount_service(req, app_state).await
}

#[get("/image/managedamount")]
pub async fn managed_amount(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, IngestError> {
    service::managed_amount_service(req, app_state).await
}

#[get("/image/size")]
pub async fn size(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, IngestError> {
    service::size_service(req, app_state).await
}

/// Register every image route on an app or scope
/// Malformed entity bodies answer with the same JSON error shape as every
/// other failure.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    IngestError::InvalidPayload(err.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(upload)
        .service(update)
        .service(delete_image)
        .service(list)
        .service(get_image)
        .service(content)
        .service(amount)
        .service(managed_amount)
        .service(size);
}
