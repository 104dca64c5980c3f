//service/mod.rs
pub mod image_service;
pub mod ingestion;
pub mod user_context;

use actix_web::{web, HttpRequest, HttpResponse};
use bytes::BytesMut;
use futures::StreamExt;
use log::{debug, error, info};

use crate::app_state::AppState;
use crate::error::IngestError;
use crate::metadata::ImageUpdate;
use crate::service::user_context::UserContext;
use crate::util::serializer::decode_upload;

fn header_handler(req: &HttpRequest, app_state: &AppState) -> Result<UserContext, IngestError> {
    UserContext::from_request(req, &app_state.config.metadata.auth_header)
}

fn plain_number(value: u64) -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body(value.to_string())
}

pub async fn upload_service(
    mut payload: web::Payload,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;

    let limit = app_state.config.server.max_payload_size;
    info!("Starting chunk load");
    let mut bytes = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| IngestError::InvalidPayload(e.to_string()))?;
        if bytes.len() + chunk.len() > limit {
            error!("Upload exceeds {} bytes, refusing", limit);
            return Err(IngestError::PayloadTooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() {
        error!("No data uploaded");
        return Err(IngestError::EmptyBatch);
    }
    info!("Total received data size: {} bytes", bytes.len());

    let items = decode_upload(&bytes)?;
    debug!("Decoded {} file(s) from upload", items.len());

    let receipt = app_state.ingestion.ingest(context.identity(), items).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain")
        .body(format!("{} image(s) uploaded", receipt.accepted)))
}

pub async fn update_service(
    update: ImageUpdate,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    let record = app_state.images.update_image(context.identity(), &update).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete_service(
    id: String,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    let removed = app_state.images.delete_image(context.identity(), &id).await?;
    debug!("Delete of {} removed a record: {}", id, removed);
    Ok(HttpResponse::Ok().finish())
}

pub async fn get_service(
    id: String,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    let record = app_state.images.get_image(context.identity(), &id).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn list_service(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    let images = app_state.images.list_images(context.identity()).await?;
    Ok(HttpResponse::Ok().json(crate::metadata::ImageList { images }))
}

pub async fn content_service(
    id: String,
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    let content = app_state.images.read_content(context.identity(), &id).await?;
    Ok(HttpResponse::Ok()
        .content_type(content.media_type.mime())
        .body(content.data))
}

pub async fn amount_service(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    Ok(plain_number(app_state.images.stored_count(context.identity()).await?))
}

pub async fn managed_amount_service(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    Ok(plain_number(app_state.images.managed_count(context.identity()).await?))
}

pub async fn size_service(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, IngestError> {
    let context = header_handler(&req, &app_state)?;
    Ok(plain_number(app_state.images.stored_size(context.identity()).await?))
}
