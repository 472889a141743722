use actix_easy_multipart::MultipartForm;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use domain_upload::exception::{UploadException, UploadResult};
use domain_upload::model::entity::ChunkPayload;
use tracing::{debug, error, info, warn};

use super::dtos::ChunkUploadRequest;
use super::error::ApiError;
use crate::infrastructure::ServiceProvider;

/// `POST /upload`: writes one chunk at its offset and answers `OK`.
pub async fn upload_chunk(
    sp: web::Data<ServiceProvider>,
    data: MultipartForm<ChunkUploadRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(e) = write_chunk(&sp, data.0).await {
        if e.is_bad_request() {
            warn!("Rejected chunk: {e}");
        } else {
            error!("Failed to write chunk: {e}");
        }
        return Err(e.into());
    }
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body("OK"))
}

async fn write_chunk(sp: &ServiceProvider, data: ChunkUploadRequest) -> UploadResult<()> {
    let (fields, file) = data.into_parts();
    let file = file.ok_or(UploadException::MissingPayload)?;
    // A fresh handle reads the spooled part from its start, the temp file goes away with `file`.
    let reader = file.file.reopen().map_err(|e| UploadException::InternalError {
        source: anyhow::Error::new(e).context("Cannot reopen spooled chunk"),
    })?;
    let payload: ChunkPayload = Box::new(tokio::fs::File::from_std(reader));
    let chunk = fields.into_chunk(payload)?;

    let identifier = chunk.identifier.clone();
    let number = chunk.index + 1;
    let count = chunk.count;
    let is_last = chunk.is_last();
    let range = sp.chunk_writer().write(chunk).await?;
    debug!(
        "Chunk {number}/{count} of {identifier:?} written at {}..{}.",
        range.start, range.end
    );
    if is_last {
        info!("Last chunk of {identifier:?} arrived.");
    }
    Ok(())
}

/// Any method but `POST` on `/upload`.
pub async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    warn!("{} {} isn't allowed.", req.method(), req.path());
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .body("Method Not Allowed")
}
