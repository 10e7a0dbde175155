use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};
use futures::StreamExt;
use tracing::{info, warn};

use crate::clients::proto::image::{
    DeleteImageRequest, GetImageRequest, UploadImageRequest, UploadImageResponse,
};
use crate::clients::ServiceClients;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::rest_api::ApiSettings;

/// Image bytes and declared content type from a multipart body
#[derive(Debug)]
pub struct UploadedImage {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Read the first typed part, enforcing `max_bytes`
pub async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<UploadedImage> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(format!("invalid multipart: {}", e)))?;

        // File parts carry a Content-Type; plain form fields do not
        let Some(content_type) = field.content_type().map(|m| m.essence_str().to_string())
        else {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::BadRequest(format!("invalid multipart: {}", e)))?;
            }
            continue;
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes =
                chunk.map_err(|e| AppError::BadRequest(format!("invalid multipart: {}", e)))?;
            if data.len() + bytes.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(max_bytes));
            }
            data.extend_from_slice(&bytes);
        }

        return Ok(UploadedImage { data, content_type });
    }

    Err(AppError::BadRequest("file part required".to_string()))
}

/// Forward an upload to image-service
pub async fn store_image(
    clients: &ServiceClients,
    upload: UploadedImage,
) -> Result<UploadImageResponse> {
    let size = upload.data.len();
    let resp = clients
        .image_client()
        .upload_image(UploadImageRequest {
            data: upload.data,
            content_type: upload.content_type,
        })
        .await?
        .into_inner();
    info!(name = %resp.name, bytes = size, "Image uploaded");
    Ok(resp)
}

/// Best-effort removal of an image nothing references
pub async fn discard_image(clients: &ServiceClients, name: &str) {
    let request = DeleteImageRequest {
        name: name.to_string(),
    };
    if let Err(status) = clients.image_client().delete_image(request).await {
        warn!(name = %name, error = %status, "Failed to discard image");
    }
}

#[post("/images")]
pub async fn upload_image(
    clients: web::Data<ServiceClients>,
    settings: web::Data<ApiSettings>,
    _user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let upload = read_upload(payload, settings.max_upload_bytes).await?;
    let stored = store_image(&clients, upload).await?;
    Ok(HttpResponse::Created().json(stored))
}

#[get("/images/{name}")]
pub async fn get_image(
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let image = clients
        .image_client()
        .get_image(GetImageRequest {
            name: path.into_inner(),
        })
        .await?
        .into_inner();

    let content_type: mime::Mime = image.content_type.parse().unwrap_or_else(|e| {
        warn!("Unparseable stored content type: {}", e);
        mime::APPLICATION_OCTET_STREAM
    });

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(("Cache-Control", "public, max-age=86400, immutable"))
        .body(image.data))
}

#[delete("/images/{name}")]
pub async fn delete_image(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let name = path.into_inner();
    clients
        .image_client()
        .delete_image(DeleteImageRequest { name: name.clone() })
        .await?;
    info!(user_id = %user.0, name = %name, "Image deleted");
    Ok(HttpResponse::NoContent().finish())
}
