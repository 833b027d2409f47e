//! Image upload extractor
//!
//! Accepts either `multipart/form-data` (first file field, or a field named
//! `image`/`file`) or the raw image as the request body.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::error::PredictError;

/// Encoded image bytes taken from a request
#[derive(Debug)]
pub struct ImageUpload(pub Bytes);

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = if is_multipart(&req) {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            first_image_field(&mut multipart).await?
        } else {
            Bytes::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?
        };

        if bytes.is_empty() {
            return Err(PredictError::EmptyInput.into_response());
        }
        Ok(ImageUpload(bytes))
    }
}

async fn first_image_field(multipart: &mut Multipart) -> Result<Bytes, Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let wanted = field.file_name().is_some()
            || matches!(field.name(), Some("image") | Some("file"));
        if wanted {
            return field.bytes().await.map_err(IntoResponse::into_response);
        }
    }
    Err(PredictError::EmptyInput.into_response())
}
