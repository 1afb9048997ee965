use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::constants::{ERR_GENERATE_ID, ERR_READ_URL, ERR_SAVE_URL};
use crate::api::error_response;
use crate::errors::QuicklinkError;
use crate::services::LinkService;

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub long_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
}

pub struct ShortenService;

impl ShortenService {
    /// POST /shorten
    ///
    /// 请求体直接按字节解析，不要求 Content-Type。
    pub async fn handle_shorten(
        body: web::Bytes,
        links: web::Data<Arc<LinkService>>,
    ) -> impl Responder {
        let request: ShortenRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                debug!("Rejected shorten request body: {}", e);
                return error_response(StatusCode::BAD_REQUEST, ERR_READ_URL);
            }
        };

        match links.shorten(&request.long_url).await {
            Ok(short_url) => HttpResponse::Ok().json(ShortenResponse { short_url }),
            Err(e) => Self::error_to_response(&e),
        }
    }

    fn error_to_response(err: &QuicklinkError) -> HttpResponse {
        match err {
            QuicklinkError::InvalidInput(_) => error_response(StatusCode::BAD_REQUEST, ERR_READ_URL),
            QuicklinkError::IdGeneration(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, ERR_GENERATE_ID)
            }
            _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, ERR_SAVE_URL),
        }
    }
}

pub fn shorten_routes() -> actix_web::Resource {
    web::resource("/shorten").route(web::post().to(ShortenService::handle_shorten))
}
