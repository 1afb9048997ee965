use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::api::constants::ERR_NOT_FOUND;
use crate::api::error_response;
use crate::services::LinkService;
use crate::utils::ClientIpPolicy;

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub long_url: String,
}

pub struct LookupService;

impl LookupService {
    /// GET /{short_id}，返回 JSON 而不是 302
    pub async fn handle_lookup(
        req: HttpRequest,
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
        ip_policy: web::Data<Arc<ClientIpPolicy>>,
    ) -> impl Responder {
        let short_id = path.into_inner();
        let client_ip = ip_policy.client_ip(req.connection_info().peer_addr(), req.headers());

        match links.resolve(&short_id, &client_ip).await {
            Ok(long_url) => HttpResponse::Ok().json(LookupResponse { long_url }),
            Err(e) => {
                trace!("Lookup for {} failed: {}", short_id, e);
                error_response(StatusCode::NOT_FOUND, ERR_NOT_FOUND)
            }
        }
    }
}

pub fn lookup_routes() -> actix_web::Resource {
    web::resource("/{short_id}").route(web::get().to(LookupService::handle_lookup))
}
