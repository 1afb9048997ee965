pub mod constants;
pub mod middleware;
pub mod services;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde_json::json;

/// `{"error": "<message>"}` 响应
pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

/// 注册全部路由；限流中间件由调用方在 App 上 wrap
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(services::shorten_routes())
        .service(services::lookup_routes());
}
