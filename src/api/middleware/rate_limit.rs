use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, trace, warn};

use crate::api::constants::{ERR_RATE_LIMIT_CHECK, ERR_RATE_LIMITED};
use crate::api::error_response;
use crate::rate_limit::{Admission, RateLimiter};
use crate::utils::ClientIpPolicy;

/// 按客户端 IP 限流，作用于所有路由
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
    ip_policy: Arc<ClientIpPolicy>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>, ip_policy: Arc<ClientIpPolicy>) -> Self {
        Self { limiter, ip_policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            ip_policy: self.ip_policy.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<RateLimiter>,
    ip_policy: Arc<ClientIpPolicy>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limiter = self.limiter.clone();
        let client = self
            .ip_policy
            .client_ip(req.connection_info().peer_addr(), req.headers());

        Box::pin(async move {
            match limiter.check(&client).await {
                Ok(Admission::Allowed { count }) => {
                    trace!("{} {} from {} ({})", req.method(), req.path(), client, count);
                    let res = srv.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Ok(Admission::Rejected { count }) => {
                    warn!("Rate limit exceeded for {} ({} requests)", client, count);
                    Ok(req.into_response(
                        error_response(StatusCode::TOO_MANY_REQUESTS, ERR_RATE_LIMITED)
                            .map_into_right_body(),
                    ))
                }
                Err(e) => {
                    error!("Rate limit check failed for {}: {}", client, e);
                    Ok(req.into_response(
                        error_response(StatusCode::INTERNAL_SERVER_ERROR, ERR_RATE_LIMIT_CHECK)
                            .map_into_right_body(),
                    ))
                }
            }
        })
    }
}
