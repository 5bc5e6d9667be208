//! Admission middleware
//!
//! Runs the admission chain for every request on a wrapped route:
//! header rules, then the access-token cookie, then the rate limit. On
//! success the authenticated identity is injected into the request
//! extensions; on rejection the request never reaches the handler.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    web, Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::{
    collections::HashMap,
    future::{ready, Ready},
    net::IpAddr,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use ts_core::errors::DomainError;
use ts_core::services::admission::{RequestContext, RoutePolicy};
use ts_core::services::rate_limit::RateLimitDecision;

use crate::app::AppState;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Admission middleware factory, one per route policy
pub struct Admission {
    policy: Arc<RoutePolicy>,
}

impl Admission {
    pub fn new(policy: RoutePolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Admission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdmissionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdmissionMiddleware {
            service: Rc::new(service),
            policy: Arc::clone(&self.policy),
        }))
    }
}

/// Admission middleware service
pub struct AdmissionMiddleware<S> {
    service: Rc<S>,
    policy: Arc<RoutePolicy>,
}

impl<S, B> Service<ServiceRequest> for AdmissionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = Arc::clone(&self.policy);

        Box::pin(async move {
            let state = match req.app_data::<web::Data<AppState>>().cloned() {
                Some(state) => state,
                None => {
                    let response = handle_domain_error(&DomainError::internal(
                        "admission chain is not configured",
                    ));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let ctx = request_context(&req, &state.trusted_proxies, policy);
            let admitted = match state.admission.run(ctx).await {
                Ok(admitted) => admitted,
                Err(e) => {
                    let response = handle_domain_error(&e);
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            if let Some(identity) = admitted.identity {
                req.extensions_mut().insert(AuthContext::from(identity));
            }

            let mut res = service.call(req).await?;
            if let Some(RateLimitDecision::Allowed { remaining, limit }) = admitted.rate_limit {
                let headers = res.headers_mut();
                headers.insert(
                    HeaderName::from_static(X_RATELIMIT_LIMIT),
                    HeaderValue::from(limit),
                );
                headers.insert(
                    HeaderName::from_static(X_RATELIMIT_REMAINING),
                    HeaderValue::from(remaining),
                );
            }
            Ok(res.map_into_left_body())
        })
    }
}

/// Snapshot the transport-level inputs the chain needs
fn request_context(
    req: &ServiceRequest,
    trusted_proxies: &[IpAddr],
    policy: Arc<RoutePolicy>,
) -> RequestContext {
    let mut ctx = RequestContext::new(client_address(req, trusted_proxies), policy);

    let mut headers: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in req.headers().iter() {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    ctx.headers = headers;

    if let Ok(cookies) = req.cookies() {
        for cookie in cookies.iter() {
            ctx.cookies
                .insert(cookie.name().to_string(), cookie.value().to_string());
        }
    }

    ctx
}

/// Client address used for throttling.
///
/// Forwarding headers are only believed when the peer is a trusted proxy.
/// `X-Forwarded-For` is walked from the right, skipping trusted hops, so the
/// result is the first address no trusted proxy vouches past. Anything a
/// client writes to the left of that is ignored.
fn client_address(req: &ServiceRequest, trusted_proxies: &[IpAddr]) -> String {
    let peer = match req.peer_addr() {
        Some(addr) => addr.ip(),
        None => return String::from("unknown"),
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(forwarded) = header("x-forwarded-for") {
        for hop in forwarded.rsplit(',').map(str::trim) {
            match hop.parse::<IpAddr>() {
                Ok(ip) if trusted_proxies.contains(&ip) => continue,
                Ok(ip) => return ip.to_string(),
                Err(_) => break,
            }
        }
    }

    header("x-real-ip")
        .and_then(|value| value.parse::<IpAddr>().ok())
        .unwrap_or(peer)
        .to_string()
}
