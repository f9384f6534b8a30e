use std::{net::SocketAddr, time::Duration};

use axum::{
    body::{Body, to_bytes},
    extract::{ConnectInfo, Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};

use crate::{
    adapters::http::{app_error_impl::ErrorDetail, app_state::AppState},
    app_error::AppError,
};

/// Error bodies are tiny; anything larger is left untouched.
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Upper bound on one limiter round trip.
const RATE_LIMIT_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Counts intake submissions per client IP. A limiter that errors or stalls
/// lets the request through.
pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(rate_limiter) = &app_state.rate_limiter else {
        return Ok(next.run(request).await);
    };

    let connect_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    // Only trust forwarded headers if explicitly configured (when behind a reverse proxy)
    let forwarded = if app_state.config.trust_proxy {
        forwarded_ip(&request)
    } else {
        None
    };
    let ip = forwarded
        .or(connect_ip)
        .unwrap_or_else(|| "unknown".to_string());

    tracing::debug!(
        trust_proxy = app_state.config.trust_proxy,
        using_ip = %ip,
        "Rate limiting request"
    );

    match tokio::time::timeout(RATE_LIMIT_CHECK_TIMEOUT, rate_limiter.check(&ip)).await {
        Ok(Ok(())) => {}
        Ok(Err(AppError::RateLimited)) => return Err(AppError::RateLimited),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, ip = %ip, "Rate limiter unavailable, allowing request");
        }
        Err(_) => {
            tracing::warn!(ip = %ip, "Rate limiter timed out, allowing request");
        }
    }

    Ok(next.run(request).await)
}

/// Adds the `details` field to error bodies when the configuration allows it.
pub async fn error_details_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };
    if !app_state.config.expose_error_details() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Could not buffer error body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let Ok(mut json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    if let Some(obj) = json.as_object_mut() {
        obj.insert("details".to_string(), serde_json::Value::String(detail));
    }

    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(json.to_string()))
}

fn forwarded_ip(req: &Request) -> Option<String> {
    // Extract IP from X-Forwarded-For or X-Real-IP headers
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(real) = req.headers().get("x-real-ip")
        && let Ok(val) = real.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    None
}
