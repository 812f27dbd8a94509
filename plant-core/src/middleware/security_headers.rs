use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Path prefix under which uploaded plant images are served.
pub const UPLOADS_PREFIX: &str = "/uploads";

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_upload_route = req.uri().path().starts_with(UPLOADS_PREFIX);

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    // Stored images never change once written; API responses are per-user
    if is_upload_route {
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("private, max-age=86400, immutable"),
        );
    } else {
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        );
    }

    response
}
