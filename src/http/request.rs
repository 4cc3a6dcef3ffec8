//! Request handling and transformation.
//!
//! # Responsibilities
//! - Retarget the inbound URI at the selected backend
//! - Rewrite the Host header, strip hop-by-hop headers
//! - Record the client address in X-Forwarded-For
//!
//! # Design Decisions
//! - Method, path, query, end-to-end headers and body pass through unchanged
//! - The body is moved, never buffered
//! - The backend's own path and query act as a prefix for every request

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        uri::{PathAndQuery, Uri},
        Request,
    },
};

use crate::http::response::DispatchError;
use crate::load_balancer::Target;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that only apply to a single connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in &listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// Join two path segments with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Build the URI the backend will see for an inbound request URI.
pub fn rewrite_uri(target: &Target, original: &Uri) -> Result<Uri, DispatchError> {
    let path = join_paths(&target.base_path, original.path());
    let query = match (target.base_query.as_deref(), original.query()) {
        (Some(base), Some(q)) if !base.is_empty() && !q.is_empty() => Some(format!("{}&{}", base, q)),
        (Some(base), _) if !base.is_empty() => Some(base.to_string()),
        (_, Some(q)) if !q.is_empty() => Some(q.to_string()),
        _ => None,
    };

    let path_and_query = match query {
        Some(q) => format!("{}?{}", path, q),
        None => path,
    };
    let path_and_query: PathAndQuery = path_and_query.parse().map_err(|e: axum::http::uri::InvalidUri| {
        DispatchError::InvalidBackend {
            address: target.authority.to_string(),
            reason: e.to_string(),
        }
    })?;

    Uri::builder()
        .scheme(target.scheme.clone())
        .authority(target.authority.clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| DispatchError::InvalidBackend {
            address: target.authority.to_string(),
            reason: e.to_string(),
        })
}

/// Turn the inbound request into the request sent to `target`.
///
/// The outbound request always goes out as HTTP/1.1, whatever version the
/// client spoke.
pub fn forward_request(
    request: Request<Body>,
    target: &Target,
    client_addr: Option<SocketAddr>,
) -> Result<Request<Body>, DispatchError> {
    let (parts, body) = request.into_parts();
    let uri = rewrite_uri(target, &parts.uri)?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);

    if let Ok(host) = HeaderValue::from_str(target.authority.as_str()) {
        headers.insert(header::HOST, host);
    }

    if let Some(addr) = client_addr {
        // Earlier hops may arrive on several header lines; keep all of them.
        let mut chain: Vec<String> = headers
            .get_all(X_FORWARDED_FOR)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        chain.push(addr.ip().to_string());

        if let Ok(value) = HeaderValue::from_str(&chain.join(", ")) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    let mut forwarded = Request::new(body);
    *forwarded.method_mut() = parts.method;
    *forwarded.uri_mut() = uri;
    *forwarded.headers_mut() = headers;
    Ok(forwarded)
}
