use std::net::{IpAddr, SocketAddr};

use actix_web::{
    http::header::{ContentType, LOCATION},
    web, HttpRequest, HttpResponse, Responder,
};
use log::{debug, info, warn};

use crate::{
    errors::CreationError,
    models::{AddRedirectForm, CheckRedirectForm, StatsQuery},
    repositories::RedirectRepository,
    services::{LinkCreator, RedirectResolver},
    types::AppState,
    utils::text::{decode_path_segment, to_valid_text},
};

pub type LinkCreatorType = LinkCreator<RedirectRepository>;
pub type RedirectResolverType = RedirectResolver<RedirectRepository>;

/// Follow a short key
pub async fn redirect_handler(
    req: HttpRequest,
    resolver: web::Data<RedirectResolverType>,
) -> impl Responder {
    let target = resolver.resolve(&path_key(&req)).await;
    see_other(&target)
}

/// Create a redirect from the `key` and `to` form fields
pub async fn create_handler(
    req: HttpRequest,
    body: web::Bytes,
    creator: web::Data<LinkCreatorType>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CreationError> {
    let form = AddRedirectForm::from_body(&body);
    let ip = requester_ip(&req, state.behind_proxy);
    debug!("Creation of '{}' requested by {}", form.key, ip);

    let short_url = creator.create(&form.key, &form.to, &ip).await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(short_url))
}

/// Tell the user where a short URL leads without following it
pub async fn check_redirect_handler(
    body: web::Bytes,
    resolver: web::Data<RedirectResolverType>,
) -> impl Responder {
    let form = CheckRedirectForm::from_body(&body);
    let body = resolver
        .lookup(&form.url)
        .await
        .unwrap_or_else(|| "Invalid redirect key".to_string());

    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body)
}

/// Usage counters, for holders of the admin key only
pub async fn stats_handler(
    query: web::Query<StatsQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    if query.key.is_empty() {
        return see_other(&state.base_url);
    }
    if query.key != state.admin_key {
        warn!("Stats requested with a wrong admin key");
        return see_other(&state.base_url);
    }

    let stats = state.analytics.snapshot();
    info!(
        "Stats served: {} creations, {} redirects",
        stats.creations_last_24h, stats.redirects_last_24h
    );
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(stats.to_string())
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

// The key straight from the request line, so invalid bytes can be dropped
// instead of replaced
fn path_key(req: &HttpRequest) -> String {
    let segment = req.uri().path().trim_start_matches('/');
    to_valid_text(&decode_path_segment(segment))
}

/// Address a creation is charged to, without any port
fn requester_ip(req: &HttpRequest, behind_proxy: bool) -> String {
    let addr = if behind_proxy {
        req.connection_info().realip_remote_addr().map(str::to_string)
    } else {
        req.peer_addr().map(|addr| addr.ip().to_string())
    };

    match addr {
        Some(addr) => strip_port(&addr),
        None => "unknown".to_string(),
    }
}

fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return ip.to_string();
    }
    addr.to_string()
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_path_key_decodes_and_drops_invalid_bytes() {
        let key = |uri: &str| path_key(&TestRequest::with_uri(uri).to_http_request());

        assert_eq!(key("/docs"), "docs");
        assert_eq!(key("/my%20key%26more"), "my key&more");
        assert_eq!(key("/a+b"), "a+b");
        assert_eq!(key("/ab%FFc"), "abc");
        assert_eq!(key("/%EF%BF%BD"), "\u{FFFD}");
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("203.0.113.7:51234"), "203.0.113.7");
        assert_eq!(strip_port("203.0.113.7"), "203.0.113.7");
        assert_eq!(strip_port("[2001:db8::1]:443"), "2001:db8::1");
        assert_eq!(strip_port("2001:db8::1"), "2001:db8::1");
        assert_eq!(strip_port("proxy.local"), "proxy.local");
    }
}
