use actix_web::web;

use crate::handlers::{check_redirect_handler, create_handler, redirect_handler, stats_handler};

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/add", web::post().to(create_handler))
        .route("/checkRedirect", web::post().to(check_redirect_handler))
        .route("/stats", web::get().to(stats_handler))
        // Catch-all, must stay last
        .route("/{key}", web::get().to(redirect_handler));
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, sync::Arc, time::Instant};

    use actix_web::{
        dev::ServiceResponse,
        http::{header::LOCATION, StatusCode},
        test, App,
    };
    use chrono::Duration;

    use super::*;
    use crate::{
        db::Database,
        routes,
        services::{self, AnalyticsTracker, RateLimiter},
        types::AppState,
    };

    const BASE_URL: &str = "https://anoni.sh/";
    const ADMIN_KEY: &str = "s3cret";

    async fn test_config(max_rate: u32) -> impl FnOnce(&mut web::ServiceConfig) {
        let db = Database::in_memory().await.unwrap();
        let rate_limiter = Arc::new(RateLimiter::new(max_rate));
        let analytics = Arc::new(AnalyticsTracker::new(Duration::hours(24)));
        let state = web::Data::new(AppState {
            start_time: Instant::now(),
            db: db.clone(),
            version: "test".to_string(),
            analytics: analytics.clone(),
            admin_key: ADMIN_KEY.to_string(),
            site_title: "Anoni.sh URL Shortener".to_string(),
            site_header: "anoni.sh".to_string(),
            base_url: BASE_URL.to_string(),
            behind_proxy: false,
        });

        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(state);
            services::register(db, rate_limiter, analytics, BASE_URL, cfg);
            routes::configure_routes(cfg);
        }
    }

    fn add(key: &str, to: &str) -> test::TestRequest {
        let peer: SocketAddr = "203.0.113.7:40000".parse().unwrap();
        test::TestRequest::post()
            .uri("/add")
            .peer_addr(peer)
            .set_form([("key", key), ("to", to)])
    }

    fn location<B>(resp: &ServiceResponse<B>) -> &str {
        resp.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    #[actix_web::test]
    async fn test_add_then_follow() {
        let app = test::init_service(App::new().configure(test_config(10).await)).await;

        let resp = test::call_service(&app, add("docs", "docs.rs").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "https://anoni.sh/docs");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/docs").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "http://docs.rs");
    }

    #[actix_web::test]
    async fn test_returned_short_url_follows_for_escaped_keys() {
        let app = test::init_service(App::new().configure(test_config(10).await)).await;

        for key in ["my key", "a+b", "100%", "x&y", "\u{FFFD}"] {
            let resp = test::call_service(&app, add(key, "example.com").to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{}", key);
            let body = test::read_body(resp).await;
            let short = std::str::from_utf8(&body).unwrap();
            let path = short.strip_prefix(BASE_URL).unwrap();

            let resp = test::call_service(
                &app,
                test::TestRequest::get().uri(&format!("/{}", path)).to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", key);
            assert_eq!(location(&resp), "http://example.com", "{}", key);
        }
    }

    #[actix_web::test]
    async fn test_invalid_bytes_are_dropped_from_form_fields() {
        let app = test::init_service(App::new().configure(test_config(10).await)).await;

        let req = test::TestRequest::post()
            .uri("/add")
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload("key=do%FFcs&to=docs.rs")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(test::read_body(resp).await, "https://anoni.sh/docs");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/do%FEcs").to_request()).await;
        assert_eq!(location(&resp), "http://docs.rs");
    }

    #[actix_web::test]
    async fn test_unknown_key_redirects_home() {
        let app = test::init_service(App::new().configure(test_config(10).await)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), BASE_URL);
    }

    #[actix_web::test]
    async fn test_creation_errors_are_plain_text() {
        let app = test::init_service(App::new().configure(test_config(1).await)).await;

        let resp = test::call_service(&app, add("", "docs.rs").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(test::read_body(resp).await, "Missing parameters");

        let resp = test::call_service(&app, add("bad", "not a url").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(test::read_body(resp).await, "Not a valid URL.");

        test::call_service(&app, add("docs", "docs.rs").to_request()).await;
        let resp = test::call_service(&app, add("docs", "other.example").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(test::read_body(resp).await, "Key already taken.");

        let resp = test::call_service(&app, add("more", "docs.rs").to_request()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(test::read_body(resp).await, "Hit limit of 1 shortens per hour.");
    }

    #[actix_web::test]
    async fn test_check_redirect() {
        let app = test::init_service(App::new().configure(test_config(10).await)).await;
        test::call_service(&app, add("docs", "https://docs.rs").to_request()).await;

        let check = |url: &str| {
            test::TestRequest::post()
                .uri("/checkRedirect")
                .set_form([("url", url)])
                .to_request()
        };

        let resp = test::call_service(&app, check("https://anoni.sh/docs")).await;
        assert_eq!(test::read_body(resp).await, "https://docs.rs");

        let resp = test::call_service(&app, check("https://anoni.sh/missing")).await;
        assert_eq!(test::read_body(resp).await, "Invalid redirect key");
    }

    #[actix_web::test]
    async fn test_stats_requires_admin_key() {
        let app = test::init_service(App::new().configure(test_config(10).await)).await;
        test::call_service(&app, add("docs", "https://docs.rs").to_request()).await;
        test::call_service(&app, test::TestRequest::get().uri("/docs").to_request()).await;
        // Checking a link is not a redirect
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/checkRedirect")
                .set_form([("url", "docs")])
                .to_request(),
        )
        .await;

        for uri in ["/stats", "/stats?key=", "/stats?key=wrong"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&resp), BASE_URL);
        }

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/stats?key=s3cret").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            test::read_body(resp).await,
            "Creations today: 1\nRedirects today: 1\n"
        );
    }

    #[actix_web::test]
    async fn test_index_and_health() {
        let app = test::init_service(App::new().configure(test_config(10).await)).await;

        let site: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(site["base_url"], BASE_URL);
        assert_eq!(site["header"], "anoni.sh");

        let health: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(health["status"], "OK");
        assert_eq!(health["db_health"]["status"], "healthy");
    }
}
