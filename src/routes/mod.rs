use actix_web::{web, HttpResponse, Responder};

use crate::{
    db::DBHealthStatus,
    models::SiteInfo,
    types::{AppState, HealthStatus, Result},
};

mod redirect;

// Handler function for the root route "/"
async fn index(data: web::Data<AppState>) -> impl Responder {
    let site = SiteInfo {
        title: data.site_title.clone(),
        header: data.site_header.clone(),
        base_url: data.base_url.clone(),
    };

    HttpResponse::Ok().json(site)
}

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> Result<impl Responder> {
    // Calculate uptime in seconds
    let uptime = data.start_time.elapsed().as_secs();
    let db_health = data.db.health_check().await?;
    let status = match db_health.status {
        DBHealthStatus::Healthy => "OK",
        DBHealthStatus::Unhealthy => "DEGRADED",
    };

    let status = HealthStatus {
        status: String::from(status),
        version: data.version.clone(),
        db_health: Some(db_health),
        uptime_seconds: uptime,
    };

    Ok(HttpResponse::Ok().json(status))
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));
    redirect::configure_routes(cfg);
}
