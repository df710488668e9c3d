use actix_web::web;

pub mod health;
pub mod sessions;

/// Configure application routes; shared by `main.rs` and the route tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.configure(health::configure_routes);

    // Session routes: /api/sessions/**
    cfg.service(web::scope("/api/sessions").configure(sessions::configure_routes));

    // Device resumption: /api/resume
    cfg.service(web::scope("/api/resume").configure(sessions::configure_resume));
}
