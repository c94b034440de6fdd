use actix_web::web;

pub mod health;
pub mod realtime;

/// Register every route. Used by `main.rs` and by tests building an app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.configure(health::configure_routes);

    // Realtime routes: /ws
    cfg.configure(realtime::configure_routes);
}
