//! HTTP surface
//!
//! - `GET|HEAD /api/url/{code}`: 302 redirect
//! - `POST /api/url/create`: register a short code
//! - `GET /health`: store and cache status

pub mod helpers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

use actix_web::web;

pub use state::AppState;

use services::{CreateService, HealthService, redirect_routes};

/// Register routes and shared state on an `App`.
pub fn configure(state: AppState) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(state.clone()))
            .app_data(helpers::json_config())
            .service(
                web::scope("/api/url")
                    .route("/create", web::post().to(CreateService::handle_create))
                    .route("/{code}", redirect_routes()),
            )
            .route("/health", web::get().to(HealthService::health_check));
    }
}
