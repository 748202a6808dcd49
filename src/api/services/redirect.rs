use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error};

use crate::api::helpers::{error_response, not_found_response};
use crate::api::state::AppState;
use crate::errors::SnaplinkError;

pub struct RedirectService;

impl RedirectService {
    /// `GET|HEAD /api/url/{code}`: 302 to the stored URL. The redirect is
    /// never followed server-side.
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        state: web::Data<AppState>,
    ) -> HttpResponse {
        let code = path.into_inner();
        let client = state.proxies.client_ip_of(&req);

        match state.resolver.resolve(&client, &code).await {
            Ok(location) => HttpResponse::build(StatusCode::FOUND)
                .insert_header((header::LOCATION, location.as_ref()))
                .insert_header((header::CACHE_CONTROL, "no-cache"))
                .finish(),
            Err(SnaplinkError::NotFound(_)) => {
                debug!("Short code not found: {}", code);
                not_found_response()
            }
            Err(e) => {
                if matches!(e, SnaplinkError::OriginUnavailable(_)) {
                    error!("Redirect lookup for {} failed: {}", code, e);
                }
                error_response(&e)
            }
        }
    }
}

pub fn redirect_routes() -> actix_web::Route {
    web::route()
        .guard(actix_web::guard::Any(actix_web::guard::Get()).or(actix_web::guard::Head()))
        .to(RedirectService::handle_redirect)
}
