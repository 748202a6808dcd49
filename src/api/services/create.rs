use actix_web::{HttpRequest, HttpResponse, web};
use tracing::error;

use crate::api::helpers::error_response;
use crate::api::state::AppState;
use crate::api::types::{CreateUrlBody, CreateUrlResponse};
use crate::errors::SnaplinkError;
use crate::services::CreateUrlRequest;

pub struct CreateService;

impl CreateService {
    /// `POST /api/url/create`
    pub async fn handle_create(
        req: HttpRequest,
        body: web::Json<CreateUrlBody>,
        state: web::Data<AppState>,
    ) -> HttpResponse {
        let body = body.into_inner();
        let client = state.proxies.client_ip_of(&req);
        let request = CreateUrlRequest {
            short_code: body.short_code,
            original_url: body.original_url,
        };

        match state.creator.create(&client, request).await {
            Ok(result) => HttpResponse::Ok().json(CreateUrlResponse::from(result.record)),
            Err(e) => {
                if matches!(
                    e,
                    SnaplinkError::OriginUnavailable(_) | SnaplinkError::GenerationExhausted(_)
                ) {
                    error!("Create failed: {}", e);
                }
                error_response(&e)
            }
        }
    }
}
