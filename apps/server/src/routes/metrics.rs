use actix_web::{HttpResponse, get, web};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::error::AppError;

/// Every registered gauge in the Prometheus text format
#[get("/metrics")]
pub async fn metrics_route(registry: web::Data<Registry>) -> Result<HttpResponse, AppError> {
    let encoder = TextEncoder::new();
    let body = encoder.encode_to_string(&registry.gather())?;

    Ok(HttpResponse::Ok().content_type(encoder.format_type()).body(body))
}
