use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use futures::TryStreamExt;
use log::{error, info};
use serde_json::json;
use shared::{ErrorResponse, UserInputs};
use uuid::Uuid;

use crate::pipeline::{Pipeline, PipelineError};

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Decode(_) | PipelineError::InvalidAge(_) => StatusCode::BAD_REQUEST,
            PipelineError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: format!("Prediction failed: {}", self),
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/predict").route(web::post().to(handle_predict)))
        .service(web::resource("/health").route(web::get().to(health)));
}

/// Largest accepted image upload.
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;
const MAX_TEXT_FIELD_BYTES: usize = 1024;

#[derive(Debug, thiserror::Error)]
enum FormError {
    #[error("Malformed multipart form: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Field '{0}' exceeds {1} bytes")]
    TooLarge(String, usize),
    #[error("Field '{0}' is not valid UTF-8")]
    NotUtf8(String),
    #[error("No image file provided")]
    MissingImage,
}

impl ResponseError for FormError {
    fn status_code(&self) -> StatusCode {
        match self {
            FormError::TooLarge(..) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

async fn read_field(field: &mut Field, name: &str, limit: usize) -> Result<Vec<u8>, FormError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if data.len() + chunk.len() > limit {
            return Err(FormError::TooLarge(name.to_string(), limit));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn read_form(mut payload: Multipart) -> Result<(Vec<u8>, UserInputs), FormError> {
    let mut image: Option<Vec<u8>> = None;
    let mut user_inputs = UserInputs::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        let slot = match name.as_str() {
            "image" => {
                image = Some(read_field(&mut field, &name, MAX_IMAGE_BYTES).await?);
                continue;
            }
            "age" => &mut user_inputs.age,
            "sex" => &mut user_inputs.sex,
            "localization" => &mut user_inputs.localization,
            // dropping the field lets the parser skip its body
            _ => continue,
        };
        let data = read_field(&mut field, &name, MAX_TEXT_FIELD_BYTES).await?;
        *slot = String::from_utf8(data).map_err(|_| FormError::NotUtf8(name))?;
    }

    let image = image.ok_or(FormError::MissingImage)?;
    Ok((image, user_inputs))
}

async fn handle_predict(
    pipeline: web::Data<Pipeline>,
    payload: Multipart,
) -> Result<HttpResponse, FormError> {
    let request_id = Uuid::new_v4();
    info!("Received prediction request {}", request_id);

    if !pipeline.model_loaded() {
        error!("Prediction {} rejected: model not loaded", request_id);
        return Ok(PipelineError::ModelUnavailable.error_response());
    }

    let (image, user_inputs) = read_form(payload).await.inspect_err(|e| {
        error!("Prediction {} has an unusable form: {}", request_id, e);
    })?;

    let pipeline = pipeline.into_inner();
    match web::block(move || pipeline.predict(&image, user_inputs)).await {
        Ok(Ok(response)) => {
            info!("Successfully generated prediction response {}", request_id);
            Ok(HttpResponse::Ok().json(response))
        }
        Ok(Err(e)) => {
            error!("Prediction {} failed: {}", request_id, e);
            Ok(e.error_response())
        }
        Err(e) => {
            error!("Prediction {} worker failed: {:?}", request_id, e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Prediction failed: worker unavailable".into(),
            }))
        }
    }
}

async fn health(pipeline: web::Data<Pipeline>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "modelLoaded": pipeline.model_loaded(),
    }))
}
