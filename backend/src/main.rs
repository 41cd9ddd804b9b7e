mod inference;
mod knowledge;
mod pipeline;
mod ranking;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use inference::config::{ConfigError, PipelineConfig};
use inference::model::Classifier;
use knowledge::KnowledgeBase;
use pipeline::Pipeline;
use routes::configure_routes;
use std::env;
use std::sync::Arc;

#[cfg(feature = "torch")]
fn load_classifier(config: &PipelineConfig) -> Option<Arc<dyn Classifier>> {
    let model_path = config.model_path.as_str();
    match inference::torch::TorchModel::load(model_path, config.apply_softmax) {
        Ok(model) => {
            log::info!("Model loaded successfully from {}", model_path);
            Some(Arc::new(model))
        }
        Err(e) => {
            log::error!("Failed to load model from {}: {}", model_path, e);
            None
        }
    }
}

#[cfg(not(feature = "torch"))]
fn load_classifier(config: &PipelineConfig) -> Option<Arc<dyn Classifier>> {
    log::warn!(
        "Built without the `torch` feature, skipping {}; predictions will report the model as unavailable",
        config.model_path
    );
    None
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config_path =
        env::var("PIPELINE_CONFIG").unwrap_or_else(|_| "config/pipeline.yaml".to_string());
    let mut config = match PipelineConfig::load(&config_path) {
        Ok(config) => config,
        Err(ConfigError::Io { path, source }) => {
            log::warn!(
                "Could not read {} ({}), using built-in defaults",
                path.display(),
                source
            );
            PipelineConfig::default()
        }
        Err(e) => {
            log::error!("Invalid pipeline config {}: {}", config_path, e);
            return Err(std::io::Error::other(format!("Config loading failed: {}", e)));
        }
    };
    if let Ok(model_path) = env::var("MODEL_PATH") {
        config.model_path = model_path;
    }
    log::info!(
        "Age scaler mean={} std={}, resize method {}",
        config.age_scaler.mean,
        config.age_scaler.std,
        config.resize_method
    );

    let classifier = load_classifier(&config);
    let pipeline = Pipeline::new(classifier, KnowledgeBase::clinical(), &config)
        .map_err(|e| std::io::Error::other(format!("Pipeline setup failed: {}", e)))?;
    let pipeline = web::Data::new(pipeline);

    let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(pipeline.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
