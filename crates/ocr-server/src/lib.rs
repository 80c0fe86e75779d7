pub mod config;
pub mod detector;
pub mod error;
pub mod furigana;
pub mod handlers;
pub mod logging;
pub mod recognizer;
pub mod shm;
pub mod state;
pub mod translate;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::{get, post}};

use config::ActiveProfile;
use detector::{OrtTextnessModel, TextnessModel};
use furigana::{FuriganaTagger, LinderaTagger};
use recognizer::{LensRecognizer, OcrRecognizer};
use shm::FrameShm;
use state::AppState;
use translate::{Translator, UnconfiguredTranslator};

const SHM_OS_ID: &str = "kotrans-crop-frame";

/// Builds the running service: loads configuration, opens the shared
/// memory transport, loads the textness network, and initializes the
/// recognizer/translator/furigana collaborators.
pub fn create_router(config_path: PathBuf, craft_model_bytes: &[u8]) -> anyhow::Result<Router> {
    let profile = config::load_active_profile(&config_path);

    let shm = FrameShm::open_or_create(SHM_OS_ID)?;

    let detector: Arc<dyn TextnessModel> = Arc::new(OrtTextnessModel::load(craft_model_bytes)?);
    let recognizer: Arc<dyn OcrRecognizer> = Arc::new(LensRecognizer::new());

    let translator: Arc<dyn Translator> =
        match config::gemini_api_key(&config_path, &profile.name) {
            Some(key) => Arc::new(translate::GeminiTranslator::new(key)),
            None => Arc::new(UnconfiguredTranslator),
        };

    let furigana: Arc<dyn FuriganaTagger> = Arc::new(LinderaTagger::load()?);

    let state = AppState::new(
        config_path,
        profile,
        shm,
        detector,
        recognizer,
        translator,
        furigana,
    );

    Ok(Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/reload", get(handlers::reload_handler))
        .route("/detect", post(handlers::detect_handler))
        .route("/ocr", post(handlers::ocr_handler))
        .route("/furigana", post(handlers::furigana_handler))
        .route("/translate", post(handlers::translate_handler))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .with_state(state))
}
