use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use smart_crop_core::{self as core, Frame};
use tracing::{info, warn};

use crate::config;
use crate::error::{ServerError, ServerResult};
use crate::recognizer;
use crate::state::AppState;
use smart_crop_core::scale_tracker::commit_if_confirmed;
use crate::translate::{GeminiTranslator, Translator, UnconfiguredTranslator};

#[derive(Deserialize)]
pub struct DimensionsRequest {
    pub w: u32,
    pub h: u32,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub device: &'static str,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "online",
        device: "cpu",
    })
}

pub async fn reload_handler(State(state): State<AppState>) -> impl IntoResponse {
    let profile = config::load_active_profile(&state.config_path);

    let mut engine = state.engine.lock().await;
    engine.reset_for_profile(profile.clone());
    drop(engine);

    let new_translator: std::sync::Arc<dyn Translator> =
        match config::gemini_api_key(&state.config_path, &profile.name) {
            Some(key) => std::sync::Arc::new(GeminiTranslator::new(key)),
            None => std::sync::Arc::new(UnconfiguredTranslator),
        };
    {
        let mut translator = state.translator.write().unwrap_or_else(|e| e.into_inner());
        *translator = new_translator;
    }

    info!(profile = %profile.name, "configuration reloaded");
    "reloaded"
}

/// Reads the frame, resizes it, runs the detector and the core pipeline.
/// Returns the selected boxes (original-frame coordinates), the pending
/// scale value, and the un-resized frame for cropping by `/ocr`.
async fn run_pipeline(
    state: &AppState,
    w: u32,
    h: u32,
) -> ServerResult<(Vec<core::OutputBox>, Option<f64>, RgbImage)> {
    let raw = state.shm.read_frame(w, h).await?;

    let frame = Frame::new(w, h);
    let resized = smart_crop_core::resize::resize_plan(frame);

    let full_image = RgbImage::from_fn(w, h, |x, y| {
        let idx = ((y * w + x) * 4) as usize;
        let b = raw.get(idx).copied().unwrap_or(0);
        let g = raw.get(idx + 1).copied().unwrap_or(0);
        let r = raw.get(idx + 2).copied().unwrap_or(0);
        image::Rgb([r, g, b])
    });
    let resized_image = image::imageops::resize(
        &full_image,
        resized.target_w,
        resized.target_h,
        image::imageops::FilterType::Triangle,
    );

    let mut engine = state.engine.lock().await;
    let orientation = engine.profile.orientation();
    let mode = engine.profile.mode;
    let typical_h = engine.tracker.typical_h();

    let heatmap = state.detector.infer(&resized_image, resized)?;

    let result = core::compute(
        &heatmap,
        resized,
        &resized_image,
        mode,
        orientation,
        typical_h,
        &mut engine.anchor,
    );
    drop(engine);

    Ok((result.boxes, result.pending_scale, full_image))
}

fn total_area(boxes: &[core::OutputBox]) -> u64 {
    boxes.iter().map(|b| b.w as u64 * b.h as u64).sum()
}

/// Bounding rectangle of the whole selection, for overlay placement (§4.11).
fn roi_of(boxes: &[core::OutputBox]) -> core::OutputBox {
    let min_x = boxes.iter().map(|b| b.x).min().unwrap_or(0);
    let min_y = boxes.iter().map(|b| b.y).min().unwrap_or(0);
    let max_x = boxes.iter().map(|b| b.x + b.w).max().unwrap_or(0);
    let max_y = boxes.iter().map(|b| b.y + b.h).max().unwrap_or(0);
    core::OutputBox {
        x: min_x,
        y: min_y,
        w: max_x - min_x,
        h: max_y - min_y,
    }
}

/// `POST /detect`: runs the pipeline without committing a scale-tracker update.
pub async fn detect_handler(
    State(state): State<AppState>,
    Json(req): Json<DimensionsRequest>,
) -> ServerResult<String> {
    let (boxes, _pending, _full) = run_pipeline(&state, req.w, req.h).await?;

    let engine = state.engine.lock().await;
    let typical_h = engine.tracker.typical_h();
    drop(engine);

    Ok(format!("{},{},{}", boxes.len(), total_area(&boxes), typical_h))
}

/// `POST /ocr`: runs the pipeline, recognizes every selected box, and
/// commits the pending scale value only if the recognized text has
/// length >= 5.
pub async fn ocr_handler(
    State(state): State<AppState>,
    Json(req): Json<DimensionsRequest>,
) -> ServerResult<String> {
    let (boxes, pending_scale, full_image) = run_pipeline(&state, req.w, req.h).await?;

    if boxes.is_empty() {
        return Ok(String::new());
    }

    let mut all_lines = Vec::new();
    for b in &boxes {
        let crop = image::imageops::crop_imm(
            &full_image,
            b.x.min(full_image.width().saturating_sub(1)),
            b.y.min(full_image.height().saturating_sub(1)),
            b.w.max(1).min(full_image.width()),
            b.h.max(1).min(full_image.height()),
        )
        .to_image();

        let lines = state
            .recognizer
            .recognize(&crop)
            .await
            .map_err(ServerError::Downstream)?;
        all_lines.extend(
            lines
                .into_iter()
                .map(|l| l.offset(b.x as f64, b.y as f64)),
        );
    }
    let text = recognizer::assemble_rows(all_lines);

    {
        let mut engine = state.engine.lock().await;
        commit_if_confirmed(&mut engine.tracker, pending_scale, text.chars().count());
    }

    state.requests_processed.fetch_add(1, Ordering::Relaxed);

    let roi = roi_of(&boxes);
    Ok(format!("{},{},{},{}|{}", roi.x, roi.y, roi.w, roi.h, text))
}

#[derive(Deserialize)]
pub struct FuriganaRequest {
    pub text: String,
}

pub async fn furigana_handler(
    State(state): State<AppState>,
    Json(req): Json<FuriganaRequest>,
) -> ServerResult<String> {
    state
        .furigana
        .annotate(&req.text)
        .map_err(ServerError::Downstream)
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub profile: String,
    pub model: Option<String>,
}

pub async fn translate_handler(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> ServerResult<String> {
    let translator = {
        let guard = state.translator.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    };

    translator
        .translate(&req.text, &req.profile, req.model.as_deref())
        .await
        .inspect_err(|e| warn!(error = %e, "translation failed"))
        .map_err(ServerError::Downstream)
}
