use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use smart_crop_core::{AnchorPos, ScaleTracker};
use tokio::sync::Mutex;

use crate::config::ActiveProfile;
use crate::detector::TextnessModel;
use crate::furigana::FuriganaTagger;
use crate::recognizer::OcrRecognizer;
use crate::shm::FrameShm;
use crate::translate::Translator;

/// The process-wide mutable state that must be serialized across concurrent
/// requests: the scale tracker's history, the continuity anchor, and the
/// currently active configuration profile. Guarded by a single mutex.
pub struct EngineState {
    pub tracker: ScaleTracker,
    pub anchor: AnchorPos,
    pub profile: ActiveProfile,
}

impl EngineState {
    pub fn new(profile: ActiveProfile) -> Self {
        Self {
            tracker: ScaleTracker::new(),
            anchor: AnchorPos::default(),
            profile,
        }
    }

    /// Resets the continuity anchor when the active profile's language or
    /// reading mode changes, since a stale anchor from a different title
    /// would bias selection toward the wrong screen region.
    pub fn reset_for_profile(&mut self, profile: ActiveProfile) {
        self.profile = profile;
        self.anchor.reset();
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<EngineState>>,
    pub config_path: PathBuf,
    pub shm: Arc<FrameShm>,
    pub detector: Arc<dyn TextnessModel>,
    pub recognizer: Arc<dyn OcrRecognizer>,
    pub translator: Arc<std::sync::RwLock<Arc<dyn Translator>>>,
    pub furigana: Arc<dyn FuriganaTagger>,
    pub requests_processed: Arc<AtomicUsize>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config_path: PathBuf,
        profile: ActiveProfile,
        shm: FrameShm,
        detector: Arc<dyn TextnessModel>,
        recognizer: Arc<dyn OcrRecognizer>,
        translator: Arc<dyn Translator>,
        furigana: Arc<dyn FuriganaTagger>,
    ) -> Self {
        Self {
            engine: Arc::new(Mutex::new(EngineState::new(profile))),
            config_path,
            shm: Arc::new(shm),
            detector,
            recognizer,
            translator: Arc::new(std::sync::RwLock::new(translator)),
            furigana,
            requests_processed: Arc::new(AtomicUsize::new(0)),
        }
    }
}
