pub mod explanations;
pub mod inference;
pub mod models;
pub mod session;

pub use inference::{
    BartSummarizer, DetectObjects, DetrDetector, ImageModel, InferenceAdapter, InferenceConfig,
    ModelLoadError, Outcome, Summarize, TextModel,
};
pub use models::{BoundingBox, Detection, InputMode, ModelDescriptor, PendingInput, Summary};
pub use session::{EntryKind, LogEntry, OutputLog, SessionController};

/// Controller wired to the rten-backed models
pub type DeskController = SessionController<BartSummarizer, DetrDetector>;

/// Load both models eagerly and build a controller around them
pub fn load_controller(config: &InferenceConfig) -> anyhow::Result<DeskController> {
    let summarizer = BartSummarizer::load(&config.text_model_dir)?;
    let detector = DetrDetector::load(&config.image_model_dir, config.detection_threshold)?;
    Ok(SessionController::new(
        TextModel::new(summarizer),
        ImageModel::new(detector),
    ))
}

#[cfg(feature = "gui")]
pub mod gui;
