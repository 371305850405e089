//! Interactive session state: the selected input mode, the input waiting to be run,
//! and the output log the user sees.

use std::path::PathBuf;

use crate::inference::{
    DetectObjects, ImageModel, InferenceAdapter, Outcome, Summarize, TextModel,
};
use crate::models::{InputMode, ModelDescriptor, PendingInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Model ran and returned a result
    Output,
    /// Model ran and failed
    Failure,
    /// Run was rejected before reaching a model
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    kind: EntryKind,
    line: String,
}

impl LogEntry {
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

/// Append-only list of displayed lines
#[derive(Debug, Default, Clone)]
pub struct OutputLog {
    entries: Vec<LogEntry>,
}

impl OutputLog {
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    fn push(&mut self, kind: EntryKind, line: String) {
        self.entries.push(LogEntry { kind, line });
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Owns both adapters and routes validated input to the one matching the current mode
pub struct SessionController<S, D> {
    text_model: TextModel<S>,
    image_model: ImageModel<D>,
    pending: PendingInput,
    log: OutputLog,
}

impl<S: Summarize, D: DetectObjects> SessionController<S, D> {
    pub fn new(text_model: TextModel<S>, image_model: ImageModel<D>) -> Self {
        Self {
            text_model,
            image_model,
            pending: PendingInput::default(),
            log: OutputLog::default(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.pending.mode()
    }

    pub fn pending(&self) -> &PendingInput {
        &self.pending
    }

    pub fn output(&self) -> &OutputLog {
        &self.log
    }

    pub fn text_model(&self) -> &TextModel<S> {
        &self.text_model
    }

    pub fn image_model(&self) -> &ImageModel<D> {
        &self.image_model
    }

    /// Switch input mode. Whatever was typed or chosen before is dropped.
    pub fn select_mode(&mut self, mode: InputMode) {
        log::debug!("Input mode set to {}", mode);
        self.pending = PendingInput::empty(mode);
    }

    /// Replace the text buffer. Ignored outside text mode.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let PendingInput::Text(buffer) = &mut self.pending {
            *buffer = text.into();
        }
    }

    /// Record the chosen image file. Ignored outside image mode.
    pub fn set_image_path(&mut self, path: impl Into<PathBuf>) {
        if let PendingInput::Image(chosen) = &mut self.pending {
            *chosen = Some(path.into());
        }
    }

    pub fn run_text_model(&mut self) {
        self.run(InputMode::Text);
    }

    pub fn run_image_model(&mut self) {
        self.run(InputMode::Image);
    }

    pub fn run_current_mode(&mut self) {
        self.run(self.mode());
    }

    /// Run the adapter for `action`. Appends exactly one entry to the log.
    pub fn run(&mut self, action: InputMode) {
        if action != self.mode() {
            self.warn(format!("Please select '{}' input type first.", action));
            return;
        }

        match &self.pending {
            PendingInput::Text(text) => {
                if text.chars().all(char::is_whitespace) {
                    self.warn("Please enter valid text.".to_string());
                    return;
                }
                let outcome = self.text_model.run(text);
                self.record(action, outcome);
            }
            PendingInput::Image(None) => {
                self.warn("Please select an image file first.".to_string());
            }
            PendingInput::Image(Some(path)) => {
                let outcome = self.image_model.run(path);
                self.record(action, outcome);
            }
        }
    }

    pub fn clear_output(&mut self) {
        self.log.clear();
    }

    /// Info block for the chosen modality
    pub fn load_model_info(&self, choice: InputMode) -> String {
        let descriptor: &ModelDescriptor = match choice {
            InputMode::Text => self.text_model.descriptor(),
            InputMode::Image => self.image_model.descriptor(),
        };
        descriptor.info_text()
    }

    fn warn(&mut self, reason: String) {
        log::debug!("Run rejected: {}", reason);
        self.log.push(EntryKind::Warning, format!("⚠ {}", reason));
    }

    fn record<T: serde::Serialize>(&mut self, mode: InputMode, outcome: Outcome<T>) {
        let kind = if outcome.is_success() {
            EntryKind::Output
        } else {
            EntryKind::Failure
        };
        self.log
            .push(kind, format!("✓ {} Model Output: {}", mode, outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Detection, Summary};
    use std::cell::Cell;
    use std::path::Path;

    #[derive(Default)]
    struct Counting {
        calls: Cell<usize>,
    }

    impl Summarize for Counting {
        fn summarize(&self, text: &str) -> anyhow::Result<Vec<Summary>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![Summary {
                summary_text: format!("{} words", text.split_whitespace().count()),
            }])
        }
    }

    impl DetectObjects for Counting {
        fn detect_objects(&self, _image_path: &Path) -> anyhow::Result<Vec<Detection>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
    }

    fn controller() -> SessionController<Counting, Counting> {
        SessionController::new(
            TextModel::new(Counting::default()),
            ImageModel::new(Counting::default()),
        )
    }

    fn calls(c: &SessionController<Counting, Counting>) -> (usize, usize) {
        (
            c.text_model().backend().calls.get(),
            c.image_model().backend().calls.get(),
        )
    }

    #[test]
    fn starts_in_text_mode_with_empty_log() {
        let c = controller();
        assert_eq!(c.mode(), InputMode::Text);
        assert!(c.output().is_empty());
    }

    #[test]
    fn text_run_appends_one_output_line() {
        let mut c = controller();
        c.set_text("The quick brown fox jumps over the lazy dog");
        c.run_text_model();

        assert_eq!(calls(&c), (1, 0));
        assert_eq!(c.output().len(), 1);
        let entry = c.output().last().unwrap();
        assert_eq!(entry.kind(), EntryKind::Output);
        assert_eq!(
            entry.line(),
            r#"✓ Text Model Output: [{"summary_text":"9 words"}]"#
        );
    }

    #[test]
    fn whitespace_text_is_rejected() {
        let mut c = controller();
        for blank in ["", "   ", "\t\n"] {
            c.set_text(blank);
            c.run_text_model();
        }
        assert_eq!(calls(&c), (0, 0));
        assert_eq!(c.output().len(), 3);
        assert!(
            c.output()
                .entries()
                .iter()
                .all(|e| e.line() == "⚠ Please enter valid text.")
        );
    }

    #[test]
    fn mismatched_action_is_rejected() {
        let mut c = controller();
        c.set_text("something to summarize");
        c.run_image_model();

        assert_eq!(calls(&c), (0, 0));
        let entry = c.output().last().unwrap();
        assert_eq!(entry.kind(), EntryKind::Warning);
        assert_eq!(entry.line(), "⚠ Please select 'Image' input type first.");
    }

    #[test]
    fn switching_mode_discards_pending_input() {
        let mut c = controller();
        c.set_text("keep me");
        c.select_mode(InputMode::Image);
        assert_eq!(c.pending(), &PendingInput::Image(None));

        c.select_mode(InputMode::Text);
        assert_eq!(c.pending(), &PendingInput::Text(String::new()));
        c.run_current_mode();
        assert_eq!(c.output().last().unwrap().line(), "⚠ Please enter valid text.");
    }

    #[test]
    fn input_for_other_mode_is_ignored() {
        let mut c = controller();
        c.set_image_path("cat.png");
        assert_eq!(c.pending(), &PendingInput::Text(String::new()));

        c.select_mode(InputMode::Image);
        c.set_text("ignored");
        assert_eq!(c.pending(), &PendingInput::Image(None));
    }

    #[test]
    fn image_run_requires_a_file() {
        let mut c = controller();
        c.select_mode(InputMode::Image);
        c.run_image_model();
        assert_eq!(calls(&c), (0, 0));
        assert_eq!(
            c.output().last().unwrap().line(),
            "⚠ Please select an image file first."
        );

        c.set_image_path("cat.png");
        c.run_current_mode();
        assert_eq!(calls(&c), (0, 1));
        assert_eq!(c.output().last().unwrap().line(), "✓ Image Model Output: []");
    }

    #[test]
    fn clear_output_is_idempotent() {
        let mut c = controller();
        c.clear_output();
        assert!(c.output().is_empty());

        c.run_text_model();
        c.clear_output();
        c.clear_output();
        assert!(c.output().is_empty());
    }

    #[test]
    fn model_info_matches_choice() {
        let c = controller();
        let info = c.load_model_info(InputMode::Image);
        assert!(info.starts_with("Selected Model Info:\n"));
        assert!(info.contains("• Model Name: DETR Object Detector"));
        assert!(info.contains("• Category: Image (Computer Vision - Object Detection)"));
    }
}
