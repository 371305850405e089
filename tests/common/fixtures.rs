use std::cell::RefCell;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb};
use pipeline_desk::{
    BoundingBox, Detection, DetectObjects, ImageModel, SessionController, Summarize, Summary,
    TextModel,
};
use tempfile::NamedTempFile;

/// Creates a 100x100 red test image and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Summarizer that records its inputs and returns the first sentence
#[derive(Default)]
pub struct ScriptedSummarizer {
    pub inputs: RefCell<Vec<String>>,
    pub fail_with: Option<&'static str>,
}

impl Summarize for ScriptedSummarizer {
    fn summarize(&self, text: &str) -> anyhow::Result<Vec<Summary>> {
        self.inputs.borrow_mut().push(text.to_string());
        if let Some(reason) = self.fail_with {
            anyhow::bail!(reason);
        }
        let first = text.split('.').next().unwrap_or_default().trim();
        Ok(vec![Summary {
            summary_text: format!("{}.", first),
        }])
    }
}

/// Detector that records its inputs and checks that the file decodes
#[derive(Default)]
pub struct ScriptedDetector {
    pub inputs: RefCell<Vec<PathBuf>>,
}

impl DetectObjects for ScriptedDetector {
    fn detect_objects(&self, image_path: &Path) -> anyhow::Result<Vec<Detection>> {
        self.inputs.borrow_mut().push(image_path.to_path_buf());
        let img = image::open(image_path)?;
        Ok(vec![Detection {
            score: 0.98,
            label: "stop sign".to_string(),
            bbox: BoundingBox {
                xmin: 0,
                ymin: 0,
                xmax: img.width() - 1,
                ymax: img.height() - 1,
            },
        }])
    }
}

pub type TestController = SessionController<ScriptedSummarizer, ScriptedDetector>;

pub fn make_controller() -> TestController {
    SessionController::new(
        TextModel::new(ScriptedSummarizer::default()),
        ImageModel::new(ScriptedDetector::default()),
    )
}

pub fn make_failing_controller(reason: &'static str) -> TestController {
    SessionController::new(
        TextModel::new(ScriptedSummarizer {
            fail_with: Some(reason),
            ..Default::default()
        }),
        ImageModel::new(ScriptedDetector::default()),
    )
}

pub fn text_calls(controller: &TestController) -> usize {
    controller.text_model().backend().inputs.borrow().len()
}

pub fn image_calls(controller: &TestController) -> usize {
    controller.image_model().backend().inputs.borrow().len()
}
