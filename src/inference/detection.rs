use std::path::Path;

use anyhow::{Context, anyhow};
use image::{DynamicImage, ImageReader, imageops::FilterType};
use rten::{Model, NodeId};
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;

use crate::inference::DetectObjects;
use crate::inference::config::{DetrConfig, read_json, require_files};
use crate::models::{BoundingBox, Detection};

const SHORTEST_EDGE: u32 = 800;
const LONGEST_EDGE: u32 = 1333;
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// DETR object detector running on rten
pub struct DetrDetector {
    model: Model,
    config: DetrConfig,
    threshold: f32,
    pixel_values: NodeId,
    pixel_mask: Option<NodeId>,
    logits: NodeId,
    pred_boxes: NodeId,
}

impl DetrDetector {
    /// Load `model.rten` and `config.json` from `model_dir`
    pub fn load(model_dir: &Path, threshold: f32) -> anyhow::Result<Self> {
        let [model_path, config_path] = require_files(model_dir, ["model.rten", "config.json"])?;

        log::info!("Loading detection model from {}", model_path.display());
        let model = Model::load_file(&model_path)
            .with_context(|| format!("failed to load {}", model_path.display()))?;
        let config: DetrConfig = read_json(&config_path)?;

        let node = |name: &str| {
            model
                .find_node(name)
                .ok_or_else(|| anyhow!("detection model has no '{}' node", name))
        };
        let pixel_values = node("pixel_values")?;
        let logits = node("logits")?;
        let pred_boxes = node("pred_boxes")?;
        let pixel_mask = model.find_node("pixel_mask");

        log::debug!(
            "Detection model ready ({} labels, pixel_mask: {})",
            config.id2label.len(),
            pixel_mask.is_some()
        );

        Ok(Self {
            model,
            config,
            threshold,
            pixel_values,
            pixel_mask,
            logits,
            pred_boxes,
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl DetectObjects for DetrDetector {
    fn detect_objects(&self, image_path: &Path) -> anyhow::Result<Vec<Detection>> {
        let img = ImageReader::open(image_path)
            .with_context(|| format!("cannot open {}", image_path.display()))?
            .with_guessed_format()?
            .decode()
            .map_err(|e| anyhow!("Failed to decode image: {}", e))?;
        let original_size = (img.width(), img.height());

        let pixels = preprocess(&img);
        let [_, _, height, width] = pixels.shape();
        log::info!(
            "Running object detection on {}x{} image (resized to {}x{})",
            original_size.0,
            original_size.1,
            width,
            height
        );

        let mask = NdTensor::from_data([1, height, width], vec![1i32; height * width]);
        let mut inputs = vec![(self.pixel_values, pixels.view().into())];
        if let Some(mask_id) = self.pixel_mask {
            inputs.push((mask_id, mask.view().into()));
        }

        let [logits, boxes] = self
            .model
            .run_n(inputs, [self.logits, self.pred_boxes], None)
            .context("detection model failed")?;
        let logits: NdTensor<f32, 3> = logits
            .try_into()
            .map_err(|e| anyhow!("unexpected logits output: {:?}", e))?;
        let boxes: NdTensor<f32, 3> = boxes
            .try_into()
            .map_err(|e| anyhow!("unexpected pred_boxes output: {:?}", e))?;

        let [_, _, num_classes] = logits.shape();
        let detections = postprocess(
            &logits.to_vec(),
            num_classes,
            &boxes.to_vec(),
            original_size,
            self.threshold,
            &self.config,
        );
        log::info!("Detected {} objects", detections.len());

        Ok(detections)
    }
}

/// Output size after resizing the shortest edge to 800 while capping the longest at 1333
pub fn target_size(width: u32, height: u32) -> (u32, u32) {
    let (short, long) = (width.min(height) as f32, width.max(height) as f32);
    let mut size = SHORTEST_EDGE as f32;
    if long / short * size > LONGEST_EDGE as f32 {
        size = (LONGEST_EDGE as f32 * short / long).round();
    }

    if width <= height {
        let scaled = (size * height as f32 / width as f32) as u32;
        (size as u32, scaled)
    } else {
        let scaled = (size * width as f32 / height as f32) as u32;
        (scaled, size as u32)
    }
}

/// Resize, rescale and normalize into a `[1, 3, H, W]` tensor
fn preprocess(img: &DynamicImage) -> NdTensor<f32, 4> {
    let rgb = img.to_rgb8();
    let (width, height) = target_size(rgb.width(), rgb.height());
    let resized = image::imageops::resize(&rgb, width, height, FilterType::Triangle);

    let plane = (width * height) as usize;
    let mut data = vec![0f32; 3 * plane];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let offset = (y * width + x) as usize;
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            data[c * plane + offset] = (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }

    NdTensor::from_data([1, 3, height as usize, width as usize], data)
}

/// Turn raw DETR outputs into detections above `threshold`.
///
/// `logits` is `[queries, num_classes]` where the last class means "no object";
/// `boxes` is `[queries, 4]` holding normalized `(cx, cy, w, h)`.
pub fn postprocess(
    logits: &[f32],
    num_classes: usize,
    boxes: &[f32],
    (width, height): (u32, u32),
    threshold: f32,
    config: &DetrConfig,
) -> Vec<Detection> {
    if num_classes < 2 {
        return Vec::new();
    }

    let mut detections: Vec<Detection> = logits
        .chunks_exact(num_classes)
        .zip(boxes.chunks_exact(4))
        .filter_map(|(query_logits, query_box)| {
            let probs = softmax(query_logits);
            let (class_id, score) = probs[..num_classes - 1]
                .iter()
                .copied()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1))?;
            if score <= threshold {
                return None;
            }

            let (cx, cy, w, h) = (query_box[0], query_box[1], query_box[2], query_box[3]);
            let to_px = |v: f32, scale: u32| (v * scale as f32).max(0.0) as u32;
            Some(Detection {
                score,
                label: config.label(class_id),
                bbox: BoundingBox {
                    xmin: to_px(cx - w / 2.0, width),
                    ymin: to_px(cy - h / 2.0, height),
                    xmax: to_px(cx + w / 2.0, width),
                    ymax: to_px(cy + h / 2.0, height),
                },
            })
        })
        .collect();

    detections.sort_by(|a, b| b.score.total_cmp(&a.score));
    detections
}

fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DetrConfig {
        serde_json::from_str(r#"{"id2label": {"0": "N/A", "1": "person", "2": "cat"}}"#).unwrap()
    }

    #[test]
    fn target_size_scales_shortest_edge() {
        assert_eq!(target_size(100, 100), (800, 800));
        assert_eq!(target_size(640, 480), (1066, 800));
        assert_eq!(target_size(480, 640), (800, 1066));
    }

    #[test]
    fn target_size_caps_longest_edge() {
        // 3:1 panorama would be 2400 wide at 800 high
        let (w, h) = target_size(3000, 1000);
        assert!(w <= LONGEST_EDGE);
        assert_eq!(h, 444);
    }

    #[test]
    fn preprocess_is_channel_first_and_normalized() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            16,
            16,
            image::Rgb([255, 255, 255]),
        ));
        let tensor = preprocess(&img);
        assert_eq!(tensor.shape(), [1, 3, 800, 800]);
        let expected = (1.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 0.02);
        let expected_blue = (1.0 - IMAGENET_MEAN[2]) / IMAGENET_STD[2];
        assert!((tensor[[0, 2, 799, 799]] - expected_blue).abs() < 0.02);
    }

    #[test]
    fn keeps_confident_queries_and_drops_no_object() {
        // 3 labels + "no object"
        let logits = [
            0.0, 9.0, 0.0, 0.0, // person, confident
            0.0, 0.0, 0.0, 9.0, // no object
            0.0, 1.0, 1.1, 0.9, // cat, but weak
        ];
        let boxes = [
            0.5, 0.5, 0.5, 0.5, //
            0.1, 0.1, 0.1, 0.1, //
            0.2, 0.2, 0.2, 0.2,
        ];
        let detections = postprocess(&logits, 4, &boxes, (200, 100), 0.5, &config());
        assert_eq!(detections.len(), 1);
        let person = &detections[0];
        assert_eq!(person.label, "person");
        assert!(person.score > 0.99);
        assert_eq!(
            person.bbox,
            BoundingBox { xmin: 50, ymin: 25, xmax: 150, ymax: 75 }
        );
    }

    #[test]
    fn boxes_are_clamped_at_origin() {
        let logits = [0.0, 0.0, 9.0, 0.0];
        let boxes = [0.0, 0.0, 0.4, 0.4];
        let detections = postprocess(&logits, 4, &boxes, (100, 100), 0.5, &config());
        assert_eq!(detections[0].label, "cat");
        assert_eq!(detections[0].bbox.xmin, 0);
        assert_eq!(detections[0].bbox.xmax, 20);
    }

    #[test]
    fn results_sorted_by_score() {
        let logits = [
            0.0, 3.0, 0.0, 0.0, //
            0.0, 0.0, 8.0, 0.0,
        ];
        let boxes = [0.5; 8];
        let detections = postprocess(&logits, 4, &boxes, (10, 10), 0.5, &config());
        let labels: Vec<_> = detections.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["cat", "person"]);
    }

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }
}
