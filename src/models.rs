use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Static metadata shown when the user loads a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

impl ModelDescriptor {
    pub const TEXT: ModelDescriptor = ModelDescriptor {
        name: "BART Summarizer",
        category: "Text (NLP - Summarization)",
        description: "Summarizes long text into concise summaries.",
    };

    pub const IMAGE: ModelDescriptor = ModelDescriptor {
        name: "DETR Object Detector",
        category: "Image (Computer Vision - Object Detection)",
        description: "Detects objects and their bounding boxes in images.",
    };

    /// Fields rendered by the model info pane, in display order
    pub const INFO_FIELDS: [(&'static str, fn(&ModelDescriptor) -> &'static str); 3] = [
        ("Model Name", |d| d.name),
        ("Category", |d| d.category),
        ("Description", |d| d.description),
    ];

    pub fn for_mode(mode: InputMode) -> &'static ModelDescriptor {
        match mode {
            InputMode::Text => &Self::TEXT,
            InputMode::Image => &Self::IMAGE,
        }
    }

    /// Render the descriptor as a bulleted info block
    pub fn info_text(&self) -> String {
        let mut lines = vec!["Selected Model Info:".to_string()];
        for (label, field) in Self::INFO_FIELDS {
            lines.push(format!("• {}: {}", label, field(self)));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    #[default]
    Text,
    Image,
}

impl InputMode {
    pub const ALL: [InputMode; 2] = [InputMode::Text, InputMode::Image];

    pub fn label(self) -> &'static str {
        match self {
            InputMode::Text => "Text",
            InputMode::Image => "Image",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(InputMode::Text),
            "image" => Ok(InputMode::Image),
            other => Err(format!("unknown model '{}', expected 'text' or 'image'", other)),
        }
    }
}

/// Input waiting to be run. The variant is the active input mode, so a text buffer
/// can never exist while the image mode is selected and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInput {
    Text(String),
    Image(Option<PathBuf>),
}

impl PendingInput {
    pub fn empty(mode: InputMode) -> Self {
        match mode {
            InputMode::Text => PendingInput::Text(String::new()),
            InputMode::Image => PendingInput::Image(None),
        }
    }

    pub fn mode(&self) -> InputMode {
        match self {
            PendingInput::Text(_) => InputMode::Text,
            PendingInput::Image(_) => InputMode::Image,
        }
    }
}

impl Default for PendingInput {
    fn default() -> Self {
        Self::empty(InputMode::default())
    }
}

/// One summarization result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub summary_text: String,
}

/// Bounding box in original image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

/// One detected object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub score: f32,
    pub label: String,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}
