use std::path::PathBuf;

use crate::models::InputMode;

#[derive(Debug, Clone)]
pub enum Message {
    ModelChoiceSelected(InputMode),
    LoadModel,
    InputModeSelected(InputMode),
    TextChanged(String),
    BrowseImage,
    ImageChosen(Option<PathBuf>),
    RunText,
    RunImage,
    ClearOutput,
    Exit,
}
