use iced::Task;
use rfd::AsyncFileDialog;

use crate::gui::Message;
use crate::inference::{DetectObjects, Summarize};
use crate::models::InputMode;
use crate::session::SessionController;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Window state wrapped around the session controller
pub struct AppState<S, D> {
    pub controller: SessionController<S, D>,
    pub model_choice: InputMode,
    pub model_info: String,
}

impl<S: Summarize, D: DetectObjects> AppState<S, D> {
    pub fn new(controller: SessionController<S, D>) -> Self {
        Self {
            controller,
            model_choice: InputMode::default(),
            model_info: String::new(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ModelChoiceSelected(choice) => {
                self.model_choice = choice;
                Task::none()
            }
            Message::LoadModel => {
                self.model_info = self.controller.load_model_info(self.model_choice);
                Task::none()
            }
            Message::InputModeSelected(mode) => {
                self.controller.select_mode(mode);
                Task::none()
            }
            Message::TextChanged(text) => {
                self.controller.set_text(text);
                Task::none()
            }
            Message::BrowseImage => Task::perform(
                AsyncFileDialog::new()
                    .set_title("Select an Image File")
                    .add_filter("Image Files", &IMAGE_EXTENSIONS)
                    .add_filter("All Files", &["*"])
                    .pick_file(),
                |handle| Message::ImageChosen(handle.map(|data| data.path().to_path_buf())),
            ),
            Message::ImageChosen(Some(path)) => {
                self.controller.set_image_path(path);
                Task::none()
            }
            // Dialog cancelled, keep whatever was chosen before
            Message::ImageChosen(None) => Task::none(),
            Message::RunText => {
                self.controller.run_text_model();
                Task::none()
            }
            Message::RunImage => {
                self.controller.run_image_model();
                Task::none()
            }
            Message::ClearOutput => {
                self.controller.clear_output();
                Task::none()
            }
            Message::Exit => iced::exit(),
        }
    }
}
