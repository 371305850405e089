use iced::{
    Alignment::Center,
    Element, Length, Task, Theme,
    widget::{Row, button, column, container, pick_list, radio, row, scrollable, text, text_input},
};

use super::{AppState, Message, widgets};
use crate::explanations::DESIGN_NOTES;
use crate::inference::{BartSummarizer, DetectObjects, DetrDetector, InferenceConfig, Summarize};
use crate::models::{InputMode, PendingInput};

/// Top-level iced application. Models are loaded when the window boots.
pub enum PipelineDesk {
    Running(AppState<BartSummarizer, DetrDetector>),
    StartupFailed(String),
}

impl PipelineDesk {
    pub fn boot(config: &InferenceConfig) -> Self {
        match crate::load_controller(config) {
            Ok(controller) => PipelineDesk::Running(AppState::new(controller)),
            Err(e) => {
                log::error!("Failed to load models: {:#}", e);
                PipelineDesk::StartupFailed(format!("{:#}", e))
            }
        }
    }

    pub fn title(&self) -> String {
        "Pipeline Desk".to_string()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match self {
            PipelineDesk::Running(state) => state.update(message),
            PipelineDesk::StartupFailed(_) => match message {
                Message::Exit => iced::exit(),
                _ => Task::none(),
            },
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        match self {
            PipelineDesk::Running(state) => state.view(),
            PipelineDesk::StartupFailed(error) => container(
                column![
                    text("Failed to load models").size(24),
                    text(error.as_str()),
                    button("Exit").on_press(Message::Exit),
                ]
                .spacing(20)
                .padding(20),
            )
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl<S: Summarize, D: DetectObjects> AppState<S, D> {
    pub fn view(&self) -> Element<'_, Message> {
        let top_bar = row![
            text("Model Selection:"),
            pick_list(
                InputMode::ALL,
                Some(self.model_choice),
                Message::ModelChoiceSelected
            ),
            button("Load Model").on_press(Message::LoadModel),
            button("Exit").on_press(Message::Exit),
        ]
        .spacing(10)
        .align_y(Center);

        let mode = self.controller.mode();
        let radios = Row::with_children(InputMode::ALL.into_iter().map(|option| {
            radio(option.label(), option, Some(mode), Message::InputModeSelected).into()
        }))
        .spacing(20);

        let input: Element<'_, Message> = match self.controller.pending() {
            PendingInput::Text(buffer) => row![
                text("Enter your text:"),
                text_input("", buffer)
                    .on_input(Message::TextChanged)
                    .on_submit(Message::RunText)
                    .width(Length::Fill),
            ]
            .spacing(10)
            .align_y(Center)
            .into(),
            PendingInput::Image(path) => {
                let shown = path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "No file selected".to_string());
                row![
                    button("Browse Image File").on_press(Message::BrowseImage),
                    text(shown).width(Length::Fill),
                ]
                .spacing(10)
                .align_y(Center)
                .into()
            }
        };

        let buttons = Row::with_children(
            [
                ("Run Text Model", Message::RunText),
                ("Run Image Model", Message::RunImage),
                ("Clear", Message::ClearOutput),
            ]
            .into_iter()
            .map(|(label, message)| button(label).on_press(message).into()),
        )
        .spacing(10);

        let output = scrollable(widgets::log_lines(self.controller.output().entries()))
            .height(Length::Fill)
            .width(Length::Fill);

        let info = row![
            container(text(self.model_info.as_str())).width(Length::FillPortion(1)),
            scrollable(text(DESIGN_NOTES))
                .width(Length::FillPortion(1))
                .height(Length::Fill),
        ]
        .spacing(20);

        column![
            top_bar,
            widgets::section("User Input Section", column![radios, input].spacing(8)),
            buttons,
            container(widgets::section("Model Output Section", output)).height(Length::FillPortion(1)),
            container(widgets::section("Model Information & Explanation", info))
                .height(Length::FillPortion(1)),
        ]
        .spacing(10)
        .padding(10)
        .into()
    }
}

/// Open the main window and block until it is closed
pub fn run(config: InferenceConfig) -> iced::Result {
    iced::application(
        move || PipelineDesk::boot(&config),
        PipelineDesk::update,
        PipelineDesk::view,
    )
    .title(PipelineDesk::title)
    .theme(PipelineDesk::theme)
    .window_size((900.0, 700.0))
    .run()
}
