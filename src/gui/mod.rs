mod app;
mod message;
mod state;
mod widgets;

pub use app::{PipelineDesk, run};
pub use message::Message;
pub use state::{AppState, IMAGE_EXTENSIONS};
