use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pipeline_desk::{InferenceConfig, InputMode, ModelDescriptor};

#[derive(Parser)]
#[command(name = "pipeline-desk")]
#[command(about = "Run text summarization and object detection models from a desktop window")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding encoder.rten, decoder.rten, tokenizer.json and config.json
    #[arg(long, value_name = "DIR", global = true)]
    text_model_dir: Option<PathBuf>,

    /// Directory holding model.rten and config.json
    #[arg(long, value_name = "DIR", global = true)]
    image_model_dir: Option<PathBuf>,

    /// Minimum score for reported detections
    #[arg(long, value_name = "SCORE", global = true)]
    threshold: Option<f32>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Open the desktop window (default)
    Gui,
    /// Summarize TEXT and print the result
    Summarize { text: String },
    /// Detect objects in IMAGE and print the result
    Detect {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,
    },
    /// Show the info block for a model without loading it
    Info {
        #[arg(value_name = "text|image")]
        model: InputMode,
    },
}

impl Cli {
    fn inference_config(&self) -> anyhow::Result<InferenceConfig> {
        let mut config = InferenceConfig::from_cache_dir()?;
        if let Some(dir) = &self.text_model_dir {
            config.text_model_dir = dir.clone();
        }
        if let Some(dir) = &self.image_model_dir {
            config.image_model_dir = dir.clone();
        }
        if let Some(threshold) = self.threshold {
            anyhow::ensure!(
                (0.0..1.0).contains(&threshold),
                "threshold must be in [0, 1), got {}",
                threshold
            );
            config.detection_threshold = threshold;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match args.command.as_ref().unwrap_or(&Command::Gui) {
        Command::Info { model } => {
            println!("{}", ModelDescriptor::for_mode(*model).info_text());
        }
        Command::Summarize { text } => {
            let mut controller = pipeline_desk::load_controller(&args.inference_config()?)?;
            controller.set_text(text.as_str());
            controller.run_text_model();
            print_last_entry(&controller);
        }
        Command::Detect { image_path } => {
            let mut controller = pipeline_desk::load_controller(&args.inference_config()?)?;
            controller.select_mode(InputMode::Image);
            controller.set_image_path(image_path.clone());
            controller.run_image_model();
            print_last_entry(&controller);
        }
        Command::Gui => run_gui(args.inference_config()?)?,
    }

    Ok(())
}

fn print_last_entry(controller: &pipeline_desk::DeskController) {
    if let Some(entry) = controller.output().last() {
        println!("{}", entry.line());
    }
}

#[cfg(feature = "gui")]
fn run_gui(config: InferenceConfig) -> anyhow::Result<()> {
    log::info!(
        "Starting GUI (text model: {}, image model: {})",
        config.text_model_dir.display(),
        config.image_model_dir.display()
    );
    pipeline_desk::gui::run(config).map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
}

#[cfg(not(feature = "gui"))]
fn run_gui(_config: InferenceConfig) -> anyhow::Result<()> {
    anyhow::bail!("built without the `gui` feature; use the summarize, detect or info commands")
}
