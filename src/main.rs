//! `labelkit-replay`: run a scripted editing session headless.
//!
//! Prints the resulting labels as JSON and optionally writes the final frame
//! as a PNG.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::Parser;
    use labelkit::config::AppConfig;
    use labelkit::replay::{self, ReplayError, ReplayScript};

    #[derive(Debug, Parser)]
    #[command(
        name = "labelkit-replay",
        version,
        about = "Replay a scripted labelling session and export the result"
    )]
    pub(super) struct Args {
        /// Script with images and input events
        pub(super) script: PathBuf,
        /// Configuration file; defaults to the per-user config
        #[arg(long)]
        pub(super) config: Option<PathBuf>,
        /// Background image stretched over the image area
        #[arg(long)]
        pub(super) image: Option<PathBuf>,
        /// Write the final frame to this PNG
        #[arg(long)]
        pub(super) png: Option<PathBuf>,
        /// Write labels here instead of stdout
        #[arg(long)]
        pub(super) output: Option<PathBuf>,
        /// Override the script's canvas width
        #[arg(long)]
        pub(super) canvas_width: Option<f32>,
        /// Override the script's canvas height
        #[arg(long)]
        pub(super) canvas_height: Option<f32>,
    }

    fn load_config(args: &Args) -> Result<AppConfig, ReplayError> {
        match &args.config {
            Some(path) => Ok(AppConfig::load(path)?),
            None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    pub(super) fn run(args: Args, config: &AppConfig) -> Result<(), ReplayError> {
        let mut script = ReplayScript::load(&args.script)?;
        if let Some(width) = args.canvas_width {
            script.canvas.width = width;
        }
        if let Some(height) = args.canvas_height {
            script.canvas.height = height;
        }

        let result = replay::run_script(&script, config)?;

        if let Some(png) = &args.png {
            let background = match &args.image {
                Some(path) => Some(replay::load_background(path)?),
                None => None,
            };
            let pixmap = result.rasterize(config, background.as_ref())?;
            replay::save_png(&pixmap, png)?;
        }

        let json = result.labels_json()?;
        match &args.output {
            Some(path) => {
                std::fs::write(path, json)?;
                log::info!("Wrote labels to {:?}", path);
            }
            None => println!("{}", json),
        }
        Ok(())
    }

    pub(super) fn main() {
        let args = Args::parse();

        // Config errors are reported after the logger exists
        let (config, config_error) = match load_config(&args) {
            Ok(config) => (config, None),
            Err(e) => (AppConfig::default(), Some(e)),
        };

        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        if let Some(e) = config_error {
            log::error!("{}", e);
            std::process::exit(1);
        }

        if let Err(e) = run(args, &config) {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
