mod config;
mod script;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lumen_lights::scene::{self, SceneError};
use lumen_lights::{LightEditor, display_name};

use config::{ConfigError, EditorConfig};
use script::{ScriptError, ScriptRunner};

/// Lumen light editor.
#[derive(Parser, Debug)]
#[command(
    name = "lumen-editor",
    about = "Edit the lights of a Lumen scene",
    long_about = "Loads a scene, applies an edit script and writes the result.\n\n\
        EXAMPLES:\n\
          # Add a warm key light to a scene\n\
          lumen-editor --scene in.ron --script key.txt --output out.ron\n\
        \n\
          # Print the lights of a scene\n\
          lumen-editor --scene in.ron",
    version
)]
struct Args {
    /// Editor settings file.
    #[arg(long, default_value = "editor.toml")]
    config: PathBuf,

    /// Scene to load before running the script.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Edit script to run.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Where to write the edited scene.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("failed to read script {}: {source}", path.display())]
    ReadScript {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Script { path: PathBuf, source: ScriptError },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let loaded = config::load_config(&args.config);

    let level = match &loaded {
        Ok(Some(config)) => config.log_level.as_str(),
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match loaded {
        Ok(Some(config)) => {
            log::info!("Loaded config {}", args.config.display());
            config
        }
        Ok(None) => {
            log::warn!("No config at {}, using defaults", args.config.display());
            EditorConfig::default()
        }
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &EditorConfig) -> Result<(), RunError> {
    let mut editor = LightEditor::with_settings(config.history.max_undo, config.snap);

    if let Some(path) = &args.scene {
        editor.load_snapshot(scene::read_scene(path)?);
    }

    if let Some(path) = &args.script {
        let source = std::fs::read_to_string(path).map_err(|source| RunError::ReadScript {
            path: path.clone(),
            source,
        })?;
        ScriptRunner::new(&mut editor, args.output.as_deref())
            .run(&source)
            .map_err(|source| RunError::Script {
                path: path.clone(),
                source,
            })?;
    }

    if let Some(path) = &args.output {
        scene::write_scene(path, &editor.snapshot())?;
        editor.mark_saved();
    }

    let registry = editor.registry();
    for (index, light) in registry.lights().iter().enumerate() {
        let marker = if registry.selected() == Some(light.id) {
            '*'
        } else {
            ' '
        };
        let [x, y, z] = light.position;
        println!(
            "{marker}{index:>3}  {:<24} {:<11} {:>7.1} W  {}  ({x:.2}, {y:.2}, {z:.2})",
            display_name(light),
            light.kind,
            light.power,
            light.color,
        );
    }
    Ok(())
}
