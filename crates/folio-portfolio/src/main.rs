#![forbid(unsafe_code)]

//! folio binary entry point.

use std::time::Duration;

use folio_core::logging::{self, LogConfig};
use folio_portfolio::app::{AppConfig, AppModel};
use folio_portfolio::cli;
use folio_portfolio::content::Content;
use folio_runtime::state_persistence::FileStorage;
use folio_runtime::{PreferenceStore, Program, ProgramConfig};

fn main() {
    let opts = cli::Opts::parse();

    let log_config = LogConfig {
        file: opts.log_file.clone(),
        json: opts.log_json,
    };
    if let Err(e) = logging::init(&log_config) {
        eprintln!("Logging disabled: {e}");
    }

    let storage = match &opts.state_file {
        Some(path) => FileStorage::new(path),
        None => FileStorage::default_for_app("folio"),
    };
    tracing::debug!(target: "folio.app", path = %storage.path().display(), "preference file");
    let store = PreferenceStore::new(Box::new(storage)).shared();

    let content = match &opts.content {
        Some(path) => match Content::load_json(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    target: "folio.content",
                    path = %path.display(),
                    error = %e,
                    "falling back to built-in content"
                );
                Content::builtin()
            }
        },
        None => Content::builtin(),
    };

    let config = AppConfig {
        layout: opts.layout,
        seed: opts.seed,
        exit_after: (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms)),
    };
    let model = AppModel::new(config, content).with_preferences(store.clone());

    let program_config = ProgramConfig::default()
        .with_mouse(opts.mouse)
        .with_preferences(store);
    match Program::with_config(model, program_config) {
        Ok(mut program) => {
            if let Err(e) = program.run() {
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}
