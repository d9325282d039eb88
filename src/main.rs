use std::path::PathBuf;
use std::process::ExitCode;

use vista::error::Error;
use vista::scene::SceneManifest;
use vista::window;

fn main() -> ExitCode {
    env_logger::init();

    let manifest_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets/scene.json"));

    match run(&manifest_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(manifest_path: &std::path::Path) -> Result<(), Error> {
    let manifest = SceneManifest::load(manifest_path)?;
    log::info!(
        "loaded scene {} ({} models)",
        manifest_path.display(),
        manifest.models.len()
    );
    window::run(manifest)
}
