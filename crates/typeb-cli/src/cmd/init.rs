use anyhow::Context;
use std::path::Path;
use typeb_core::config::Config;
use typeb_core::{io, paths};

/// Create the `.typeb/` tree and a default config. Idempotent.
pub fn run(root: &Path) -> anyhow::Result<()> {
    io::ensure_dir(&paths::typeb_dir(root)).context("failed to create .typeb")?;
    io::ensure_dir(&root.join(paths::FAMILIES_DIR))?;
    io::ensure_dir(&root.join(paths::PREFS_DIR))?;

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!(
            "TypeB already initialized in {}",
            paths::typeb_dir(root).display()
        );
    } else {
        Config::default()
            .save(root)
            .context("failed to write default config")?;
        println!("Initialized TypeB in {}", paths::typeb_dir(root).display());
    }
    Ok(())
}
