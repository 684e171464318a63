pub mod job;
pub mod outcome;
pub mod selection;
pub mod service;
pub mod transfer;

use std::path::PathBuf;

pub fn version() -> &'static str {
    let author = clap::crate_authors!();

    Box::leak(Box::new(format!(
        "\
{}
Authors: {author}",
        env!("CARGO_PKG_VERSION")
    )))
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to get config directory"))
        .map(|p| p.join("rdjobs"))
}
