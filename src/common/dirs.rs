use std::{fs::create_dir_all, path::PathBuf};

use anyhow::{Context, Result};

/// `~/.cmdgram`
pub fn cmdgram_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("where's your home dir?")?
        .join(".cmdgram");

    create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir)
}

pub fn log_file_path(name: &str) -> Result<PathBuf> {
    let log_dir = cmdgram_dir()?.join("log");
    create_dir_all(&log_dir).with_context(|| format!("failed to create {}", log_dir.display()))?;
    Ok(log_dir.join(&format!("{}.log", name)))
}
