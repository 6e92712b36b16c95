use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};

pub const DATA_DIR_VAR: &str = "DAYGLANCE_DIR";

/// Picks the data directory: `$DAYGLANCE_DIR`, then `$XDG_DATA_HOME/dayglance`, then
/// `$HOME/.local/share/dayglance`. The directory is created if missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = match env::var(DATA_DIR_VAR) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => platform_data_path()?,
    };
    create_dir(path)
}

fn platform_data_path() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let mut path = env::var("APPDATA")
            .map(PathBuf::from)
            .map_err(|_| anyhow!("APPDATA should be present on Windows"))?;
        path.push("dayglance");
        Ok(path)
    }
    #[cfg(not(windows))]
    {
        let mut path = env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|_| {
                env::var("HOME").map(|home| {
                    let mut path = PathBuf::from(home);
                    path.push(".local/share");
                    path
                })
            })
            .map_err(|_| anyhow!("Couldn't find neither XDG_DATA_HOME nor HOME"))?;
        path.push("dayglance");
        Ok(path)
    }
}

pub fn create_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

/// Where each store lives inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn routines_dir(&self) -> PathBuf {
        self.root.join("routines")
    }

    pub fn events_file(&self) -> PathBuf {
        self.root.join("events").join("events.md")
    }

    pub fn quotes_file(&self) -> PathBuf {
        self.root.join("quotes").join("quotes.md")
    }

    /// Daily session logs.
    pub fn logging_dir(&self) -> PathBuf {
        self.root.join("logging")
    }

    /// Diagnostics written by tracing.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}
