//! CLI argument parsing for dagdeck.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "dagdeck")]
#[command(about = "Browse a data-orchestration asset graph in the terminal")]
pub struct Args {
    /// Snapshot file to load and reload
    #[arg(default_value = "snapshot.json")]
    pub snapshot: Utf8PathBuf,

    /// Snapshot reload interval in seconds
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Job used for launches, overriding the one in the snapshot
    #[arg(long)]
    pub job_name: Option<String>,

    /// Title of the instance health tab
    #[arg(long)]
    pub health_title: Option<String>,

    /// Color theme (dark or light)
    #[arg(long, default_value = "dark")]
    pub theme: String,

    /// Log file (defaults to .dagdeck/dagdeck.log next to the snapshot)
    #[arg(long)]
    pub log_file: Option<Utf8PathBuf>,

    /// Launch log (defaults to .dagdeck/launches.json next to the snapshot)
    #[arg(long)]
    pub launch_log: Option<Utf8PathBuf>,
}

impl Args {
    /// Directory holding the snapshot; state files live below it.
    pub fn snapshot_dir(&self) -> &Utf8Path {
        match self.snapshot.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        }
    }

    pub fn log_path(&self) -> Utf8PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.snapshot_dir().join(".dagdeck").join("dagdeck.log"))
    }

    pub fn launch_log_path(&self) -> Utf8PathBuf {
        self.launch_log
            .clone()
            .unwrap_or_else(|| self.snapshot_dir().join(".dagdeck").join("launches.json"))
    }
}
