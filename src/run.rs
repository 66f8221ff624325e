mod cli;
mod tui;

pub(crate) use cli::{as_cli, parse_add_args};
pub(crate) use tui::as_tui;

use std::path::{Path, PathBuf};

/// Today's date in the local time zone.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Export destination: the given path, or the home directory when omitted.
pub(crate) fn resolve_export_target(arg: Option<&str>) -> PathBuf {
    match arg.filter(|a| !a.starts_with('-')) {
        Some(path) => PathBuf::from(shellexpand(path)),
        None => directories::UserDirs::new()
            .map(|d| d.home_dir().to_path_buf())
            .unwrap_or_else(|| Path::new(".").to_path_buf()),
    }
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
