// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where Galleria keeps its settings and staged uploads.
//
// Resolution order: `GALLERIA_DATA_DIR`, then `$XDG_DATA_HOME/galleria`, then
// `~/.local/share/galleria`, then the system temp directory. Nothing is
// created here; writers create what they need.

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "galleria";

/// The application data directory.
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("GALLERIA_DATA_DIR"),
        std::env::var_os("XDG_DATA_HOME"),
        std::env::var_os("HOME"),
    )
}

/// A named subdirectory of [`data_dir`] (e.g. the `artworks` bucket).
pub fn data_subdir(name: &str) -> PathBuf {
    data_dir().join(name)
}

fn resolve(explicit: Option<OsString>, xdg: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let non_empty = |v: Option<OsString>| v.filter(|s| !s.is_empty()).map(PathBuf::from);
    if let Some(dir) = non_empty(explicit) {
        return dir;
    }
    if let Some(xdg) = non_empty(xdg) {
        return xdg.join(APP_DIR);
    }
    if let Some(home) = non_empty(home) {
        return home.join(".local").join("share").join(APP_DIR);
    }
    std::env::temp_dir().join(APP_DIR)
}
