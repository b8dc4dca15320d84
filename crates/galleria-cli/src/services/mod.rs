// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Services used by the CLI commands: data directory resolution, settings
// persistence, and local upload staging.

pub mod config_store;
pub mod data_dir;
pub mod staging;
