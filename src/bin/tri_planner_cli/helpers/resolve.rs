// ABOUTME: Resolves the --methodology argument to a loaded methodology document
// ABOUTME: Accepts a file path or an id looked up in the configured methodology directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use tri_planner::config::{find_methodology, load_methodology, EngineConfig};
use tri_planner_core::errors::AppResult;
use tri_planner_core::models::MethodologyConfig;

/// Existing file path wins; anything else is treated as a methodology id.
/// With no argument the configured default file is used.
pub fn methodology(config: &EngineConfig, arg: Option<&str>) -> AppResult<MethodologyConfig> {
    match arg {
        None => load_methodology(&config.methodology_path),
        Some(value) if Path::new(value).is_file() => load_methodology(Path::new(value)),
        Some(id) => Ok(find_methodology(&config.methodology_dir, id)?.methodology),
    }
}
