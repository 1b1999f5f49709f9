// ABOUTME: Shared helpers for tri-planner-cli commands
// ABOUTME: Methodology resolution and terminal output formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod display;
pub mod resolve;
