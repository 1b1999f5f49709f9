// ABOUTME: Command implementations for tri-planner-cli
// ABOUTME: Validation and planning, what-if scenarios, methodology catalog and trace inspection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod evaluate;
pub mod methodology;
pub mod trace;
pub mod what_if;
