// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ganttline: layout and routing engine for Gantt-style timelines.
//!
//! The engine maps calendar or index values onto discrete axis columns, packs bars into the
//! fewest non-conflicting rows, routes connector lines between bars through an occupancy grid
//! and tracks drag-to-move interactions. [`chart::Chart`] ties the stages together.

pub mod calendar;
pub mod chart;
pub mod config;
pub mod interact;
pub mod layout;
pub mod model;
pub mod render;
