// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: typed ids and timeline bars.

pub mod bar;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;

pub use bar::{Bar, BarError, BarRecord, BarSet, BarSnapshot, BarSpan};
pub use ids::{BarId, ContainerId, Id, IdError};
