// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pointer interactions with bars.

pub mod drag;

pub use drag::{
    BarMove, DragContext, DragError, DragMetrics, DragOutcome, DragPhase, DragSession,
    PointerPosition, RevertHandle,
};
