// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::interact::BarMove;
use crate::model::BarSnapshot;

/// What a finished layout pass produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub columns: usize,
    pub rows: usize,
    pub bars: usize,
    pub connectors: usize,
    pub unroutable: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum ChartEvent {
    /// Sent after the new layout is stored, so a subscriber reading the chart sees it.
    Rendered(RenderSummary),
    BarClicked(BarSnapshot),
    BarHovered(BarSnapshot),
    BarMoved(BarMove),
}

/// Fan-out of chart events to any number of channel subscribers.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<UnboundedSender<ChartEvent>>,
}

impl EventHub {
    pub fn subscribe(&mut self) -> UnboundedReceiver<ChartEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers `event` to every live subscriber and forgets the ones that hung up.
    pub fn emit(&mut self, event: ChartEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            log::debug!("pruned {dropped} closed event subscribers");
        }
    }
}
