// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::{Chart, ChartError};
use crate::config::ChartConfig;
use crate::model::ContainerId;

/// Owns one chart per container.
///
/// Charts are looked up through their container id only; there is no global instance.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<ContainerId, Chart>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chart for `container`, replacing any chart it already had.
    ///
    /// A config that fails to build leaves the registry as it was.
    pub fn create(
        &mut self,
        container: ContainerId,
        config: ChartConfig,
    ) -> Result<&mut Chart, ChartError> {
        let chart = Chart::new(config)?;
        Ok(self.insert(container, chart))
    }

    pub fn insert(&mut self, container: ContainerId, chart: Chart) -> &mut Chart {
        use std::collections::btree_map::Entry;

        match self.charts.entry(container) {
            Entry::Occupied(mut entry) => {
                log::debug!("replacing chart in container {}", entry.key());
                entry.insert(chart);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(chart),
        }
    }

    pub fn get(&self, container: &str) -> Option<&Chart> {
        self.charts.get(container)
    }

    pub fn get_mut(&mut self, container: &str) -> Option<&mut Chart> {
        self.charts.get_mut(container)
    }

    pub fn remove(&mut self, container: &str) -> Option<Chart> {
        self.charts.remove(container)
    }

    pub fn containers(&self) -> impl Iterator<Item = &ContainerId> + '_ {
        self.charts.keys()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
