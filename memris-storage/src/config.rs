// Copyright 2024 Memris Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine-wide configuration: the column growth unit and the sort
//! algorithm thresholds `RepositoryCore` consults.

use crate::column::DEFAULT_PAGE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortAlgorithm {
    Auto,
    Insertion,
    Comparison,
    Parallel,
}

impl Default for SortAlgorithm {
    fn default() -> Self {
        SortAlgorithm::Auto
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub sort_algorithm: SortAlgorithm,
    pub parallel_sort_enabled: bool,
    pub parallel_sort_threshold: usize,
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sort_algorithm: SortAlgorithm::Auto,
            parallel_sort_enabled: true,
            parallel_sort_threshold: 1000,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: 1024,
        }
    }
}

impl EngineConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_sort_algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.sort_algorithm = algorithm;
        self
    }

    pub fn with_parallel_sort_enabled(mut self, enabled: bool) -> Self {
        self.parallel_sort_enabled = enabled;
        self
    }

    pub fn with_parallel_sort_threshold(mut self, threshold: usize) -> Self {
        self.parallel_sort_threshold = threshold;
        self
    }

    /// Column capacity before a table built under this config would exceed
    /// `max_pages`; informational only, the engine does not enforce it.
    pub fn max_rows_per_table(&self) -> usize {
        self.page_size.saturating_mul(self.max_pages)
    }
}
