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

//! Opt-in tracing bootstrap. The engine never installs a subscriber on its
//! own from a hot path; callers that want Memris's `tracing::instrument`
//! spans surfaced can call [`init_tracing`] once at process start.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a `tracing-subscriber` `EnvFilter` subscriber reading
/// `MEMRIS_LOG` (falling back to `info`). Safe to call more than once; only
/// the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("MEMRIS_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
