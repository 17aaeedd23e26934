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

//! Shared primitives for the Memris in-memory columnar engine: the closed
//! `TypeCode`/`Value` type system, `RowId`, the `EngineError` taxonomy, and
//! a small tracing bootstrap helper.

pub mod error;
pub mod row_id;
pub mod tracing_init;
pub mod type_system;

pub use error::{EngineError, EngineResult};
pub use row_id::RowId;
pub use tracing_init::init_tracing;
pub use type_system::{TypeCode, TypeConverter, Value};
