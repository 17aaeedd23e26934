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

//! Resolves a record's [`IdStrategy`] to a concrete generator, given a
//! [`Factory`]'s registered generators and the id column's storage type.

use std::sync::Arc;

use memris_common::{EngineError, EngineResult, TypeCode};
use memris_storage::{Factory, IdGenerator};

use crate::descriptor::IdStrategy;

/// `Auto` picks `Identity` for numeric id columns and `Uuid` for string
/// ones, matching the source model's "numeric → IDENTITY, uuid → UUID"
/// default.
pub fn resolve_generator(
    factory: &Factory,
    strategy: &IdStrategy,
    id_storage_type: TypeCode,
) -> EngineResult<Arc<dyn IdGenerator>> {
    let name = match strategy {
        IdStrategy::Identity => "IDENTITY",
        IdStrategy::Uuid => "UUID",
        IdStrategy::Custom(name) => return factory.id_generator(name),
        IdStrategy::Auto => match id_storage_type {
            TypeCode::Str => "UUID",
            _ => "IDENTITY",
        },
    };
    factory.id_generator(name).map_err(|_| EngineError::UnsupportedIdType(name.to_string()))
}
