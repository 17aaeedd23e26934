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

use crate::type_system::TypeCode;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// The full error taxonomy surfaced by every Memris engine crate.
///
/// All errors are synchronous: the engine never logs, retries, or swallows
/// one of these on the caller's behalf.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("arena is closed")]
    ArenaClosed,

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("unknown property path `{0}`")]
    UnknownPropertyPath(String),

    #[error("type mismatch on column `{column}`: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        column: String,
        expected: TypeCode,
        found: TypeCode,
    },

    #[error("record type `{0}` has no accessible no-arg constructor for a nested path")]
    MissingDefaultConstructor(String),

    #[error("save requested an update but record `{0}` declares no id column")]
    MissingId(String),

    #[error("no id-generation strategy is registered for `{0}`")]
    UnsupportedIdType(String),

    #[error("row index {row} out of range (len {len}) for column `{column}`")]
    OutOfRange {
        column: String,
        row: usize,
        len: usize,
    },

    #[error("id generator `{0}` is not registered")]
    GeneratorNotFound(String),

    #[error("failed to insert row into `{record}`.`{column}`: {source}")]
    InsertFailure {
        record: String,
        column: String,
        #[source]
        source: Box<EngineError>,
    },
}
