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

//! The sealed predicate algebra evaluated by [`crate::scanner::Scanner`].

use memris_common::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    StartingWith,
    EndingWith,
    Containing,
    NotContaining,
    IsTrue,
    IsFalse,
    IsNull,
    IsNotNull,
    IgnoreCase,
    After,
    Before,
}

#[derive(Clone, Debug)]
pub enum Predicate {
    Comparison {
        column: String,
        op: Operator,
        value: Option<Value>,
    },
    /// Inclusive on both bounds.
    Between {
        column: String,
        lower: Value,
        upper: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        Predicate::Comparison {
            column: column.into(),
            op: Operator::Eq,
            value: Some(value),
        }
    }

    pub fn between(column: impl Into<String>, lower: Value, upper: Value) -> Self {
        Predicate::Between {
            column: column.into(),
            lower,
            upper,
        }
    }

    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    /// The column this predicate is anchored on, for index-selection by the
    /// repository layer. `And`/`Or`/`Not` carry no single anchor column.
    pub fn anchor_column(&self) -> Option<&str> {
        match self {
            Predicate::Comparison { column, .. } => Some(column),
            Predicate::Between { column, .. } => Some(column),
            Predicate::In { column, .. } => Some(column),
            _ => None,
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            Predicate::Comparison {
                op: Operator::Eq,
                ..
            }
        )
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Predicate::Between { .. })
            || matches!(
                self,
                Predicate::Comparison {
                    op: Operator::Gt
                        | Operator::Gte
                        | Operator::Lt
                        | Operator::Lte
                        | Operator::After
                        | Operator::Before,
                    ..
                }
            )
    }
}
