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

//! Shared record descriptors for the end-to-end scenario tests.

use std::sync::Arc;

use memris::{
    Factory, FieldAccess, FieldMapping, IdStrategy, RecordDescriptor, RelationshipKind, RepositoryCore, Value,
};
use memris_common::TypeCode;

#[derive(Clone, Debug, Default)]
pub struct Customer {
    pub id: i64,
    pub email: String,
    pub name: String,
}

pub fn customer_descriptor() -> RecordDescriptor<Customer> {
    RecordDescriptor {
        record_name: "customer",
        fields: vec![
            FieldMapping {
                property_path: "id".to_string(),
                column_name: "id".to_string(),
                storage_type: TypeCode::I64,
                column_position: 0,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Customer| Value::I64(r.id)),
                    set: Box::new(|r: &mut Customer, v: Value| r.id = v.as_i64().unwrap_or(0)),
                },
            },
            FieldMapping {
                property_path: "email".to_string(),
                column_name: "email".to_string(),
                storage_type: TypeCode::Str,
                column_position: 1,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Customer| Value::Str(r.email.clone())),
                    set: Box::new(|r: &mut Customer, v: Value| r.email = v.as_str().unwrap_or_default().to_string()),
                },
            },
            FieldMapping {
                property_path: "name".to_string(),
                column_name: "name".to_string(),
                storage_type: TypeCode::Str,
                column_position: 2,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Customer| Value::Str(r.name.clone())),
                    set: Box::new(|r: &mut Customer, v: Value| r.name = v.as_str().unwrap_or_default().to_string()),
                },
            },
        ],
        id_field_index: 0,
        id_strategy: IdStrategy::Identity,
        new_instance: Customer::default,
        pre_persist: None,
        pre_update: None,
        post_load: None,
    }
}

pub fn customer_repo(factory: &Factory, table_name: &'static str) -> RepositoryCore<Customer> {
    let arena = factory.create_arena();
    let id_gen = factory.id_generator("IDENTITY").unwrap();
    RepositoryCore::new(arena, customer_descriptor(), table_name, vec![memris::IndexSpec::hash("email")], id_gen).unwrap()
}

#[derive(Clone, Debug, Default)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub price: i64,
    pub stock: i64,
}

pub fn product_descriptor() -> RecordDescriptor<Product> {
    RecordDescriptor {
        record_name: "product",
        fields: vec![
            FieldMapping {
                property_path: "id".to_string(),
                column_name: "id".to_string(),
                storage_type: TypeCode::I64,
                column_position: 0,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Product| Value::I64(r.id)),
                    set: Box::new(|r: &mut Product, v: Value| r.id = v.as_i64().unwrap_or(0)),
                },
            },
            FieldMapping {
                property_path: "sku".to_string(),
                column_name: "sku".to_string(),
                storage_type: TypeCode::Str,
                column_position: 1,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Product| Value::Str(r.sku.clone())),
                    set: Box::new(|r: &mut Product, v: Value| r.sku = v.as_str().unwrap_or_default().to_string()),
                },
            },
            FieldMapping {
                property_path: "price".to_string(),
                column_name: "price".to_string(),
                storage_type: TypeCode::I64,
                column_position: 2,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Product| Value::I64(r.price)),
                    set: Box::new(|r: &mut Product, v: Value| r.price = v.as_i64().unwrap_or(0)),
                },
            },
            FieldMapping {
                property_path: "stock".to_string(),
                column_name: "stock".to_string(),
                storage_type: TypeCode::I64,
                column_position: 3,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Product| Value::I64(r.stock)),
                    set: Box::new(|r: &mut Product, v: Value| r.stock = v.as_i64().unwrap_or(0)),
                },
            },
        ],
        id_field_index: 0,
        id_strategy: IdStrategy::Identity,
        new_instance: Product::default,
        pre_persist: None,
        pre_update: None,
        post_load: None,
    }
}

pub fn product_repo(factory: &Factory, table_name: &'static str) -> RepositoryCore<Product> {
    let arena = factory.create_arena();
    let id_gen = factory.id_generator("IDENTITY").unwrap();
    RepositoryCore::new(
        arena,
        product_descriptor(),
        table_name,
        vec![memris::IndexSpec::hash("sku"), memris::IndexSpec::range("price")],
        id_gen,
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn new_factory() -> Arc<Factory> {
    Arc::new(Factory::default())
}
