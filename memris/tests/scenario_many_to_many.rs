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

//! A many-to-many relationship (students enrolled in courses) hydrated
//! through a raw join table rather than a `CompiledQuery` over a nested
//! path: `CompiledQuery` only binds predicates against one table's own
//! columns, so the enrollment rows are read directly by the `courses`
//! field's `load` closure instead.

use std::sync::Arc;

use memris::{
    FieldAccess, FieldMapping, IdStrategy, InProgress, RecordDescriptor, RelationshipKind, RepositoryCore, TypeCode,
    Value,
};

#[derive(Clone, Debug, Default)]
struct Course {
    id: i64,
    name: String,
}

fn course_descriptor() -> RecordDescriptor<Course> {
    RecordDescriptor {
        record_name: "course",
        fields: vec![
            FieldMapping {
                property_path: "id".to_string(),
                column_name: "id".to_string(),
                storage_type: TypeCode::I64,
                column_position: 0,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Course| Value::I64(r.id)),
                    set: Box::new(|r: &mut Course, v: Value| r.id = v.as_i64().unwrap_or(0)),
                },
            },
            FieldMapping {
                property_path: "name".to_string(),
                column_name: "name".to_string(),
                storage_type: TypeCode::Str,
                column_position: 1,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Course| Value::Str(r.name.clone())),
                    set: Box::new(|r: &mut Course, v: Value| r.name = v.as_str().unwrap_or_default().to_string()),
                },
            },
        ],
        id_field_index: 0,
        id_strategy: IdStrategy::Identity,
        new_instance: Course::default,
        pre_persist: None,
        pre_update: None,
        post_load: None,
    }
}

#[derive(Clone, Debug, Default)]
struct Student {
    id: i64,
    name: String,
    courses: Vec<Course>,
}

fn student_descriptor(course_repo: Arc<RepositoryCore<Course>>) -> RecordDescriptor<Student> {
    RecordDescriptor {
        record_name: "student",
        fields: vec![
            FieldMapping {
                property_path: "id".to_string(),
                column_name: "id".to_string(),
                storage_type: TypeCode::I64,
                column_position: 0,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Student| Value::I64(r.id)),
                    set: Box::new(|r: &mut Student, v: Value| r.id = v.as_i64().unwrap_or(0)),
                },
            },
            FieldMapping {
                property_path: "name".to_string(),
                column_name: "name".to_string(),
                storage_type: TypeCode::Str,
                column_position: 1,
                relationship: RelationshipKind::None,
                access: FieldAccess::Scalar {
                    get: Box::new(|r: &Student| Value::Str(r.name.clone())),
                    set: Box::new(|r: &mut Student, v: Value| r.name = v.as_str().unwrap_or_default().to_string()),
                },
            },
            FieldMapping {
                property_path: "courses".to_string(),
                column_name: "courses".to_string(),
                storage_type: TypeCode::Str,
                column_position: -1,
                relationship: RelationshipKind::ManyToMany,
                access: FieldAccess::ToMany {
                    // Enrollment rows are written directly by the test below;
                    // there is nothing this record's own save needs to do.
                    cascade_save: Box::new(|_arena, _student_id, _record| Ok(())),
                    load: Box::new(move |arena, student_id, record: &mut Student, in_progress: &mut InProgress| {
                        record.courses.clear();
                        let enrollment = arena.get_or_create_table(
                            "enrollment",
                            vec![("student_id".to_string(), TypeCode::I64), ("course_id".to_string(), TypeCode::I64)],
                        )?;
                        let table = enrollment.read();
                        for row in 0..table.row_count() {
                            if !table.is_live(row) {
                                continue;
                            }
                            if &table.get_value("student_id", row)? == student_id {
                                let course_id = table.get_value("course_id", row)?;
                                if let Some(course) = course_repo.find_by_id_tracking(&course_id, in_progress)? {
                                    record.courses.push(course);
                                }
                            }
                        }
                        Ok(())
                    }),
                },
            },
        ],
        id_field_index: 0,
        id_strategy: IdStrategy::Identity,
        new_instance: Student::default,
        pre_persist: None,
        pre_update: None,
        post_load: None,
    }
}

#[test]
fn a_student_materializes_every_course_it_is_enrolled_in_through_a_join_table() {
    let factory = memris::Factory::default();
    let arena = factory.create_arena();
    let id_gen = factory.id_generator("IDENTITY").unwrap();

    let course_repo = Arc::new(
        RepositoryCore::new(arena.clone(), course_descriptor(), "course", vec![], id_gen.clone()).unwrap(),
    );
    let math = course_repo.save(Course { id: 0, name: "Math".to_string() }).unwrap();
    let science = course_repo.save(Course { id: 0, name: "Science".to_string() }).unwrap();

    let student_repo =
        RepositoryCore::new(arena.clone(), student_descriptor(course_repo.clone()), "student", vec![], id_gen)
            .unwrap();
    let alice = student_repo.save(Student { id: 0, name: "Alice".to_string(), courses: vec![] }).unwrap();

    let enrollment = arena
        .get_or_create_table(
            "enrollment",
            vec![("student_id".to_string(), TypeCode::I64), ("course_id".to_string(), TypeCode::I64)],
        )
        .unwrap();
    enrollment.write().insert(&[Value::I64(alice.id), Value::I64(math.id)]).unwrap();
    enrollment.write().insert(&[Value::I64(alice.id), Value::I64(science.id)]).unwrap();

    let hydrated = student_repo.find_by_id(&Value::I64(alice.id)).unwrap().unwrap();
    let mut names: Vec<&str> = hydrated.courses.iter().map(|c| c.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Math", "Science"]);
}
