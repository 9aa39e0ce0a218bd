//! Generated OpenAPI description of the HTTP surface.
//!
//! Component schemas come from the `JsonSchema` derives on the directory types, so field
//! constraints (length, range, pattern) stay in one place. The health endpoint is left out.

use crate::api::ErrorBody;
use crate::directory::{NewStudent, Student, StudentPatch};
use schemars::r#gen::SchemaSettings;
use serde_json::{Value, json};

/// Title advertised in the API description.
pub const API_TITLE: &str = "Student Management API";
/// Summary advertised in the API description.
pub const API_DESCRIPTION: &str = "API for managing student records";

/// Build the OpenAPI 3.0 document for the student routes.
pub fn document() -> Value {
    let mut generator = SchemaSettings::openapi3().into_generator();
    let student = generator.subschema_for::<Student>();
    let new_student = generator.subschema_for::<NewStudent>();
    let patch = generator.subschema_for::<StudentPatch>();
    let error = generator.subschema_for::<ErrorBody>();
    let schemas = generator.take_definitions();

    let students = json!({ "type": "array", "items": student });
    let id_param = json!({
        "name": "student_id",
        "in": "path",
        "required": true,
        "description": "Student ID",
        "schema": { "type": "string" }
    });
    let not_found = response("Student not found", &error);
    let invalid = response("Validation error", &error);

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": API_TITLE,
            "description": API_DESCRIPTION,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/students": {
                "get": {
                    "summary": "Get all students",
                    "operationId": "get_all_students",
                    "tags": ["Students"],
                    "responses": { "200": response("Successful Response", &students) }
                },
                "post": {
                    "summary": "Create new student",
                    "operationId": "create_student",
                    "tags": ["Students"],
                    "requestBody": request_body(&new_student),
                    "responses": {
                        "201": response("Successful Response", &student),
                        "409": response("Student ID already exists", &error),
                        "422": invalid,
                    }
                }
            },
            "/students/{student_id}": {
                "get": {
                    "summary": "Get student by ID",
                    "operationId": "get_student",
                    "tags": ["Students"],
                    "parameters": [id_param],
                    "responses": {
                        "200": response("Successful Response", &student),
                        "404": not_found,
                    }
                },
                "patch": {
                    "summary": "Update student information",
                    "operationId": "update_student",
                    "tags": ["Students"],
                    "parameters": [id_param],
                    "requestBody": request_body(&patch),
                    "responses": {
                        "200": response("Successful Response", &student),
                        "404": not_found,
                        "422": invalid,
                    }
                },
                "delete": {
                    "summary": "Delete a student",
                    "operationId": "delete_student",
                    "tags": ["Students"],
                    "parameters": [id_param],
                    "responses": {
                        "204": { "description": "Successful Response" },
                        "404": not_found,
                    }
                }
            },
            "/students/search/by-name": {
                "get": {
                    "summary": "Search students by name",
                    "operationId": "get_student_by_name",
                    "tags": ["Students", "Search"],
                    "parameters": [{
                        "name": "name",
                        "in": "query",
                        "required": true,
                        "description": "Student name to search",
                        "schema": { "type": "string", "minLength": 2 }
                    }],
                    "responses": {
                        "200": response("Successful Response", &students),
                        "404": response("No matching students", &error),
                        "422": invalid,
                    }
                }
            }
        },
        "components": { "schemas": schemas },
    })
}

fn response(description: &str, schema: &impl serde::Serialize) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn request_body(schema: &impl serde::Serialize) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema } }
    })
}
