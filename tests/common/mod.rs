//! Shared fixtures for integration tests.

#![allow(dead_code)]

use duststat_core::{Axis, DataCube, Record};
use serde_json::json;

/// Numeric payroll cube over Year x Department with all four cells set.
pub fn payroll_cube() -> DataCube {
    let mut cube = DataCube::numeric(
        "payroll",
        vec![Axis::new("Year"), Axis::new("Department")],
    )
    .unwrap();
    for (year, dept, amount) in [
        ("2023", "HR", 25000.0),
        ("2023", "IT", 40000.0),
        ("2024", "HR", 35000.0),
        ("2024", "IT", 30000.0),
    ] {
        set_number(&mut cube, year, dept, amount);
    }
    cube
}

pub fn set_number(cube: &mut DataCube, year: &str, dept: &str, amount: f64) {
    let mut cursor = cube.cursor();
    cursor
        .set_coordinate("Year", year)
        .unwrap()
        .set_coordinate("Department", dept)
        .unwrap();
    cursor.set_value(amount).unwrap();
}

pub fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().expect("fixture must be a JSON object")
}

/// Structured staff cube over Team x Role, with axis and cube metadata.
pub fn staff_cube() -> DataCube {
    let mut cube = DataCube::structured("staff", vec![Axis::new("Team"), Axis::new("Role")]).unwrap();
    for (team, role, body) in [
        ("Core", "Lead", json!({"name": "Ada", "salary": 91000, "remote": false})),
        ("Core", "Engineer", json!({"name": "Linus", "salary": 78000, "remote": true})),
        ("Edge", "Engineer", json!({"name": "Grace", "salary": 80500, "remote": true})),
    ] {
        let mut cursor = cube.cursor();
        cursor
            .set_coordinate("Team", team)
            .unwrap()
            .set_coordinate("Role", role)
            .unwrap();
        cursor.set_value(record(body)).unwrap();
    }
    cube.set_category_metadata("Team", "Core", "color", "#1f77b4").unwrap();
    cube.set_category_metadata("Team", "Edge", "color", "#ff7f0e").unwrap();
    cube.set_category_metadata("Team", "Edge", "order", 2).unwrap();
    cube.set_metadata("source", "hr-export");
    cube
}

/// Collect a traversal as (labels, number) pairs.
pub fn numbers(visit: duststat_core::Visit<'_>) -> Vec<(Vec<String>, f64)> {
    visit
        .map(|(coordinate, value)| (coordinate, value.as_number().unwrap()))
        .collect()
}

pub fn labels(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
