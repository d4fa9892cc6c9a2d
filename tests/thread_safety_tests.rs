mod common;

use common::payroll_cube;
use duststat_core::{AggregateFunction, Axis, DataCube, Selection, SharedCube, VisitOptions};
use std::thread;

#[test]
fn test_concurrent_increments_are_not_lost() {
    let shared = SharedCube::new(
        DataCube::numeric("hits", vec![Axis::new("Worker"), Axis::new("Bucket")]).unwrap(),
    );
    let threads = 8;
    let rounds = 250;

    let handles: Vec<_> = (0..threads)
        .map(|worker| {
            let shared = shared.clone();
            thread::spawn(move || {
                for round in 0..rounds {
                    let bucket = if round % 2 == 0 { "even" } else { "odd" };
                    shared.with_write(|cube| {
                        let mut cursor = cube.cursor();
                        cursor
                            .set_coordinate("Worker", &format!("w{}", worker % 2))
                            .unwrap()
                            .set_coordinate("Bucket", bucket)
                            .unwrap();
                        cursor.increment_value_with(1.0).unwrap();
                    });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let total = shared
        .with_read(|cube| cube.aggregate(AggregateFunction::Sum, &Selection::all()))
        .unwrap();
    assert_eq!(total, Some((threads * rounds) as f64));

    let cube = shared.try_unwrap().expect("all handles joined");
    assert_eq!(cube.len(), 4);
}

#[test]
fn test_readers_see_consistent_snapshots() {
    let shared = SharedCube::from(payroll_cube());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                let guard = shared.read();
                let visited = guard.visit(&VisitOptions::new()).unwrap().count();
                let counted = guard
                    .aggregate(AggregateFunction::Count, &Selection::all())
                    .unwrap();
                (visited, counted)
            })
        })
        .collect();

    shared.with_write(|cube| {
        cube.delete_value(&["2023", "HR"]).unwrap();
    });

    for reader in readers {
        let (visited, counted) = reader.join().unwrap();
        // each reader sees either the full cube or the cube after deletion
        assert!(visited == 4 || visited == 3);
        assert_eq!(counted, Some(visited as f64));
    }
}

#[test]
fn test_try_unwrap_fails_while_shared() {
    let shared = SharedCube::from(payroll_cube());
    let other = shared.clone();
    let shared = shared.try_unwrap().unwrap_err();
    drop(other);
    assert!(shared.try_unwrap().is_ok());
}
