//! Concurrent evaluation against one shared `Compiler`.

mod common;

use std::thread;

use common::empty_compiler;
use exprbox::ExprError;

#[test]
fn test_concurrent_calls_are_independent() {
    let compiler = empty_compiler();

    let results: Vec<(i64, Result<i64, ExprError>)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8i64)
            .map(|n| {
                let compiler = &compiler;
                scope.spawn(move || (n, compiler.evaluate::<i64>(&format!("{n} * {n} + 1"))))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("evaluation thread panicked"))
            .collect()
    });

    for (n, result) in results {
        assert_eq!(result.unwrap(), n * n + 1);
    }
}

#[test]
fn test_concurrent_failures_do_not_interfere() {
    let compiler = empty_compiler();

    thread::scope(|scope| {
        let good = scope.spawn(|| compiler.evaluate::<String>(r#""ok".to_string()"#));
        let bad = scope.spawn(|| compiler.evaluate::<String>("ok +"));
        let panicking = scope.spawn(|| compiler.evaluate::<String>(r#"panic!("late")"#));

        assert_eq!(good.join().unwrap().unwrap(), "ok");
        assert!(bad.join().unwrap().unwrap_err().is_invalid_expression());
        assert!(matches!(
            panicking.join().unwrap().unwrap_err(),
            ExprError::Panicked { .. }
        ));
    });
}
