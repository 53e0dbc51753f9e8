use std::fs;

use toolkit_cli::calc::{Calculator, CalculatorError, EvalError, Number};

#[test]
fn evaluates_and_records_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");
    let mut calc = Calculator::open(&path);

    assert_eq!(calc.evaluate("2+3").unwrap(), Number::from(5_i64));
    assert_eq!(calc.evaluate("min(10, round(3.6))").unwrap(), Number::from(4_i64));
    assert_eq!(calc.evaluate("1/4").unwrap(), Number::Float(0.25));

    let last = &calc.recent(1)[0];
    assert_eq!(last.expression, "1/4");
    assert_eq!(last.result, Some(Number::Float(0.25)));
    assert_eq!(calc.recent(10).len(), 3);
    assert!(calc.recent(0).is_empty());

    let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        on_disk,
        serde_json::json!([["2+3", 5], ["min(10, round(3.6))", 4], ["1/4", 0.25]])
    );
}

#[test]
fn failures_leave_history_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");
    let mut calc = Calculator::open(&path);
    calc.evaluate("1+1").unwrap();

    let unsafe_name = calc.evaluate("__import__('os').system('ls')").unwrap_err();
    assert!(matches!(
        unsafe_name,
        CalculatorError::Eval(EvalError::UnsafeName { ref name }) if name == "__import__"
    ));
    assert!(matches!(
        calc.evaluate("1/0"),
        Err(CalculatorError::Eval(EvalError::Evaluation(_)))
    ));
    assert!(matches!(
        calc.evaluate("2 +"),
        Err(CalculatorError::Eval(EvalError::Syntax { .. }))
    ));

    assert_eq!(calc.history().len(), 1);
    assert_eq!(Calculator::open(&path).recent(10).len(), 1);
}

#[test]
fn history_survives_reopen_and_stores_non_finite_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");
    {
        let mut calc = Calculator::open(&path);
        calc.evaluate("sqrt(16)").unwrap();
        assert!(calc.evaluate("inf").unwrap().as_f64().unwrap().is_infinite());
    }
    let calc = Calculator::open(&path);
    let entries = calc.recent(5);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].expression, "sqrt(16)");
    assert_eq!(entries[0].result, Some(Number::Float(4.0)));
    assert_eq!(entries[1].expression, "inf");
    assert_eq!(entries[1].result, None);
}

#[test]
fn corrupt_history_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");
    fs::write(&path, "not json at all").unwrap();

    let mut calc = Calculator::open(&path);
    assert!(calc.recent(10).is_empty());
    calc.evaluate("7 // 2").unwrap();

    let reopened = Calculator::open(&path);
    assert_eq!(reopened.recent(10).len(), 1);
    assert_eq!(reopened.recent(1)[0].result, Some(Number::from(3_i64)));
}

#[test]
fn failed_save_keeps_the_entry_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("h.json");
    let mut calc = Calculator::open(&path);

    assert!(matches!(calc.evaluate("1+1"), Err(CalculatorError::Storage(_))));
    let last = &calc.recent(1)[0];
    assert_eq!(last.expression, "1+1");
    assert_eq!(last.result, Some(Number::from(2_i64)));
    assert!(!path.exists());
}

#[test]
fn large_integers_are_exact_and_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");
    let mut calc = Calculator::open(&path);

    let value = calc.evaluate("2**64 - 1").unwrap();
    assert_eq!(value.to_string(), "18446744073709551615");
    assert_eq!(calc.evaluate("factorial(25)").unwrap().to_string(), "15511210043330985984000000");

    let reopened = Calculator::open(&path);
    assert_eq!(reopened.recent(2)[0].result, Some(value));
}
