use swingforge::models::summary::{BatchSummary, ErrorList, DEFAULT_ERROR_CAP};

#[test]
fn default_error_list_stores_errors_up_to_the_standard_cap() {
    let mut errors = ErrorList::default();
    for i in 0..DEFAULT_ERROR_CAP + 3 {
        errors.push(format!("error {}", i));
    }
    assert_eq!(errors.errors.len(), DEFAULT_ERROR_CAP);
    assert_eq!(errors.truncated, 3);
    assert_eq!(errors.total(), (DEFAULT_ERROR_CAP + 3) as u32);
}

#[test]
fn default_batch_summary_accepts_errors() {
    let mut summary = BatchSummary::default();
    summary.errors.push("quote fetch failed");
    assert_eq!(summary.errors.errors.len(), 1);
    assert_eq!(summary.errors.truncated, 0);
}

#[test]
fn explicit_cap_bounds_the_list() {
    let mut errors = ErrorList::with_cap(2);
    errors.push("a");
    errors.push("b");
    errors.push("c");
    assert_eq!(errors.errors, vec!["a", "b"]);
    assert_eq!(errors.truncated, 1);
    assert_eq!(errors.total(), 3);
}
