use datafos::db::SearchResult;

/// Asserts that a search returned exactly `expected`, in any order
pub fn assert_matches(result: &SearchResult, expected: &[i64], context: &str) {
    let mut actual = result.record_ids();
    actual.sort_unstable();
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(actual, expected, "{}: unexpected records", context);
    assert_eq!(
        result.total_count,
        expected.len() as i64,
        "{}: unexpected total count",
        context
    );
}

/// Asserts that a search returned exactly `expected`, in that order
pub fn assert_ordered(result: &SearchResult, expected: &[i64], context: &str) {
    assert_eq!(result.record_ids(), expected, "{}: unexpected order", context);
}

/// Asserts that each needle occurs in `haystack`, in the given order
pub fn assert_contains_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match haystack[from..].find(needle) {
            Some(pos) => from += pos + needle.len(),
            None => panic!(
                "expected {:?} after byte {} in output:\n{}",
                needle, from, haystack
            ),
        }
    }
}
