use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Month 1-12 and day 1-31, one or two digits each. Deliberately no
    // calendar-correctness check: "2021-02-30" passes this gate.
    static ref DATE_PATTERN: Regex =
        Regex::new(r"^\d{4}-(0?[1-9]|1[012])-(0?[1-9]|[12][0-9]|3[01])$").unwrap();
}

/// Structural gate for incoming date strings. Failing this pattern is a
/// protocol-level bad request, not a numbered domain rejection.
pub fn is_valid_date_format(value: &str) -> bool {
    DATE_PATTERN.is_match(value)
}
