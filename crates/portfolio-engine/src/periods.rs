use chrono::{Datelike, NaiveDate};

/// Bucket sorted observation dates into rebalancing periods of `months`
/// calendar months anchored at `anchor`. Returns the index of the last
/// observation in each bucket; those observations stamp the period-end dates.
pub fn period_end_indices(dates: &[NaiveDate], anchor: NaiveDate, months: u32) -> Vec<usize> {
    if dates.is_empty() {
        return Vec::new();
    }
    let months = months.max(1) as i64;

    let bucket_of = |d: NaiveDate| -> i64 {
        let elapsed = (d.year() as i64 - anchor.year() as i64) * 12
            + (d.month() as i64 - anchor.month() as i64);
        elapsed.div_euclid(months)
    };

    let mut ends = Vec::new();
    let mut current_bucket = bucket_of(dates[0]);
    for (i, &d) in dates.iter().enumerate().skip(1) {
        let bucket = bucket_of(d);
        if bucket != current_bucket {
            ends.push(i - 1);
            current_bucket = bucket;
        }
    }
    ends.push(dates.len() - 1);
    ends
}
