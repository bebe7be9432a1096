use analysis_core::Frequency;
use chrono::NaiveDate;

/// Result of the date-range validity check. A `Rejected` outcome carries the
/// numbered error code delivered to clients and always terminates the request
/// before any data retrieval happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Ok,
    Rejected { code: u8, message: String },
}

impl ValidationOutcome {
    fn rejected(code: u8, message: impl Into<String>) -> Self {
        ValidationOutcome::Rejected {
            code,
            message: message.into(),
        }
    }
}

/// Classify a requested interval against the frequency-specific bounds.
///
/// Checks run in a fixed order and the first hit returns immediately:
/// inverted range (code 1), then too-long (codes 2-4), then too-short
/// (codes 5-7). Bounds are inclusive on both ends. Frequencies outside the
/// constrained set carry no length constraint at all.
///
/// | frequency | min days | max days | too short | too long |
/// |-----------|----------|----------|-----------|----------|
/// | monthly   | 120      | 731      | 5         | 2        |
/// | quarterly | 365      | 1461     | 6         | 3        |
/// | biannual  | 731      | 2922     | 7         | 4        |
pub fn validate_date_range(
    frequency: Frequency,
    start: NaiveDate,
    end: NaiveDate,
) -> ValidationOutcome {
    if start >= end {
        return ValidationOutcome::rejected(1, "Inverted Date Range");
    }

    let (min_days, max_days, short_code, long_code, label, span) = match frequency {
        Frequency::Monthly => (120, 731, 5, 2, "monthly", "4 months and 2 years"),
        Frequency::Quarterly => (365, 1461, 6, 3, "quarterly", "1 year and 4 years"),
        Frequency::Biannual => (731, 2922, 7, 4, "biannual", "2 year and 8 years"),
        Frequency::Unconstrained => return ValidationOutcome::Ok,
    };

    let days = (end - start).num_days();

    if days > max_days {
        return ValidationOutcome::rejected(
            long_code,
            format!(
                "Too long of a date range ({}). Please enter a range interval between {}",
                label, span
            ),
        );
    }

    if days < min_days {
        return ValidationOutcome::rejected(
            short_code,
            format!(
                "Too short of a date range ({}). Please enter a range interval between {}",
                label, span
            ),
        );
    }

    ValidationOutcome::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn code_for(frequency: Frequency, start: NaiveDate, days: i64) -> Option<u8> {
        match validate_date_range(frequency, start, start + Duration::days(days)) {
            ValidationOutcome::Ok => None,
            ValidationOutcome::Rejected { code, .. } => Some(code),
        }
    }

    #[test]
    fn test_inverted_range_is_code_1_for_every_frequency() {
        let start = date(2021, 6, 1);
        for frequency in [
            Frequency::Monthly,
            Frequency::Quarterly,
            Frequency::Biannual,
            Frequency::Unconstrained,
        ] {
            assert_eq!(code_for(frequency, start, 0), Some(1));
            assert_eq!(code_for(frequency, start, -30), Some(1));
        }
    }

    #[test]
    fn test_monthly_boundaries_inclusive() {
        let start = date(2019, 1, 1);
        assert_eq!(code_for(Frequency::Monthly, start, 119), Some(5));
        assert_eq!(code_for(Frequency::Monthly, start, 120), None);
        assert_eq!(code_for(Frequency::Monthly, start, 731), None);
        assert_eq!(code_for(Frequency::Monthly, start, 732), Some(2));
    }

    #[test]
    fn test_quarterly_boundaries_inclusive() {
        let start = date(2017, 3, 15);
        assert_eq!(code_for(Frequency::Quarterly, start, 364), Some(6));
        assert_eq!(code_for(Frequency::Quarterly, start, 365), None);
        assert_eq!(code_for(Frequency::Quarterly, start, 1461), None);
        assert_eq!(code_for(Frequency::Quarterly, start, 1462), Some(3));
    }

    #[test]
    fn test_biannual_boundaries_inclusive() {
        let start = date(2012, 7, 2);
        assert_eq!(code_for(Frequency::Biannual, start, 730), Some(7));
        assert_eq!(code_for(Frequency::Biannual, start, 731), None);
        assert_eq!(code_for(Frequency::Biannual, start, 2922), None);
        assert_eq!(code_for(Frequency::Biannual, start, 2923), Some(4));
    }

    #[test]
    fn test_unconstrained_bypasses_length_checks() {
        let start = date(2000, 1, 1);
        // Far too short and far too long for any constrained cadence.
        assert_eq!(code_for(Frequency::Unconstrained, start, 1), None);
        assert_eq!(code_for(Frequency::Unconstrained, start, 10_000), None);
    }

    #[test]
    fn test_rejection_messages_match_contract() {
        let start = date(2020, 1, 1);
        match validate_date_range(Frequency::Monthly, start, start + Duration::days(900)) {
            ValidationOutcome::Rejected { code, message } => {
                assert_eq!(code, 2);
                assert_eq!(
                    message,
                    "Too long of a date range (monthly). Please enter a range interval between 4 months and 2 years"
                );
            }
            ValidationOutcome::Ok => panic!("expected rejection"),
        }
        match validate_date_range(Frequency::Biannual, start, start + Duration::days(100)) {
            ValidationOutcome::Rejected { code, message } => {
                assert_eq!(code, 7);
                assert_eq!(
                    message,
                    "Too short of a date range (biannual). Please enter a range interval between 2 year and 8 years"
                );
            }
            ValidationOutcome::Ok => panic!("expected rejection"),
        }
    }
}
