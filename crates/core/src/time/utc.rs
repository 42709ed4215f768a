use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

/// Calendar date (UTC) of an epoch-millisecond timestamp.
///
/// Stored sheets were keyed by UTC dates, so the local timezone of the host must never leak in.
pub fn date_from_millis(timestamp_ms: i64) -> anyhow::Result<NaiveDate> {
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(timestamp_ms)
        .with_context(|| format!("timestamp out of range: {timestamp_ms}"))?;
    Ok(dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_epoch_millis_to_utc_date() {
        // 2021-01-01T00:00:00Z
        let d = date_from_millis(1_609_459_200_000).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
    }

    #[test]
    fn last_millisecond_of_day_stays_on_same_date() {
        // 2021-01-01T23:59:59.999Z, which is already 2021-01-02 in KST.
        let d = date_from_millis(1_609_545_599_999).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
    }

    #[test]
    fn rejects_out_of_range_timestamp() {
        assert!(date_from_millis(i64::MAX).is_err());
    }
}
