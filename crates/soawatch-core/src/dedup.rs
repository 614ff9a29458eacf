//! Duplicate-announcement predicate.

use chrono::{DateTime, Utc};

use crate::types::ZoneCheckRecord;

/// Returns true if `serial` was already recorded as a change at or after `since`.
#[must_use]
pub fn already_announced(records: &[ZoneCheckRecord], serial: u32, since: DateTime<Utc>) -> bool {
    records
        .iter()
        .any(|r| r.is_change && r.checked_at >= since && r.serial == Some(serial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(serial: u32, is_change: bool, at: DateTime<Utc>) -> ZoneCheckRecord {
        let mut record = ZoneCheckRecord::new("z1", at).with_soa(None, Some(serial));
        record.is_change = is_change;
        record
    }

    #[test]
    fn same_serial_inside_window() {
        let now = Utc::now();
        let since = now - Duration::minutes(15);
        let records = vec![record(6, true, now - Duration::minutes(3))];
        assert!(already_announced(&records, 6, since));
        assert!(!already_announced(&records, 7, since));
    }

    #[test]
    fn outside_window_or_not_a_change() {
        let now = Utc::now();
        let since = now - Duration::minutes(15);
        let records = vec![
            record(6, true, now - Duration::minutes(16)),
            record(6, false, now - Duration::minutes(1)),
        ];
        assert!(!already_announced(&records, 6, since));
    }
}
