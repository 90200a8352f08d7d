use chrono::{Duration, NaiveDateTime};

/// A repeating wall-clock timer checked by the event loop tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    period: Duration,
    next_due: NaiveDateTime,
}

/// A period too long for the calendar never comes due.
fn after(now: NaiveDateTime, period: Duration) -> NaiveDateTime {
    now.checked_add_signed(period).unwrap_or(NaiveDateTime::MAX)
}

impl Interval {
    /// First fires one full period after `now`.
    pub fn new(period: Duration, now: NaiveDateTime) -> Self {
        Self {
            period,
            next_due: after(now, period),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// True at most once per call when the period has elapsed. Ticks missed
    /// while the process was suspended collapse into a single firing.
    pub fn due(&mut self, now: NaiveDateTime) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = after(now, self.period);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::seconds(secs)
    }

    #[test]
    fn fires_once_per_period() {
        let mut iv = Interval::new(Duration::seconds(60), at(0));
        assert!(!iv.due(at(59)));
        assert!(iv.due(at(60)));
        assert!(!iv.due(at(61)));
        assert!(iv.due(at(120)));
    }

    #[test]
    fn period_past_the_calendar_never_fires() {
        let mut iv = Interval::new(Duration::hours(u32::MAX as i64), at(0));
        assert!(!iv.due(at(86_400 * 365 * 100)));
    }

    #[test]
    fn long_gap_fires_once() {
        let mut iv = Interval::new(Duration::seconds(60), at(0));
        assert!(iv.due(at(3600)));
        assert!(!iv.due(at(3601)));
    }
}
