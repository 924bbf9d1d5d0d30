use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, NaiveTime, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Opening hours a store configures for itself, in the store's local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub open_days: Vec<Weekday>,
    pub opens_at: NaiveTime,
    /// When not after `opens_at`, the store closes on the following day.
    pub closes_at: NaiveTime,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            open_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            opens_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            closes_at: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            utc_offset_minutes: 0,
        }
    }
}

impl WeeklySchedule {
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let offset =
            FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
        self.is_open_at(now.with_timezone(&offset).naive_local())
    }

    pub fn is_open_at(&self, local: NaiveDateTime) -> bool {
        let day = local.weekday();
        let time = local.time();
        if self.opens_at < self.closes_at {
            return self.open_days.contains(&day) && time >= self.opens_at && time < self.closes_at;
        }
        let started_today = self.open_days.contains(&day) && time >= self.opens_at;
        let carried_over = self.open_days.contains(&day.pred()) && time < self.closes_at;
        started_today || carried_over
    }

    /// Human-readable form, e.g. "Lunes a Sábado • 9:00 AM - 6:00 PM".
    pub fn describe(&self) -> String {
        format!(
            "{} • {} - {}",
            self.describe_days(),
            self.opens_at.format("%-I:%M %p"),
            self.closes_at.format("%-I:%M %p")
        )
    }

    fn describe_days(&self) -> String {
        let mut days = self.open_days.clone();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        match days.as_slice() {
            [] => "Cerrado".to_string(),
            [single] => day_name(*single).to_string(),
            [first, .., last]
                if last.num_days_from_monday() - first.num_days_from_monday() + 1
                    == days.len() as u32 =>
            {
                format!("{} a {}", day_name(*first), day_name(*last))
            }
            _ => days
                .iter()
                .map(|d| day_name(*d))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid datetime")
    }

    #[test]
    fn default_schedule_is_monday_to_saturday_nine_to_six() {
        let schedule = WeeklySchedule::default();
        // 2024-02-19 is a Monday.
        assert!(schedule.is_open_at(at(2024, 2, 19, 9, 0)));
        assert!(schedule.is_open_at(at(2024, 2, 24, 17, 59)));
        assert!(!schedule.is_open_at(at(2024, 2, 19, 18, 0)));
        assert!(!schedule.is_open_at(at(2024, 2, 25, 12, 0)));
        assert_eq!(schedule.describe(), "Lunes a Sábado • 9:00 AM - 6:00 PM");
    }

    #[test]
    fn honours_the_store_configured_days() {
        let schedule = WeeklySchedule {
            open_days: vec![Weekday::Sun, Weekday::Wed],
            opens_at: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
            closes_at: NaiveTime::from_hms_opt(14, 0, 0).expect("time"),
            utc_offset_minutes: 0,
        };
        assert!(schedule.is_open_at(at(2024, 2, 25, 11, 0)));
        assert!(!schedule.is_open_at(at(2024, 2, 19, 11, 0)));
        assert_eq!(schedule.describe_days(), "Miércoles, Domingo");
    }

    #[test]
    fn overnight_hours_carry_into_next_day() {
        let schedule = WeeklySchedule {
            open_days: vec![Weekday::Fri],
            opens_at: NaiveTime::from_hms_opt(20, 0, 0).expect("time"),
            closes_at: NaiveTime::from_hms_opt(2, 0, 0).expect("time"),
            utc_offset_minutes: 0,
        };
        assert!(schedule.is_open_at(at(2024, 2, 23, 23, 0)));
        assert!(schedule.is_open_at(at(2024, 2, 24, 1, 30)));
        assert!(!schedule.is_open_at(at(2024, 2, 24, 3, 0)));
    }

    #[test]
    fn applies_store_utc_offset() {
        let schedule = WeeklySchedule {
            utc_offset_minutes: -6 * 60,
            ..WeeklySchedule::default()
        };
        // 16:30 UTC on a Monday is 10:30 local.
        let now = Utc.with_ymd_and_hms(2024, 2, 19, 16, 30, 0).single().expect("utc");
        assert!(schedule.is_open(now));
        // 02:00 UTC Tuesday is still 20:00 Monday local.
        let late = Utc.with_ymd_and_hms(2024, 2, 20, 2, 0, 0).single().expect("utc");
        assert!(!schedule.is_open(late));
    }
}
