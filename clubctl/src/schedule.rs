//! Bulk class-schedule expansion.
//!
//! Staff describe a recurrence rule once (days of the week, a daily time
//! window, a slot length) and the generator expands it into the concrete
//! weekly slots that become `programmed_classes` rows.

use chrono::NaiveTime;

/// One generated weekly slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSlot {
    /// 0 = Monday through 6 = Sunday
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
}

/// Expand a recurrence rule into concrete slots.
///
/// For every requested day, slots are laid out from `window_start` stepping
/// by `slot_minutes`; a slot that would end after `window_end` is not
/// emitted. Duplicate days are collapsed, out-of-range days ignored, and
/// the output is ordered by (day, start time).
pub fn expand_slots(days_of_week: &[i16], window_start: NaiveTime, window_end: NaiveTime, slot_minutes: i32) -> Vec<ClassSlot> {
    if slot_minutes <= 0 || window_end <= window_start {
        return Vec::new();
    }

    let mut days: Vec<i16> = days_of_week.iter().copied().filter(|d| (0..=6).contains(d)).collect();
    days.sort_unstable();
    days.dedup();

    let window_start_min = minutes_of_day(window_start);
    let window_end_min = minutes_of_day(window_end);

    let mut slots = Vec::new();
    for day in days {
        let mut start = window_start_min;
        while start + slot_minutes as u32 <= window_end_min {
            slots.push(ClassSlot {
                day_of_week: day,
                start_time: time_from_minutes(start),
                duration_minutes: slot_minutes,
            });
            start += slot_minutes as u32;
        }
    }

    slots
}

fn minutes_of_day(time: NaiveTime) -> u32 {
    use chrono::Timelike;
    time.hour() * 60 + time.minute()
}

fn time_from_minutes(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).expect("minutes_of_day stays below 24h")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_expands_days_times_slots() {
        // Mon + Wed, 17:00-20:00, 60 minute slots -> 2 days x 3 slots
        let slots = expand_slots(&[0, 2], at(17, 0), at(20, 0), 60);

        assert_eq!(slots.len(), 6);
        assert_eq!(
            slots[0],
            ClassSlot {
                day_of_week: 0,
                start_time: at(17, 0),
                duration_minutes: 60
            }
        );
        assert_eq!(slots[2].start_time, at(19, 0));
        assert_eq!(slots[3].day_of_week, 2);
    }

    #[test]
    fn test_no_slot_overruns_window() {
        // 90 minute slots in a 17:00-20:00 window: 17:00 and 18:30 fit, a
        // third slot would end at 21:30 and must not be emitted.
        let slots = expand_slots(&[4], at(17, 0), at(20, 0), 90);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].start_time, at(18, 30));
    }

    #[test]
    fn test_duplicate_and_invalid_days_collapse() {
        let slots = expand_slots(&[1, 1, 9, -1, 1], at(10, 0), at(11, 0), 30);

        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.day_of_week == 1));
    }

    #[test]
    fn test_empty_window_yields_nothing() {
        assert!(expand_slots(&[0], at(18, 0), at(18, 0), 60).is_empty());
        assert!(expand_slots(&[0], at(18, 0), at(17, 0), 60).is_empty());
        assert!(expand_slots(&[0], at(9, 0), at(17, 0), 0).is_empty());
    }

    #[test]
    fn test_slot_exactly_filling_window() {
        let slots = expand_slots(&[5], at(9, 0), at(10, 0), 60);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start_time, at(9, 0));
    }
}
