use chrono::{NaiveTime, Timelike};
use database_layer::models::Shift;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// An uncovered interval of a weekday, expressed as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Gap {
    pub start_minute: i32,
    pub end_minute: i32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct WeekdayGaps {
    pub weekday: i16,
    pub gaps: Vec<Gap>,
}

fn minute_of(t: NaiveTime) -> i32 {
    (t.num_seconds_from_midnight() / 60) as i32
}

/// Projects every active shift onto `[00:00, 24:00)` per weekday, with
/// night shifts splitting across the day boundary, and reports the
/// complement against the full 24h as the gap set (§4.3: "Coverage
/// analysis (offline)").
pub fn weekly_gaps(shifts: &[Shift]) -> [WeekdayGaps; 7] {
    std::array::from_fn(|weekday| {
        let weekday = weekday as i16;
        let mut intervals = Vec::new();

        for shift in shifts.iter().filter(|s| s.is_active) {
            let prior_weekday = (weekday + 6) % 7;
            if shift.weekday == weekday {
                if shift.is_night_shift() {
                    intervals.push((minute_of(shift.start_time), MINUTES_PER_DAY));
                } else {
                    intervals.push((minute_of(shift.start_time), minute_of(shift.end_time)));
                }
            } else if shift.weekday == prior_weekday && shift.is_night_shift() {
                intervals.push((0, minute_of(shift.end_time)));
            }
        }

        WeekdayGaps { weekday, gaps: complement(intervals) }
    })
}

/// Merges overlapping/adjacent covered intervals, then returns the gaps
/// between them within `[0, MINUTES_PER_DAY)`.
fn complement(mut intervals: Vec<(i32, i32)>) -> Vec<Gap> {
    intervals.sort_unstable_by_key(|(start, _)| *start);

    let mut merged: Vec<(i32, i32)> = Vec::new();
    for (start, end) in intervals {
        if start >= end {
            continue;
        }
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => {
                *last_end = (*last_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }

    let mut gaps = Vec::new();
    let mut cursor = 0;
    for (start, end) in merged {
        if start > cursor {
            gaps.push(Gap { start_minute: cursor, end_minute: start });
        }
        cursor = cursor.max(end);
    }
    if cursor < MINUTES_PER_DAY {
        gaps.push(Gap { start_minute: cursor, end_minute: MINUTES_PER_DAY });
    }
    gaps
}
