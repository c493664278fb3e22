use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::models::SessionRow;

/// The day/week grid starts at this hour.
pub const ANCHOR_HOUR: u32 = 7;
/// Vertical units per hour on the day/week grid.
pub const UNITS_PER_HOUR: f64 = 6.0;
/// Month cells show at most this many chips; the rest collapses into an
/// overflow counter.
pub const MAX_MONTH_CHIPS: usize = 3;

/// Cycled through by first-seen team order within the projected set.
pub const TEAM_COLOR_PALETTE: [&str; 8] = [
    "#1E88E5", "#FF0066", "#43A047", "#FB8C00", "#8E24AA", "#00ACC1", "#F4511E", "#3949AB",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Day,
    Week,
    Month,
}

impl CalendarView {
    pub fn as_str(self) -> &'static str {
        match self {
            CalendarView::Day => "day",
            CalendarView::Week => "week",
            CalendarView::Month => "month",
        }
    }

    pub fn parse(input: Option<&str>) -> CalendarView {
        match input.unwrap_or("week") {
            "day" => CalendarView::Day,
            "month" => CalendarView::Month,
            _ => CalendarView::Week,
        }
    }
}

/// Inclusive date range a view around `date` has to load.
pub fn view_range(view: CalendarView, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        CalendarView::Day => (date, date),
        CalendarView::Week => {
            let start = week_start(date);
            (start, start + Duration::days(6))
        }
        CalendarView::Month => month_grid_range(date),
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(date)
}

/// Monday-aligned grid covering the whole month.
fn month_grid_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = first_of_month(date);
    let last = first_of_next_month(date) - Duration::days(1);
    let grid_start = week_start(first);
    let grid_end = week_start(last) + Duration::days(6);
    (grid_start, grid_end)
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionBlock {
    #[serde(flatten)]
    pub session: SessionRow,
    /// 0 = Monday .. 6 = Sunday within the projected week.
    pub day_index: usize,
    pub offset_units: f64,
    pub height_units: f64,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub is_today: bool,
    pub blocks: Vec<SessionBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionChip {
    pub session_id: String,
    pub team_id: String,
    pub start_time: NaiveTime,
    pub location: Option<String>,
    pub is_cancelled: bool,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct MonthCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub chips: Vec<SessionChip>,
    pub overflow_count: usize,
}

/// Vertical placement of a session on the day/week grid. Anchor 07:00 at
/// six units per hour: 09:00 for 60 minutes sits at offset 12, height 6.
/// Sessions starting before the anchor clamp to the top edge. Overlapping
/// sessions are placed independently; the grid does not re-flow them.
pub fn time_block(start_time: NaiveTime, duration_minutes: i64) -> (f64, f64) {
    let anchor = NaiveTime::from_hms_opt(ANCHOR_HOUR, 0, 0).unwrap_or(start_time);
    let minutes_from_anchor = start_time.signed_duration_since(anchor).num_minutes();
    let offset = (minutes_from_anchor as f64 / 60.0 * UNITS_PER_HOUR).max(0.0);
    let height = duration_minutes.max(0) as f64 / 60.0 * UNITS_PER_HOUR;
    (offset, height)
}

/// First-seen ordinal color per distinct team in the supplied set. The
/// mapping is only stable for this exact set; a differently filtered query
/// may assign different colors to the same team.
pub fn assign_team_colors(sessions: &[SessionRow]) -> HashMap<String, String> {
    let mut colors = HashMap::new();
    let mut next = 0usize;
    for s in sessions {
        if !colors.contains_key(&s.team_id) {
            let color = TEAM_COLOR_PALETTE[next % TEAM_COLOR_PALETTE.len()];
            colors.insert(s.team_id.clone(), color.to_string());
            next += 1;
        }
    }
    colors
}

fn block_for(session: &SessionRow, day_index: usize, colors: &HashMap<String, String>) -> SessionBlock {
    let (offset_units, height_units) = time_block(session.start_time, session.duration_minutes);
    SessionBlock {
        session: session.clone(),
        day_index,
        offset_units,
        height_units,
        color: colors
            .get(&session.team_id)
            .cloned()
            .unwrap_or_else(|| TEAM_COLOR_PALETTE[0].to_string()),
    }
}

pub fn build_day_view(sessions: &[SessionRow], date: NaiveDate, today: NaiveDate) -> DayColumn {
    let colors = assign_team_colors(sessions);
    let day_index = date.weekday().num_days_from_monday() as usize;
    DayColumn {
        date,
        is_today: date == today,
        blocks: sessions
            .iter()
            .filter(|s| s.session_date == date)
            .map(|s| block_for(s, day_index, &colors))
            .collect(),
    }
}

pub fn build_week_view(sessions: &[SessionRow], date: NaiveDate, today: NaiveDate) -> Vec<DayColumn> {
    let colors = assign_team_colors(sessions);
    let start = week_start(date);
    (0..7)
        .map(|i| {
            let day = start + Duration::days(i as i64);
            DayColumn {
                date: day,
                is_today: day == today,
                blocks: sessions
                    .iter()
                    .filter(|s| s.session_date == day)
                    .map(|s| block_for(s, i, &colors))
                    .collect(),
            }
        })
        .collect()
}

pub fn build_month_view(
    sessions: &[SessionRow],
    date: NaiveDate,
    today: NaiveDate,
) -> Vec<MonthCell> {
    let colors = assign_team_colors(sessions);
    let (grid_start, grid_end) = month_grid_range(date);
    let month = date.month();

    let mut by_date: HashMap<NaiveDate, Vec<&SessionRow>> = HashMap::new();
    for s in sessions {
        by_date.entry(s.session_date).or_default().push(s);
    }

    let mut cells = Vec::new();
    let mut cursor = grid_start;
    while cursor <= grid_end {
        let day_sessions = by_date.get(&cursor).map(Vec::as_slice).unwrap_or(&[]);
        let overflow_count = day_sessions.len().saturating_sub(MAX_MONTH_CHIPS);
        let chips = day_sessions
            .iter()
            .take(MAX_MONTH_CHIPS)
            .map(|s| SessionChip {
                session_id: s.session_id.clone(),
                team_id: s.team_id.clone(),
                start_time: s.start_time,
                location: s.location.clone(),
                is_cancelled: s.is_cancelled(),
                color: colors
                    .get(&s.team_id)
                    .cloned()
                    .unwrap_or_else(|| TEAM_COLOR_PALETTE[0].to_string()),
            })
            .collect();

        cells.push(MonthCell {
            date: cursor,
            in_month: cursor.month() == month,
            is_today: cursor == today,
            chips,
            overflow_count,
        });
        cursor += Duration::days(1);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn ts() -> NaiveDateTime {
        d(2026, 3, 2).and_hms_opt(12, 0, 0).unwrap()
    }

    fn session(id: &str, team: &str, date: NaiveDate, start: NaiveTime) -> SessionRow {
        SessionRow {
            session_id: id.to_string(),
            team_id: team.to_string(),
            recurrence_id: None,
            session_date: date,
            start_time: start,
            duration_minutes: 60,
            location: None,
            notes: None,
            is_override: 0,
            is_cancelled: 0,
            cancel_reason: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    #[test]
    fn reference_time_block() {
        // Anchor 07:00, 6 units/hour: 09:00 for 60 minutes.
        assert_eq!(time_block(t(9, 0), 60), (12.0, 6.0));
        assert_eq!(time_block(t(18, 30), 90), (69.0, 9.0));
        // Before the anchor clamps to the top edge.
        assert_eq!(time_block(t(6, 0), 60).0, 0.0);
    }

    #[test]
    fn week_view_places_sessions_by_weekday() {
        // 2026-03-02 is a Monday.
        let sessions = vec![
            session("s1", "t1", d(2026, 3, 2), t(18, 0)),
            session("s2", "t1", d(2026, 3, 4), t(18, 0)),
        ];
        let week = build_week_view(&sessions, d(2026, 3, 5), d(2026, 3, 2));
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, d(2026, 3, 2));
        assert!(week[0].is_today);
        assert_eq!(week[0].blocks.len(), 1);
        assert_eq!(week[0].blocks[0].day_index, 0);
        assert_eq!(week[2].blocks.len(), 1);
        assert_eq!(week[2].blocks[0].day_index, 2);
        assert!(week[1].blocks.is_empty());
    }

    #[test]
    fn overlapping_sessions_are_kept_independent() {
        let sessions = vec![
            session("s1", "t1", d(2026, 3, 2), t(18, 0)),
            session("s2", "t2", d(2026, 3, 2), t(18, 30)),
        ];
        let day = build_day_view(&sessions, d(2026, 3, 2), d(2026, 3, 2));
        assert_eq!(day.blocks.len(), 2);
        // Both keep their own geometry, even though they overlap.
        assert_eq!(day.blocks[0].offset_units, 66.0);
        assert_eq!(day.blocks[1].offset_units, 69.0);
    }

    #[test]
    fn month_view_caps_chips_with_overflow() {
        let date = d(2026, 3, 14);
        let sessions: Vec<SessionRow> = (0..5)
            .map(|i| session(&format!("s{i}"), "t1", date, t(9 + i, 0)))
            .collect();
        let cells = build_month_view(&sessions, d(2026, 3, 1), d(2026, 3, 2));

        let cell = cells.iter().find(|c| c.date == date).unwrap();
        assert_eq!(cell.chips.len(), MAX_MONTH_CHIPS);
        assert_eq!(cell.overflow_count, 2);
        assert!(cell.in_month);

        // Grid is Monday-aligned and covers the whole month.
        assert_eq!(cells.first().unwrap().date.weekday().num_days_from_monday(), 0);
        assert_eq!(cells.len() % 7, 0);
        assert!(!cells.first().unwrap().in_month || cells.first().unwrap().date.day() == 1);
    }

    #[test]
    fn colors_follow_first_seen_team_order() {
        let sessions = vec![
            session("s1", "t2", d(2026, 3, 2), t(9, 0)),
            session("s2", "t1", d(2026, 3, 2), t(10, 0)),
            session("s3", "t2", d(2026, 3, 3), t(9, 0)),
        ];
        let colors = assign_team_colors(&sessions);
        assert_eq!(colors["t2"], TEAM_COLOR_PALETTE[0]);
        assert_eq!(colors["t1"], TEAM_COLOR_PALETTE[1]);

        // Same data filtered differently may recolor: t1 first now.
        let filtered = vec![session("s2", "t1", d(2026, 3, 2), t(10, 0))];
        let colors = assign_team_colors(&filtered);
        assert_eq!(colors["t1"], TEAM_COLOR_PALETTE[0]);
    }

    #[test]
    fn view_ranges() {
        assert_eq!(
            view_range(CalendarView::Day, d(2026, 3, 4)),
            (d(2026, 3, 4), d(2026, 3, 4))
        );
        assert_eq!(
            view_range(CalendarView::Week, d(2026, 3, 4)),
            (d(2026, 3, 2), d(2026, 3, 8))
        );
        // March 2026: the 1st is a Sunday, so the grid starts Monday Feb 23.
        assert_eq!(
            view_range(CalendarView::Month, d(2026, 3, 15)),
            (d(2026, 2, 23), d(2026, 4, 5))
        );
    }
}
