//! Countdown, age and day-difference arithmetic against "now".
//!
//! Month and year figures use flat 30 and 365 day buckets.

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Action;
use crate::input::TextField;
use crate::ui::{self, BURGUNDY, COPPER, OLIVE, PALE_YELLOW, SAPPHIRE, TEXT_MUTED, TEXT_PRIMARY};

const DAY_MS: i64 = 86_400_000;
const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;

pub const HINTS: &[(&str, &str)] = &[
    ("←→", "mode"),
    ("t/m/w/n", "quick date"),
    ("Enter", "calculate"),
    ("Esc", "home"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Countdown,
    Age,
    Difference,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Countdown, Mode::Age, Mode::Difference];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Countdown => "Countdown",
            Mode::Age => "Age",
            Mode::Difference => "Difference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateResult {
    /// Calendar buckets are only filled in for future dates.
    Countdown {
        days: i64,
        weeks: i64,
        months: i64,
        years: i64,
        is_today: bool,
        is_past: bool,
    },
    Age {
        days: i64,
        months: i64,
        years: i64,
        hours: i64,
        minutes: i64,
    },
    Difference {
        days: i64,
        weeks: i64,
        months: i64,
        years: i64,
    },
}

/// `date` is taken at midnight UTC.
pub fn compute(mode: Mode, date: NaiveDate, now: DateTime<Utc>) -> DateResult {
    let target_ms = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    let now_ms = now.timestamp_millis();

    match mode {
        Mode::Countdown => {
            let days = (target_ms - now_ms) as f64 / DAY_MS as f64;
            // `as` maps -0.0 to 0, so a date later today counts as today
            let days = days.ceil() as i64;
            let (weeks, months, years) = if days > 0 {
                (days / 7, days / 30, days / 365)
            } else {
                (0, 0, 0)
            };
            DateResult::Countdown {
                days,
                weeks,
                months,
                years,
                is_today: days == 0,
                is_past: days < 0,
            }
        }
        Mode::Age => {
            let ms = now_ms - target_ms;
            let days = ms.div_euclid(DAY_MS);
            DateResult::Age {
                days,
                months: days.div_euclid(30),
                years: days.div_euclid(365),
                hours: ms.div_euclid(HOUR_MS),
                minutes: ms.div_euclid(MINUTE_MS),
            }
        }
        Mode::Difference => {
            let days = (target_ms - now_ms).abs() / DAY_MS;
            DateResult::Difference {
                days,
                weeks: days / 7,
                months: days / 30,
                years: days / 365,
            }
        }
    }
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// e.g. "Saturday, March 14, 2026"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Today, tomorrow, in a week, in a calendar month (clamped to month end).
pub fn quick_dates(today: NaiveDate) -> [(&'static str, NaiveDate); 4] {
    [
        ("Today", today),
        ("Tomorrow", today.checked_add_days(Days::new(1)).unwrap_or(today)),
        ("Next week", today.checked_add_days(Days::new(7)).unwrap_or(today)),
        ("Next month", today.checked_add_months(Months::new(1)).unwrap_or(today)),
    ]
}

pub struct DateCalculator {
    input: TextField,
    mode: Mode,
    result: Option<(NaiveDate, DateResult)>,
    error: Option<String>,
}

impl DateCalculator {
    pub fn new() -> Self {
        Self {
            input: TextField::with_max(10),
            mode: Mode::Countdown,
            result: None,
            error: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn result(&self) -> Option<DateResult> {
        self.result.map(|(_, r)| r)
    }

    fn cycle_mode(&mut self, forward: bool) {
        let idx = Mode::ALL.iter().position(|m| *m == self.mode).unwrap_or(0);
        let len = Mode::ALL.len();
        self.mode = Mode::ALL[if forward { (idx + 1) % len } else { (idx + len - 1) % len }];
        self.result = None;
    }

    fn set_quick(&mut self, slot: usize) {
        let today = Utc::now().date_naive();
        let (_, date) = quick_dates(today)[slot];
        self.input.set(&date.format("%Y-%m-%d").to_string());
        self.error = None;
    }

    pub fn calculate(&mut self, now: DateTime<Utc>) {
        if self.input.is_empty() {
            return;
        }
        match parse_date(self.input.value()) {
            Some(date) => {
                self.result = Some((date, compute(self.mode, date, now)));
                self.error = None;
            }
            None => {
                self.result = None;
                self.error = Some(format!("\"{}\" is not a valid YYYY-MM-DD date", self.input.value()));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Left => self.cycle_mode(false),
            KeyCode::Right | KeyCode::Tab => self.cycle_mode(true),
            KeyCode::Enter => self.calculate(Utc::now()),
            KeyCode::Char('t') => self.set_quick(0),
            KeyCode::Char('m') => self.set_quick(1),
            KeyCode::Char('w') => self.set_quick(2),
            KeyCode::Char('n') => self.set_quick(3),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                self.input.handle_key(key);
            }
            KeyCode::Backspace => {
                self.input.handle_key(key);
            }
            _ => {}
        }
        Action::None
    }

    pub fn handle_paste(&mut self, text: &str) {
        let filtered: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
        self.input.insert_str(&filtered);
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Modes
                Constraint::Length(1),
                Constraint::Length(3), // Date field
                Constraint::Length(1), // Quick dates
                Constraint::Length(1),
                Constraint::Min(4), // Result
            ])
            .split(area);

        let modes: Vec<Span> = Mode::ALL
            .iter()
            .map(|mode| {
                let style = if *mode == self.mode {
                    Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(TEXT_MUTED)
                };
                Span::styled(format!("  {}  ", mode.label()), style)
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(modes)), chunks[0]);

        ui::draw_field(frame, chunks[2], "Date (YYYY-MM-DD)", &self.input, true, anim_frame);

        let today = Utc::now().date_naive();
        let quick: Vec<Span> = quick_dates(today)
            .iter()
            .zip(['t', 'm', 'w', 'n'])
            .flat_map(|((label, _), key)| {
                [
                    Span::styled(format!(" [{key}]"), Style::default().fg(COPPER)),
                    Span::styled(format!(" {label} "), Style::default().fg(TEXT_MUTED)),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(quick)), chunks[3]);

        let block = ui::panel("Result", false);
        let inner = block.inner(chunks[5]);
        frame.render_widget(block, chunks[5]);

        let mut lines = Vec::new();
        if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(BURGUNDY))));
        } else if let Some((date, result)) = &self.result {
            lines.push(Line::from(Span::styled(
                long_date(*date),
                Style::default().fg(PALE_YELLOW).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("Day of week: {}", date.format("%A")),
                Style::default().fg(TEXT_MUTED),
            )));
            lines.push(Line::from(""));
            lines.extend(result_lines(result));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter a date and press Enter",
                Style::default().fg(TEXT_MUTED),
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for DateCalculator {
    fn default() -> Self {
        Self::new()
    }
}

fn stat(label: &str, value: i64) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<8}"), Style::default().fg(TEXT_MUTED)),
        Span::styled(value.to_string(), Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD)),
    ])
}

fn result_lines(result: &DateResult) -> Vec<Line<'static>> {
    match *result {
        DateResult::Countdown { is_today: true, .. } => {
            vec![Line::from(Span::styled("That's today!", Style::default().fg(OLIVE)))]
        }
        DateResult::Countdown { days, is_past: true, .. } => vec![Line::from(Span::styled(
            format!("That date was {} days ago", -days),
            Style::default().fg(COPPER),
        ))],
        DateResult::Countdown {
            days,
            weeks,
            months,
            years,
            ..
        } => vec![
            Line::from(Span::styled("Time remaining", Style::default().fg(SAPPHIRE))),
            stat("days", days),
            stat("weeks", weeks),
            stat("months", months),
            stat("years", years),
        ],
        DateResult::Age {
            days,
            months,
            years,
            hours,
            minutes,
        } => vec![
            Line::from(Span::styled("Time lived", Style::default().fg(SAPPHIRE))),
            stat("years", years),
            stat("months", months),
            stat("days", days),
            stat("hours", hours),
            stat("minutes", minutes),
        ],
        DateResult::Difference {
            days,
            weeks,
            months,
            years,
        } => vec![
            Line::from(Span::styled("Distance from today", Style::default().fg(SAPPHIRE))),
            stat("days", days),
            stat("weeks", weeks),
            stat("months", months),
            stat("years", years),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_countdown_past_date() {
        let result = compute(Mode::Countdown, date(2024, 1, 1), at(2024, 3, 1, 0));
        match result {
            DateResult::Countdown { days, is_past, is_today, weeks, .. } => {
                assert_eq!(days, -60);
                assert!(is_past);
                assert!(!is_today);
                assert_eq!(weeks, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_countdown_same_day_is_today() {
        // midnight already passed by 15h: ceil(-0.625) == 0
        let result = compute(Mode::Countdown, date(2024, 5, 10), at(2024, 5, 10, 15));
        assert!(matches!(result, DateResult::Countdown { days: 0, is_today: true, is_past: false, .. }));
    }

    #[test]
    fn test_countdown_future_buckets() {
        let result = compute(Mode::Countdown, date(2025, 1, 1), at(2024, 1, 1, 12));
        assert_eq!(
            result,
            DateResult::Countdown {
                days: 366,
                weeks: 52,
                months: 12,
                years: 1,
                is_today: false,
                is_past: false,
            }
        );
    }

    #[test]
    fn test_age_floors() {
        let result = compute(Mode::Age, date(2000, 1, 1), at(2000, 1, 3, 6));
        assert_eq!(
            result,
            DateResult::Age {
                days: 2,
                months: 0,
                years: 0,
                hours: 54,
                minutes: 54 * 60,
            }
        );
    }

    #[test]
    fn test_difference_is_symmetric() {
        let now = at(2024, 6, 15, 0);
        let before = compute(Mode::Difference, date(2024, 6, 1), now);
        let after = compute(Mode::Difference, date(2024, 6, 29), now);
        assert_eq!(before, after);
        assert!(matches!(before, DateResult::Difference { days: 14, weeks: 2, months: 0, years: 0 }));
    }

    #[test]
    fn test_quick_dates_clamp_month_end() {
        let quick = quick_dates(date(2024, 1, 31));
        assert_eq!(quick[0].1, date(2024, 1, 31));
        assert_eq!(quick[1].1, date(2024, 2, 1));
        assert_eq!(quick[2].1, date(2024, 2, 7));
        assert_eq!(quick[3].1, date(2024, 2, 29));
    }

    #[test]
    fn test_long_date() {
        assert_eq!(long_date(date(2026, 3, 14)), "Saturday, March 14, 2026");
    }

    #[test]
    fn test_empty_field_does_nothing() {
        let mut calc = DateCalculator::new();
        calc.calculate(at(2024, 1, 1, 0));
        assert!(calc.result().is_none());
        assert!(calc.error.is_none());
    }

    #[test]
    fn test_invalid_date_shows_error() {
        let mut calc = DateCalculator::new();
        calc.handle_paste("2024-02-30");
        calc.calculate(at(2024, 1, 1, 0));
        assert!(calc.result().is_none());
        assert!(calc.error.is_some());
    }

    #[test]
    fn test_field_rejects_letters() {
        let mut calc = DateCalculator::new();
        calc.handle_paste("2024-0x1-05");
        assert_eq!(calc.input.value(), "2024-01-05");
    }

    #[test]
    fn test_mode_change_clears_result() {
        let mut calc = DateCalculator::new();
        calc.handle_paste("2024-01-10");
        calc.calculate(at(2024, 1, 1, 0));
        assert!(calc.result().is_some());

        calc.handle_key(KeyEvent::from(KeyCode::Right));
        assert_eq!(calc.mode(), Mode::Age);
        assert!(calc.result().is_none());

        calc.handle_key(KeyEvent::from(KeyCode::Left));
        calc.handle_key(KeyEvent::from(KeyCode::Left));
        assert_eq!(calc.mode(), Mode::Difference);
    }
}
