use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};

use crate::state::{
    display::{Mode, Rgb},
    projection::DisplayView,
};

/// One block of a frame, optionally painted on a colored card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
    /// Text to draw. Contains no control characters apart from `\n`.
    pub text: String,
    /// Background of the block, `None` for the screen background.
    pub card: Option<Rgb>,
}

impl FrameLine {
    fn plain(text: impl AsRef<str>) -> Self {
        Self {
            text: printable(text.as_ref()),
            card: None,
        }
    }

    fn on_card(text: impl AsRef<str>, card: Rgb) -> Self {
        Self {
            text: printable(text.as_ref()),
            card: Some(card),
        }
    }
}

/// Everything drawn for one tick. Two equal frames look the same on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Wall clock in the top left corner; absent when the body already shows it.
    pub clock: Option<String>,
    /// German weekday and date in the top right corner.
    pub date: String,
    /// Mode-specific content below the header, stacked top to bottom.
    pub body: Vec<FrameLine>,
}

/// Card color behind the stopwatch, timer and message views.
pub const ACCENT: Rgb = Rgb::new(91, 124, 255);

impl Frame {
    /// Build the frame for `view`, showing wall clock and date in `zone`.
    pub fn build<Tz: TimeZone>(view: &DisplayView, zone: &Tz) -> Self {
        let wall = DateTime::<Utc>::from(view.now.to_system_time()).with_timezone(zone);
        let clock = wall_clock(&wall);
        let date = german_date(&wall);

        let body = match view.mode {
            Mode::Index => vec![FrameLine::plain(&clock)],
            Mode::Stopwatch => vec![FrameLine::on_card(view.stopwatch.formatted(), ACCENT)],
            Mode::Timer => vec![FrameLine::on_card(view.timer.formatted(), ACCENT)],
            Mode::Message => vec![FrameLine::on_card(&view.message, ACCENT)],
            Mode::TeamScoreboard => {
                let mut lines: Vec<FrameLine> = view
                    .teams
                    .iter()
                    .map(|team| {
                        FrameLine::on_card(format!("{}  {}", team.name, team.score), team.color)
                    })
                    .collect();
                lines.push(FrameLine::plain(format!(
                    "Spielzeit {}",
                    view.game_clock.formatted()
                )));
                lines
            }
        };

        let clock = match view.mode {
            Mode::Index => None,
            _ => Some(clock),
        };

        Self { clock, date, body }
    }
}

/// Drop control characters other than line breaks so stored text cannot drive the terminal.
fn printable(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

fn wall_clock<Tz: TimeZone>(wall: &DateTime<Tz>) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        wall.hour(),
        wall.minute(),
        wall.second()
    )
}

fn german_date<Tz: TimeZone>(wall: &DateTime<Tz>) -> String {
    format!(
        "{}, {:02}.{:02}.{}",
        german_weekday(wall.weekday()),
        wall.day(),
        wall.month(),
        wall.year()
    )
}

fn german_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Montag",
        Weekday::Tue => "Dienstag",
        Weekday::Wed => "Mittwoch",
        Weekday::Thu => "Donnerstag",
        Weekday::Fri => "Freitag",
        Weekday::Sat => "Samstag",
        Weekday::Sun => "Sonntag",
    }
}
