use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub(crate) fn from_prefers_dark(prefers_dark: bool) -> Theme {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub(crate) fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub(crate) fn palette(self) -> &'static Palette {
        match self {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }
}

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Theme, ParseThemeError> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(ParseThemeError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid theme {0:?}; expected \"dark\" or \"light\"")]
pub(crate) struct ParseThemeError(String);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Palette {
    pub(crate) base: Style,
    pub(crate) heading: Style,
    /// Days outside the challenge window
    pub(crate) inactive: Style,
    /// Caption of a weekend with nothing due
    pub(crate) quiet: Style,
    /// Daily target achieved
    pub(crate) met: Style,
    /// Daily target missed
    pub(crate) missed: Style,
    /// Penalty completed
    pub(crate) done: Style,
    /// Penalty not completed
    pub(crate) skipped: Style,
    /// Counters and the selected month
    pub(crate) accent: Style,
    pub(crate) selected: Style,
    pub(crate) owed: Style,
    /// Weekly summary backgrounds
    pub(crate) week_all: Style,
    pub(crate) week_none: Style,
    pub(crate) week_mixed: Style,
    pub(crate) unfilled: Style,
}

const DARK_BASE: Style = Style::new().fg(Color::White).bg(Color::Black);

static DARK: Palette = Palette {
    base: DARK_BASE,
    heading: DARK_BASE.add_modifier(Modifier::BOLD),
    inactive: DARK_BASE.fg(Color::DarkGray),
    quiet: DARK_BASE.fg(Color::Gray).add_modifier(Modifier::ITALIC),
    met: Style::new().fg(Color::White).bg(Color::Green),
    missed: Style::new().fg(Color::White).bg(Color::Red),
    done: DARK_BASE.fg(Color::LightGreen),
    skipped: DARK_BASE.fg(Color::LightRed),
    accent: DARK_BASE.fg(Color::Yellow).add_modifier(Modifier::BOLD),
    selected: Style::new().fg(Color::Black).bg(Color::Yellow),
    owed: DARK_BASE.fg(Color::LightRed).add_modifier(Modifier::BOLD),
    week_all: DARK_BASE.fg(Color::LightGreen),
    week_none: DARK_BASE.fg(Color::LightRed),
    week_mixed: DARK_BASE.fg(Color::Yellow),
    unfilled: DARK_BASE.fg(Color::DarkGray),
};

const LIGHT_BASE: Style = Style::new().fg(Color::Black).bg(Color::White);

static LIGHT: Palette = Palette {
    base: LIGHT_BASE,
    heading: LIGHT_BASE.add_modifier(Modifier::BOLD),
    inactive: LIGHT_BASE.fg(Color::Gray),
    quiet: LIGHT_BASE.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    met: Style::new().fg(Color::Black).bg(Color::LightGreen),
    missed: Style::new().fg(Color::Black).bg(Color::LightRed),
    done: LIGHT_BASE.fg(Color::Green),
    skipped: LIGHT_BASE.fg(Color::Red),
    accent: LIGHT_BASE.fg(Color::Magenta).add_modifier(Modifier::BOLD),
    selected: Style::new().fg(Color::White).bg(Color::Magenta),
    owed: LIGHT_BASE.fg(Color::Red).add_modifier(Modifier::BOLD),
    week_all: LIGHT_BASE.fg(Color::Green),
    week_none: LIGHT_BASE.fg(Color::Red),
    week_mixed: LIGHT_BASE.fg(Color::Magenta),
    unfilled: LIGHT_BASE.fg(Color::Gray),
};

pub(crate) const CHECK: &str = "✓";
pub(crate) const CROSS: &str = "✗";
pub(crate) const SWATCH: &str = "■";
