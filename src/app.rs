use crate::calendar::{CalendarView, MonthGrid, MAIN_WIDTH};
use crate::challenge::Challenge;
use crate::config::ChallengeSource;
use crate::dates::YearMonth;
use crate::help::Help;
use crate::monthpick::{MonthPick, MonthPickInput, MonthPickOutput, MonthPickState};
use crate::panels::{Counters, Legend, MonthBar, Rules, Summaries};
use crate::scheme::{SchemeProbe, SchemeWatcher, Subscription};
use crate::tally::Ledger;
use crate::theme::Theme;
use crossterm::event::{read, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use time::Date;

#[derive(Debug)]
pub(crate) struct App<P> {
    source: ChallengeSource,
    ledger: Ledger,
    month: YearMonth,
    today: Date,
    theme: Theme,
    scheme: SchemeWatcher<P>,
    scheme_changes: Subscription,
    state: AppState,
    summary_scroll: u16,
    /// Largest summary scroll offset as of the last draw
    summary_scroll_max: u16,
}

/// Narrowest side column shown beside the calendar; below this the panels
/// go underneath it
const SIDE_MIN_WIDTH: u16 = 40;

impl<P: SchemeProbe> App<P> {
    /// Starts on the challenge's default month, in the host's preferred theme
    pub(crate) fn new(
        source: ChallengeSource,
        challenge: Challenge,
        today: Date,
        mut scheme: SchemeWatcher<P>,
    ) -> App<P> {
        let month = challenge.default_month();
        let theme = scheme.current();
        let scheme_changes = scheme.subscribe();
        App {
            source,
            ledger: Ledger::new(challenge),
            month,
            today,
            theme,
            scheme,
            scheme_changes,
            state: AppState::Calendar,
            summary_scroll: 0,
            summary_scroll_max: 0,
        }
    }

    /// Show `month` first.  It must be one of the challenge's months; any
    /// other month is ignored.
    pub(crate) fn with_month(mut self, month: YearMonth) -> App<P> {
        if self.ledger.challenge().has_month(month) {
            self.month = month;
        }
        self
    }

    pub(crate) fn with_theme(mut self, theme: Theme) -> App<P> {
        self.theme = theme;
        self
    }

    pub(crate) fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(terminal)?;
            self.handle_event(read()?)?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if event == Event::FocusGained {
            self.follow_host_scheme();
        } else if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.previous_month(),
                KeyCode::Char('l') | KeyCode::Right => self.next_month(),
                KeyCode::Char('j') | KeyCode::Down => self.scroll_summaries_down(),
                KeyCode::Char('k') | KeyCode::Up => self.scroll_summaries_up(),
                KeyCode::Char('0') | KeyCode::Home => {
                    self.set_month(self.ledger.challenge().default_month());
                    true
                }
                KeyCode::Char('m' | 'g') => {
                    let months = self.ledger.challenge().months().collect();
                    match MonthPickState::new(months, self.month) {
                        Some(state) => {
                            self.state = AppState::Picking(state);
                            true
                        }
                        None => false,
                    }
                }
                KeyCode::Char('t') => {
                    self.set_theme(self.theme.toggled());
                    true
                }
                KeyCode::Char('r') => self.reload(),
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Picking(state) => {
                if matches!(key, KeyCode::Char('q' | 'm' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char('k') | KeyCode::Up => state.handle_input(MonthPickInput::Up),
                        KeyCode::Char('j') | KeyCode::Down => {
                            state.handle_input(MonthPickInput::Down)
                        }
                        KeyCode::Home => state.handle_input(MonthPickInput::First),
                        KeyCode::End => state.handle_input(MonthPickInput::Last),
                        KeyCode::Char('1') => state.handle_input(MonthPickInput::Digit(1)),
                        KeyCode::Char('2') => state.handle_input(MonthPickInput::Digit(2)),
                        KeyCode::Char('3') => state.handle_input(MonthPickInput::Digit(3)),
                        KeyCode::Char('4') => state.handle_input(MonthPickInput::Digit(4)),
                        KeyCode::Char('5') => state.handle_input(MonthPickInput::Digit(5)),
                        KeyCode::Char('6') => state.handle_input(MonthPickInput::Digit(6)),
                        KeyCode::Char('7') => state.handle_input(MonthPickInput::Digit(7)),
                        KeyCode::Char('8') => state.handle_input(MonthPickInput::Digit(8)),
                        KeyCode::Char('9') => state.handle_input(MonthPickInput::Digit(9)),
                        KeyCode::Enter => state.handle_input(MonthPickInput::Enter),
                        _ => MonthPickOutput::Invalid,
                    };
                    match output {
                        MonthPickOutput::Ok => true,
                        MonthPickOutput::Invalid => false,
                        MonthPickOutput::Pick(month) => {
                            self.state = AppState::Calendar;
                            self.set_month(month);
                            true
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn previous_month(&mut self) -> bool {
        self.step_month(YearMonth::previous)
    }

    fn next_month(&mut self) -> bool {
        self.step_month(YearMonth::next)
    }

    fn step_month<F>(&mut self, step: F) -> bool
    where
        F: FnOnce(YearMonth) -> Option<YearMonth>,
    {
        match step(self.month).filter(|&m| self.ledger.challenge().has_month(m)) {
            Some(month) => {
                self.set_month(month);
                true
            }
            None => false,
        }
    }

    fn set_month(&mut self, month: YearMonth) {
        if month != self.month {
            tracing::debug!(%month, "Showing month");
            self.month = month;
            self.summary_scroll = 0;
        }
    }

    fn scroll_summaries_down(&mut self) -> bool {
        if self.summary_scroll < self.summary_scroll_max {
            self.summary_scroll += 1;
            true
        } else {
            false
        }
    }

    fn scroll_summaries_up(&mut self) -> bool {
        match self.summary_scroll.checked_sub(1) {
            Some(scroll) => {
                self.summary_scroll = scroll;
                true
            }
            None => false,
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        if theme != self.theme {
            tracing::info!(?theme, "Switching theme");
            self.theme = theme;
        }
    }

    fn follow_host_scheme(&mut self) {
        self.scheme.refresh();
        if let Some(theme) = self.scheme_changes.latest() {
            self.set_theme(theme);
        }
    }

    /// Loads the challenge again from its source.  On failure the current
    /// challenge is kept and `false` is returned.
    fn reload(&mut self) -> bool {
        match self.source.load() {
            Ok(challenge) => {
                tracing::info!(
                    participants = challenge.participants().len(),
                    weeks = challenge.weeks().len(),
                    "Reloaded challenge"
                );
                self.ledger = Ledger::new(challenge);
                self.summary_scroll = 0;
                if !self.ledger.challenge().has_month(self.month) {
                    self.set_month(self.ledger.challenge().default_month());
                }
                true
            }
            Err(e) => {
                tracing::warn!("Failed to reload challenge: {e:#}");
                false
            }
        }
    }
}

impl<P: SchemeProbe> Widget for &mut App<P> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = self.theme.palette();
        let challenge = self.ledger.challenge();
        buf.set_style(area, palette.base);
        let [title_area, tabs_area, body_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);
        Line::styled(challenge.title(), palette.heading)
            .alignment(Alignment::Center)
            .render(title_area, buf);
        MonthBar {
            months: challenge.months().collect(),
            current: self.month,
            palette,
        }
        .render(tabs_area, buf);

        let grid = MonthGrid::build(&self.ledger, self.month);
        let calendar = CalendarView::new(&grid, challenge.participants(), self.today, palette);
        let main_height = calendar
            .height()
            .saturating_add(2)
            .saturating_add(Legend::HEIGHT);
        let [main_area, side_area] = if body_area.width < MAIN_WIDTH + 3 + SIDE_MIN_WIDTH {
            let [main_area, side_area] =
                Layout::vertical([Constraint::Length(main_height), Constraint::Fill(1)])
                    .areas(body_area);
            let main_area = Rect {
                width: main_area.width.min(MAIN_WIDTH + 2),
                ..main_area
            };
            [main_area, side_area]
        } else {
            Layout::horizontal([Constraint::Length(MAIN_WIDTH + 2), Constraint::Fill(1)])
                .spacing(1)
                .areas(body_area)
        };

        let [cal_area, legend_area] = Layout::vertical([
            Constraint::Length(calendar.height().saturating_add(2)),
            Constraint::Length(Legend::HEIGHT),
        ])
        .areas(main_area);
        let block = Block::bordered()
            .title(format!(" {} ", grid.month()))
            .title_alignment(Alignment::Center)
            .title_style(palette.heading)
            .style(palette.base);
        let inner = block.inner(cal_area);
        block.render(cal_area, buf);
        calendar.render(inner, buf);
        Legend(palette).render(legend_area, buf);

        let counters = Counters {
            challenge,
            month: self.month,
            counts: self.ledger.monthly_counts(self.month),
            owed: self.ledger.owed_amount(self.month),
            palette,
        };
        let rules = Rules {
            challenge,
            month: self.month,
            palette,
        };
        let [counters_area, summaries_area, rules_area] = Layout::vertical([
            Constraint::Length(counters.height()),
            Constraint::Fill(1),
            Constraint::Length(rules.height()),
        ])
        .areas(side_area);
        counters.render(counters_area, buf);
        let summaries = Summaries {
            challenge,
            summaries: self.ledger.weekly_summaries(self.month),
            scroll: self.summary_scroll,
            palette,
        };
        self.summary_scroll_max = summaries.max_scroll(summaries_area.height);
        self.summary_scroll = self.summary_scroll.min(self.summary_scroll_max);
        summaries.render(summaries_area, buf);
        rules.render(rules_area, buf);

        match self.state {
            AppState::Helping => Help(palette).render(area, buf),
            AppState::Picking(ref mut state) => MonthPick(palette).render(area, buf, state),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Picking(MonthPickState),
    Quitting,
}
