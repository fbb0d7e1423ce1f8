mod app;
mod calendar;
mod challenge;
mod config;
mod dates;
mod help;
mod monthpick;
mod panels;
mod rates;
mod scheme;
mod tally;
mod theme;
use crate::app::App;
use crate::challenge::Participant;
use crate::config::ChallengeSource;
use crate::dates::YearMonth;
use crate::scheme::{host_probe, SchemeWatcher};
use crate::theme::Theme;
use anyhow::Context;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use time::{Month, OffsetDateTime};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
const LOG_ENV: &str = "HYDROCAL_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        month: Option<YearMonth>,
        config: Option<PathBuf>,
        theme: Option<Theme>,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut month = None;
        let mut config = None;
        let mut theme = None;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('t') | Arg::Long("theme") => {
                    theme = Some(parser.value()?.parse::<Theme>()?);
                }
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if month.is_none() => {
                    month = Some(value.parse_with(parse_month_arg)?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            month,
            config,
            theme,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                month,
                config,
                theme,
                log_file,
            } => {
                if let Some(path) = log_file {
                    init_logging(&path)?;
                }
                let source = config.map_or(ChallengeSource::Builtin, ChallengeSource::File);
                let challenge = source.load()?;
                let ids = challenge
                    .participants()
                    .iter()
                    .map(Participant::id)
                    .collect::<Vec<_>>();
                tracing::info!(
                    title = challenge.title(),
                    participants = ?ids,
                    weeks = challenge.weeks().len(),
                    "Loaded challenge"
                );
                if let Some(m) = month {
                    if !challenge.has_month(m) {
                        return Err(MonthArgError::OutsideChallenge(m).into());
                    }
                }
                let today = today();
                let scheme = SchemeWatcher::new(host_probe(), Theme::Dark);
                let mut app = App::new(source, challenge, today, scheme);
                if let Some(m) = month {
                    app = app.with_month(m);
                }
                if let Some(t) = theme {
                    app = app.with_theme(t);
                }
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(&mut terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: hydrocal [<options>] [YYYY-MM]");
                println!();
                println!("Terminal calendar for tracking a hydration challenge and its penalties");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>     Read the challenge from the given TOML file");
                println!("  -t, --theme dark|light  Start with the given color theme");
                println!("      --log-file <FILE>   Write log messages to the given file");
                println!("  -h, --help              Display this help message and exit");
                println!("  -V, --version           Show the program version and exit");
                println!();
                println!("Logging is filtered by the {LOG_ENV} environment variable.");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
enum MonthArgError {
    #[error("invalid month {0:?}; expected YYYY-MM")]
    Malformed(String),
    #[error("{0} is not part of the challenge")]
    OutsideChallenge(YearMonth),
}

fn parse_month_arg(s: &str) -> Result<YearMonth, MonthArgError> {
    let malformed = || MonthArgError::Malformed(s.to_owned());
    let (year, month) = s.split_once('-').ok_or_else(malformed)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(malformed());
    }
    let year = year.parse::<i32>().map_err(|_| malformed())?;
    let month = month
        .parse::<u8>()
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(malformed)?;
    YearMonth::new(year, month).ok_or_else(malformed)
}

fn today() -> time::Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(e) => {
            tracing::warn!("Could not determine local time, using UTC: {e}");
            OffsetDateTime::now_utc().date()
        }
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = execute!(std::io::stdout(), EnableFocusChange)
        .context("failed to enable focus reporting")
        .and_then(|()| func(terminal));
    if let Err(e) = execute!(std::io::stdout(), DisableFocusChange) {
        tracing::warn!("Failed to disable focus reporting: {e}");
    }
    ratatui::restore();
    r
}
