//! Following the host's light/dark preference.
//!
//! A [`SchemeWatcher`] asks a [`SchemeProbe`] for the preference once when
//! created and again whenever [`SchemeWatcher::refresh`] is called (the app
//! does so when the terminal regains focus).  The probe used at runtime,
//! [`host_probe()`], asks the terminal for its current background color and
//! falls back to `COLORFGBG` when the terminal does not answer.  Interested parties call
//! [`SchemeWatcher::subscribe`] and receive every change through the returned
//! [`Subscription`] until it is dropped.

use crate::theme::Theme;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{channel, Receiver, Sender};
use terminal_colorsaurus::{ColorScheme, QueryOptions};

pub(crate) trait SchemeProbe {
    /// `Some(true)` if the host prefers a dark scheme, `Some(false)` if it
    /// prefers a light one, `None` if it cannot tell
    fn prefers_dark(&self) -> Option<bool>;
}

/// Asks the terminal for its background color with an OSC 11 query.  The
/// answer reflects the terminal's current colors, so it changes when the
/// user switches the terminal's scheme.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct TerminalQuery;

impl SchemeProbe for TerminalQuery {
    fn prefers_dark(&self) -> Option<bool> {
        match terminal_colorsaurus::color_scheme(QueryOptions::default()) {
            Ok(scheme) => Some(matches!(scheme, ColorScheme::Dark)),
            Err(e) => {
                tracing::debug!(error = %e, "Terminal did not report its background color");
                None
            }
        }
    }
}

/// Asks `primary` first and `fallback` only when `primary` cannot tell
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Fallback<P, Q> {
    primary: P,
    fallback: Q,
}

impl<P, Q> Fallback<P, Q> {
    pub(crate) fn new(primary: P, fallback: Q) -> Self {
        Fallback { primary, fallback }
    }
}

impl<P: SchemeProbe, Q: SchemeProbe> SchemeProbe for Fallback<P, Q> {
    fn prefers_dark(&self) -> Option<bool> {
        self.primary
            .prefers_dark()
            .or_else(|| self.fallback.prefers_dark())
    }
}

pub(crate) type HostProbe = Fallback<TerminalQuery, EnvProbe>;

/// The probe the app watches: the live terminal query, then `COLORFGBG`
pub(crate) fn host_probe() -> HostProbe {
    Fallback::new(TerminalQuery, EnvProbe)
}

/// Reads the `COLORFGBG` variable set by rxvt, Konsole, iTerm2 and others
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct EnvProbe;

impl SchemeProbe for EnvProbe {
    fn prefers_dark(&self) -> Option<bool> {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| parse_colorfgbg(&value))
    }
}

/// `COLORFGBG` is "fg;bg" or "fg;default;bg"; the last field is the ANSI
/// index of the background color.
fn parse_colorfgbg(value: &str) -> Option<bool> {
    let bg = value.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    match bg {
        0..=6 | 8 => Some(true),
        7 | 9..=15 => Some(false),
        _ => None,
    }
}

type Registry = RefCell<BTreeMap<u64, Sender<Theme>>>;

#[derive(Debug)]
pub(crate) struct SchemeWatcher<P> {
    probe: P,
    current: Theme,
    subscribers: Rc<Registry>,
    next_id: u64,
}

impl<P: SchemeProbe> SchemeWatcher<P> {
    /// Queries the probe, using `fallback` if it has no answer
    pub(crate) fn new(probe: P, fallback: Theme) -> Self {
        let current = probe
            .prefers_dark()
            .map_or(fallback, Theme::from_prefers_dark);
        tracing::debug!(?current, "Queried host color scheme");
        SchemeWatcher {
            probe,
            current,
            subscribers: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: 0,
        }
    }

    /// The host's preference as of the last query
    pub(crate) fn current(&self) -> Theme {
        self.current
    }

    pub(crate) fn subscribe(&mut self) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        let (sender, receiver) = channel();
        self.subscribers.borrow_mut().insert(id, sender);
        Subscription {
            id,
            registry: Rc::downgrade(&self.subscribers),
            receiver,
        }
    }

    /// Queries the probe again and notifies every subscriber if the
    /// preference changed.  An unanswered query changes nothing.
    pub(crate) fn refresh(&mut self) {
        let Some(prefers_dark) = self.probe.prefers_dark() else {
            return;
        };
        let theme = Theme::from_prefers_dark(prefers_dark);
        if theme != self.current {
            tracing::info!(?theme, "Host color scheme changed");
            self.current = theme;
            self.subscribers
                .borrow_mut()
                .retain(|_, sender| sender.send(theme).is_ok());
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

/// A live interest in color-scheme changes.  Dropping it unsubscribes.
#[derive(Debug)]
pub(crate) struct Subscription {
    id: u64,
    registry: Weak<Registry>,
    receiver: Receiver<Theme>,
}

impl Subscription {
    /// The most recent change since the last call, if any
    pub(crate) fn latest(&self) -> Option<Theme> {
        self.receiver.try_iter().last()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(&self.id);
        }
    }
}
