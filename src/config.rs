//! On-disk format of a challenge and the places it can be loaded from

use crate::challenge::{Challenge, ChallengeError};
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use time::Date;

/// The challenge compiled into the binary
static BUILTIN: &str = include_str!("../data/challenge.toml");

pub(crate) const DEFAULT_TITLE: &str = "HYDRATION CHALLENGE";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct ChallengeFile {
    #[serde(default)]
    pub(crate) title: Option<String>,
    pub(crate) start: Date,
    pub(crate) end: Date,
    pub(crate) penalty_start: Date,
    pub(crate) participants: Vec<ParticipantEntry>,
    #[serde(default)]
    pub(crate) weeks: Vec<WeekEntry>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct ParticipantEntry {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) target_liters: u8,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct WeekEntry {
    /// The Monday starting the week
    pub(crate) start: Date,
    #[serde(default)]
    pub(crate) description: String,
    /// Participant ID → dates on which the daily target was missed
    #[serde(default)]
    pub(crate) penalties: BTreeMap<String, Vec<Date>>,
    /// Participant ID → whether the week's exercise penalty was completed
    #[serde(default)]
    pub(crate) compliance: BTreeMap<String, bool>,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to parse challenge file")]
    Parse(#[from] toml::de::Error),
    #[error("invalid challenge")]
    Invalid(#[from] ChallengeError),
}

pub(crate) fn parse_challenge(text: &str) -> Result<Challenge, ConfigError> {
    let file = toml::from_str::<ChallengeFile>(text)?;
    Ok(Challenge::try_from(file)?)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ChallengeSource {
    Builtin,
    File(PathBuf),
}

impl ChallengeSource {
    pub(crate) fn load(&self) -> anyhow::Result<Challenge> {
        match self {
            ChallengeSource::Builtin => {
                parse_challenge(BUILTIN).context("built-in challenge is broken")
            }
            ChallengeSource::File(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                parse_challenge(&text).with_context(|| format!("failed to load {}", path.display()))
            }
        }
    }
}
