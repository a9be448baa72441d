//! Command line grammars
//!
//! Two ways to ask for connections:
//!
//! * structured: `fahrplan Zürich Bern --via Olten -t 15:30 -m arr`
//! * natural language, when the first word is `von`:
//!   `fahrplan von Zürich HB nach Bern via Olten an 15:30`
//!
//! Both end up as the same [`ConnectionQuery`].

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, ValueEnum};
use tracing::warn;

use crate::error::{FahrplanError, Result};
use crate::query::{ConnectionQuery, TimeMode};

const DEFAULT_VERBOSITY: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Date and time are the departure
    Dep,
    /// Date and time are the arrival
    Arr,
}

impl From<Mode> for TimeMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Dep => TimeMode::Departure,
            Mode::Arr => TimeMode::Arrival,
        }
    }
}

/// Query the Swiss public transport timetable
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fahrplan",
    version,
    about,
    after_help = "Disclaimer: This is not an official SBB app. The correctness of the data is not guaranteed."
)]
pub struct StructuredArgs {
    /// Start station
    pub start: String,

    /// Destination station
    pub destination: String,

    /// Travel via this station
    #[arg(short, long)]
    pub via: Option<String>,

    /// Departure or arrival date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Departure or arrival time (HH:MM)
    #[arg(short, long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,

    /// Whether date/time are departure or arrival
    #[arg(short, long, value_enum, default_value_t = Mode::Dep)]
    pub mode: Mode,

    /// Number of connections to fetch
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub limit: Option<u8>,

    /// Log verbosity (1 = errors only, 3 = debug)
    #[arg(long, default_value_t = DEFAULT_VERBOSITY, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub verbosity: u8,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_time(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

impl StructuredArgs {
    pub fn into_query(self) -> ConnectionQuery {
        ConnectionQuery {
            from: self.start,
            to: self.destination,
            via: self.via,
            date: self.date,
            time: self.time.map(|t| t.format("%H:%M").to_string()),
            mode: self.mode.into(),
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Von,
    Nach,
    Via,
    Ab,
    An,
}

impl Keyword {
    /// Keywords are lowercase; capitalized words belong to place names.
    fn parse(token: &str) -> Option<Self> {
        match token {
            "von" => Some(Keyword::Von),
            "nach" => Some(Keyword::Nach),
            "via" => Some(Keyword::Via),
            "ab" => Some(Keyword::Ab),
            "an" => Some(Keyword::An),
            _ => None,
        }
    }
}

/// Arguments given as `von <start> nach <destination> [via ..] [ab ..] [an ..]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaturalLanguageArgs {
    pub start: String,
    pub destination: String,
    pub via: Option<String>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
}

impl NaturalLanguageArgs {
    /// Group the words following each keyword. Words belonging to the same
    /// keyword are joined with single spaces; a repeated keyword starts over.
    /// Only the leading `von` may be written in any case.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut values: [Option<String>; 5] = Default::default();
        let mut current: Option<Keyword> = None;

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            let keyword = if i == 0 && token.eq_ignore_ascii_case("von") {
                Some(Keyword::Von)
            } else {
                Keyword::parse(token)
            };

            if let Some(keyword) = keyword {
                values[keyword as usize] = Some(String::new());
                current = Some(keyword);
            } else if let Some(keyword) = current {
                if let Some(value) = values[keyword as usize].as_mut() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(token);
                }
            }
        }

        let [von, nach, via, ab, an] = values;
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        Ok(Self {
            start: non_empty(von).ok_or(FahrplanError::MissingArgument("von"))?,
            destination: non_empty(nach).ok_or(FahrplanError::MissingArgument("nach"))?,
            via: non_empty(via),
            departure: non_empty(ab),
            arrival: non_empty(an),
        })
    }

    pub fn into_query(self) -> ConnectionQuery {
        let (time, mode) = match (self.departure, self.arrival) {
            (Some(departure), Some(arrival)) => {
                warn!(%departure, %arrival, "Both \"ab\" and \"an\" given, using arrival");
                (Some(arrival), TimeMode::Arrival)
            }
            (None, Some(arrival)) => (Some(arrival), TimeMode::Arrival),
            (departure, None) => (departure, TimeMode::Departure),
        };

        ConnectionQuery {
            from: self.start,
            to: self.destination,
            via: self.via,
            date: None,
            time,
            mode,
            limit: None,
        }
    }
}

/// The parsed command line, in whichever grammar it was written
#[derive(Debug, Clone)]
pub enum Invocation {
    Structured(StructuredArgs),
    NaturalLanguage(NaturalLanguageArgs),
}

impl Invocation {
    /// `argv` includes the program name.
    pub fn from_args<S: AsRef<str>>(argv: &[S]) -> Result<Self> {
        if is_natural_language(argv) {
            NaturalLanguageArgs::parse(&argv[1..]).map(Invocation::NaturalLanguage)
        } else {
            let args = StructuredArgs::try_parse_from(argv.iter().map(AsRef::as_ref))?;
            Ok(Invocation::Structured(args))
        }
    }

    pub fn verbosity(&self) -> u8 {
        match self {
            Invocation::Structured(args) => args.verbosity,
            Invocation::NaturalLanguage(_) => DEFAULT_VERBOSITY,
        }
    }

    pub fn into_query(self) -> ConnectionQuery {
        match self {
            Invocation::Structured(args) => args.into_query(),
            Invocation::NaturalLanguage(args) => args.into_query(),
        }
    }
}

fn is_natural_language<S: AsRef<str>>(argv: &[S]) -> bool {
    argv.get(1)
        .is_some_and(|first| first.as_ref().eq_ignore_ascii_case("von"))
}
