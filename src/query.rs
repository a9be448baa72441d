//! Normalized connection request, independent of how it was typed in

use chrono::NaiveDate;

/// Whether the requested date/time is a departure or an arrival
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeMode {
    #[default]
    Departure,
    Arrival,
}

impl TimeMode {
    fn as_param(self) -> &'static str {
        match self {
            TimeMode::Departure => "0",
            TimeMode::Arrival => "1",
        }
    }
}

/// What to ask the API for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionQuery {
    pub from: String,
    pub to: String,
    pub via: Option<String>,
    pub date: Option<NaiveDate>,
    /// Free text (`15:30`) as the API accepts it
    pub time: Option<String>,
    pub mode: TimeMode,
    pub limit: Option<u8>,
}

impl ConnectionQuery {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }

    /// Query parameters for `GET /connections`.
    ///
    /// `via`, `date` and `time` go out under separate keys; the arrival flag
    /// is only sent when there is a date or time it refers to.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("from", self.from.clone()), ("to", self.to.clone())];

        if let Some(via) = &self.via {
            params.push(("via[]", via.clone()));
        }
        if let Some(date) = self.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(time) = &self.time {
            params.push(("time", time.clone()));
        }
        if self.date.is_some() || self.time.is_some() {
            params.push(("isArrivalTime", self.mode.as_param().to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }

        params
    }
}
