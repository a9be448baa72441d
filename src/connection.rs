use std::fmt;

use chrono::{DateTime, Duration, FixedOffset};
use tracing::debug;

use crate::error::{FahrplanError, Result};
use crate::models::{CapacityCode, RawConnection, RawPrognosis, RawSection};

/// Label used for sections without a journey
const WALK: &str = "walk";

/// Coarse seat availability estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Occupancy {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
}

impl Occupancy {
    /// Map a raw capacity code. `None` and `"-1"` mean no estimate; codes
    /// outside `-1..=3` are returned as `Err` with the code text.
    pub fn from_code(code: Option<&str>) -> std::result::Result<Self, String> {
        match code {
            None | Some("-1") => Ok(Occupancy::Unknown),
            Some("0") | Some("1") => Ok(Occupancy::Low),
            Some("2") => Ok(Occupancy::Medium),
            Some("3") => Ok(Occupancy::High),
            Some(other) => Err(other.to_string()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Occupancy::Unknown => "",
            Occupancy::Low => "Low",
            Occupancy::Medium => "Medium",
            Occupancy::High => "High",
        }
    }

    pub fn is_known(self) -> bool {
        self != Occupancy::Unknown
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One connection, flattened for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub station_from: String,
    pub station_to: String,
    pub platform_from: String,
    pub platform_to: String,
    pub departure: DateTime<FixedOffset>,
    pub arrival: DateTime<FixedOffset>,
    pub change_count: String,
    pub travelwith: String,
    pub occupancy_1st: Occupancy,
    pub occupancy_2nd: Occupancy,
}

impl DisplayRow {
    pub fn duration(&self) -> Duration {
        self.arrival.signed_duration_since(self.departure)
    }
}

/// Flatten a raw connection into a display row.
pub fn normalize(connection: &RawConnection) -> Result<DisplayRow> {
    let index = connection.index;

    let departure = parse_timestamp(
        connection.from.departure.as_deref(),
        index,
        "from.departure",
    )?;
    let arrival = parse_timestamp(connection.to.arrival.as_deref(), index, "to.arrival")?;

    let change_count = connection
        .sections
        .len()
        .checked_sub(1)
        .ok_or(FahrplanError::MissingField {
            index,
            field: "sections",
        })?;

    let default_prognosis = RawPrognosis::default();
    let prognosis = connection
        .from
        .prognosis
        .as_ref()
        .unwrap_or(&default_prognosis);

    let row = DisplayRow {
        station_from: connection.from.station.name.clone(),
        station_to: connection.to.station.name.clone(),
        platform_from: connection.from.platform.clone().unwrap_or_default(),
        platform_to: connection.to.platform.clone().unwrap_or_default(),
        departure,
        arrival,
        change_count: change_count.to_string(),
        travelwith: travel_with(&connection.sections),
        occupancy_1st: occupancy(prognosis.capacity_1st.as_ref(), index, "capacity1st")?,
        occupancy_2nd: occupancy(prognosis.capacity_2nd.as_ref(), index, "capacity2nd")?,
    };

    debug!(
        index,
        from = %row.station_from,
        to = %row.station_to,
        changes = %row.change_count,
        "Normalized connection"
    );
    Ok(row)
}

/// Distinct transport modes in first-seen order, joined by `", "`.
pub fn travel_with(sections: &[RawSection]) -> String {
    let mut modes: Vec<&str> = Vec::with_capacity(sections.len());

    for section in sections {
        let mode = match &section.journey {
            Some(journey) => journey.category.as_deref().unwrap_or("").trim(),
            None => WALK,
        };
        if !mode.is_empty() && !modes.contains(&mode) {
            modes.push(mode);
        }
    }

    modes.join(", ")
}

fn occupancy(code: Option<&CapacityCode>, index: usize, field: &'static str) -> Result<Occupancy> {
    let code = code.map(CapacityCode::as_code);
    Occupancy::from_code(code.as_deref())
        .map_err(|code| FahrplanError::UnknownOccupancy { index, field, code })
}

/// Parse an API timestamp. Accepts RFC 3339 as well as the colon-less
/// offset (`+0200`) the API actually sends.
pub fn parse_timestamp(
    value: Option<&str>,
    index: usize,
    field: &'static str,
) -> Result<DateTime<FixedOffset>> {
    let value = value.ok_or(FahrplanError::MissingField { index, field })?;

    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%z"))
        .map_err(|_| FahrplanError::InvalidTimestamp {
            index,
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawCheckpoint, RawJourney, RawStation};
    use proptest::prelude::*;

    fn checkpoint(name: &str, platform: Option<&str>) -> RawCheckpoint {
        RawCheckpoint {
            station: RawStation {
                name: name.to_string(),
            },
            platform: platform.map(str::to_string),
            departure: None,
            arrival: None,
            prognosis: None,
        }
    }

    fn section(category: Option<&str>) -> RawSection {
        RawSection {
            journey: category.map(|c| RawJourney {
                category: Some(c.to_string()),
            }),
        }
    }

    fn connection(sections: Vec<RawSection>) -> RawConnection {
        let mut from = checkpoint("Zürich HB", Some("31"));
        from.departure = Some("2012-03-31T13:55:00+0200".to_string());
        from.prognosis = Some(RawPrognosis {
            capacity_1st: Some(CapacityCode::Text("1".to_string())),
            capacity_2nd: Some(CapacityCode::Text("3".to_string())),
        });
        let mut to = checkpoint("Bern", Some(""));
        to.arrival = Some("2012-03-31T14:53:00+0200".to_string());

        RawConnection {
            index: 1,
            from,
            to,
            sections,
        }
    }

    #[test]
    fn test_occupancy_mapping() {
        assert_eq!(Occupancy::from_code(None), Ok(Occupancy::Unknown));
        assert_eq!(Occupancy::from_code(Some("-1")), Ok(Occupancy::Unknown));
        assert_eq!(Occupancy::from_code(Some("0")), Ok(Occupancy::Low));
        assert_eq!(Occupancy::from_code(Some("1")), Ok(Occupancy::Low));
        assert_eq!(Occupancy::from_code(Some("2")), Ok(Occupancy::Medium));
        assert_eq!(Occupancy::from_code(Some("3")), Ok(Occupancy::High));
        assert_eq!(Occupancy::from_code(Some("4")), Err("4".to_string()));
        assert_eq!(Occupancy::Unknown.label(), "");
    }

    #[test]
    fn test_direct_walk_connection() {
        let row = normalize(&connection(vec![section(None)])).unwrap();
        assert_eq!(row.change_count, "0");
        assert_eq!(row.travelwith, "walk");
        assert_eq!(row.occupancy_1st, Occupancy::Low);
        assert_eq!(row.occupancy_2nd, Occupancy::High);
        assert_eq!(row.platform_from, "31");
        assert_eq!(row.platform_to, "");
        assert_eq!(row.duration().num_minutes(), 58);
    }

    #[test]
    fn test_travel_with_first_seen_order() {
        let sections = vec![section(Some("IC")), section(None), section(Some("S"))];
        let row = normalize(&connection(sections)).unwrap();
        assert_eq!(row.change_count, "2");
        assert_eq!(row.travelwith, "IC, walk, S");
    }

    #[test]
    fn test_travel_with_dedupes_and_drops_empty() {
        let sections = vec![
            section(Some("S")),
            section(Some("")),
            section(Some("S")),
            RawSection {
                journey: Some(RawJourney { category: None }),
            },
        ];
        assert_eq!(travel_with(&sections), "S");
    }

    #[test]
    fn test_missing_prognosis_is_unknown() {
        let mut raw = connection(vec![section(Some("IR"))]);
        raw.from.prognosis = None;
        let row = normalize(&raw).unwrap();
        assert!(!row.occupancy_1st.is_known());
        assert!(!row.occupancy_2nd.is_known());
    }

    #[test]
    fn test_numeric_capacity_codes() {
        let mut raw = connection(vec![section(Some("IR"))]);
        raw.from.prognosis = Some(RawPrognosis {
            capacity_1st: Some(CapacityCode::Number(2)),
            capacity_2nd: Some(CapacityCode::Number(-1)),
        });
        let row = normalize(&raw).unwrap();
        assert_eq!(row.occupancy_1st, Occupancy::Medium);
        assert_eq!(row.occupancy_2nd, Occupancy::Unknown);
    }

    #[test]
    fn test_unknown_capacity_code_fails() {
        let mut raw = connection(vec![section(Some("IR"))]);
        raw.index = 4;
        raw.from.prognosis = Some(RawPrognosis {
            capacity_1st: None,
            capacity_2nd: Some(CapacityCode::Text("9".to_string())),
        });
        match normalize(&raw).unwrap_err() {
            FahrplanError::UnknownOccupancy { index, field, code } => {
                assert_eq!(index, 4);
                assert_eq!(field, "capacity2nd");
                assert_eq!(code, "9");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_sections_is_an_error() {
        let err = normalize(&connection(Vec::new())).unwrap_err();
        assert!(matches!(
            err,
            FahrplanError::MissingField {
                field: "sections",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let a = parse_timestamp(Some("2012-03-31T13:55:00+0200"), 1, "t").unwrap();
        let b = parse_timestamp(Some("2012-03-31T13:55:00+02:00"), 1, "t").unwrap();
        let c = parse_timestamp(Some("2012-03-31 13:55:00+0200"), 1, "t").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_parse_timestamp_errors() {
        assert!(matches!(
            parse_timestamp(None, 2, "to.arrival"),
            Err(FahrplanError::MissingField {
                index: 2,
                field: "to.arrival"
            })
        ));
        assert!(matches!(
            parse_timestamp(Some("tomorrow"), 2, "to.arrival"),
            Err(FahrplanError::InvalidTimestamp { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_change_count_is_sections_minus_one(
            categories in proptest::collection::vec(proptest::option::of("[A-Z]{0,3}"), 1..8)
        ) {
            let sections: Vec<RawSection> =
                categories.iter().map(|c| section(c.as_deref())).collect();
            let row = normalize(&connection(sections)).unwrap();
            prop_assert_eq!(row.change_count, (categories.len() - 1).to_string());
        }

        #[test]
        fn prop_travel_with_has_no_empty_entries(
            categories in proptest::collection::vec(proptest::option::of("[A-Z]{0,3}"), 1..8)
        ) {
            let sections: Vec<RawSection> =
                categories.iter().map(|c| section(c.as_deref())).collect();
            let joined = travel_with(&sections);
            if !joined.is_empty() {
                prop_assert!(joined.split(", ").all(|mode| !mode.is_empty()));
            }
        }
    }
}
