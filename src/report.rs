use std::{cmp::Ordering, fmt::Display};

use itertools::Itertools;

use crate::{
    station_map::{
        StationMapOptions, StationNameKey, StationNameKeyView, StationTable, new_station_map,
    },
    temperature_summary::TemperatureSummary,
};

/// Rounds to one decimal place, halves toward positive infinity.
pub fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Final, rounded min/mean/max of one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRow {
    min: f64,
    mean: f64,
    max: f64,
}

impl ResultRow {
    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl From<&TemperatureSummary> for ResultRow {
    fn from(summary: &TemperatureSummary) -> Self {
        let mean = round1(summary.sum()) / summary.count() as f64;
        ResultRow {
            min: round1(summary.min()),
            mean: round1(mean),
            max: round1(summary.max()),
        }
    }
}

impl Display for ResultRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}/{:.1}/{:.1}", self.min, self.mean, self.max)
    }
}

#[derive(Debug)]
pub struct WeatherStation {
    name: Box<[u8]>,
    row: ResultRow,
}

impl WeatherStation {
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn row(&self) -> &ResultRow {
        &self.row
    }
}

impl PartialEq for WeatherStation {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq(&other.name)
    }
}

impl Eq for WeatherStation {}

impl PartialOrd for WeatherStation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeatherStation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Display for WeatherStation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", String::from_utf8_lossy(&self.name), self.row)
    }
}

/// Folds per-chunk tables into one, keyed by the whitespace-trimmed name.
///
/// The fold order does not matter; names that only differ by surrounding
/// whitespace end up in the same entry.
#[cfg_attr(feature = "profiled", inline(never))]
pub fn merge_tables<I>(tables: I, opts: &StationMapOptions) -> StationTable
where
    I: IntoIterator<Item = StationTable>,
{
    let mut merged = new_station_map::<TemperatureSummary>(opts);
    for table in tables {
        for (name, summary) in table {
            let trimmed = name.as_bytes().trim_ascii();
            if let Some(total) = merged.get_mut(StationNameKeyView::new(trimmed)) {
                total.merge(&summary);
                continue;
            }
            let key = if trimmed.len() == name.as_bytes().len() {
                name
            } else {
                StationNameKey::new(trimmed)
            };
            merged.insert(key, summary);
        }
    }
    merged
}

/// The sorted summary line, `{name=min/mean/max, ...}`.
#[derive(Debug)]
pub struct Report {
    stations: Vec<WeatherStation>,
}

impl Report {
    pub fn from_table(table: StationTable) -> Self {
        let stations = table
            .into_iter()
            .filter(|(_, summary)| !summary.is_empty())
            .map(|(name, summary)| WeatherStation {
                name: name.into_bytes(),
                row: ResultRow::from(&summary),
            })
            .sorted_unstable()
            .collect();
        Report { stations }
    }

    pub fn empty() -> Self {
        Report {
            stations: Vec::new(),
        }
    }

    pub fn stations(&self) -> &[WeatherStation] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.stations.iter().join(", "))
    }
}
