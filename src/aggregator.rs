use crate::{
    chunk::Chunk,
    error::BrcResult,
    parser::{Record, RecordCursor},
    station_map::{
        StationMapOptions, StationNameKey, StationNameKeyView, StationTable, new_station_map,
    },
    temperature_summary::TemperatureSummary,
};

/// Parses every record in `chunk` into a fresh table.
///
/// Station names are copied only the first time a station shows up in this
/// chunk. Stops at the first malformed record.
#[cfg_attr(feature = "profiled", inline(never))]
pub fn aggregate_chunk(chunk: Chunk<'_>, opts: &StationMapOptions) -> BrcResult<StationTable> {
    let mut temperatures = new_station_map::<TemperatureSummary>(opts);
    let mut cursor = RecordCursor::new(chunk.bytes(), chunk.start());

    while let Some(Record {
        station,
        temperature,
    }) = cursor.next_record()?
    {
        if let Some(summary) = temperatures.get_mut(StationNameKeyView::new(station)) {
            summary.add_reading(temperature);
        } else {
            temperatures.insert(
                StationNameKey::new(station),
                TemperatureSummary::of(temperature),
            );
        }
    }

    Ok(temperatures)
}
