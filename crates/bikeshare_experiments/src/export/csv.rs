use std::fs::File;

use bikeshare_core::telemetry::TimeSeries;

use crate::error::ExperimentError;
use crate::metrics::SimulationResult;

pub(crate) fn export_to_csv_impl(
    results: &[SimulationResult],
    file: File,
) -> Result<(), ExperimentError> {
    let mut wtr = csv::Writer::from_writer(file);
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_time_series_impl(series: &TimeSeries, file: File) -> Result<(), ExperimentError> {
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(["label", "time", "value"])?;
    for (label, samples) in series.iter() {
        for sample in samples {
            wtr.write_record([
                label.to_string(),
                sample.time.as_f64().to_string(),
                sample.value.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
