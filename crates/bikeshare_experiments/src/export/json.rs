use std::fs::File;
use std::io::BufWriter;

use crate::error::ExperimentError;
use crate::metrics::SimulationResult;

pub(crate) fn export_to_json_impl(
    results: &[SimulationResult],
    file: File,
) -> Result<(), ExperimentError> {
    serde_json::to_writer_pretty(BufWriter::new(file), results)?;
    Ok(())
}
