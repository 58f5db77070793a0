use std::fs::File;
use std::path::Path;

use crate::error::ExperimentError;
use crate::metrics::SimulationResult;

pub(crate) fn ensure_not_empty(results: &[SimulationResult]) -> Result<(), ExperimentError> {
    if results.is_empty() {
        return Err(ExperimentError::NoResults);
    }
    Ok(())
}

pub(crate) fn create_output_file(path: impl AsRef<Path>) -> Result<File, ExperimentError> {
    Ok(File::create(path)?)
}
