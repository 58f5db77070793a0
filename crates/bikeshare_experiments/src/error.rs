use bikeshare_core::error::KernelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("run {run_id} of experiment '{experiment_id}' failed: {source}")]
    Simulation {
        experiment_id: String,
        run_id: usize,
        #[source]
        source: KernelError,
    },
    #[error("no results to export")]
    NoResults,
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("invalid progress bar template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
