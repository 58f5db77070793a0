use std::sync::{Arc, Mutex};

use bikeshare_core::clock::VirtualTime;
use bikeshare_core::telemetry::ReportSink;

pub type Samples = Arc<Mutex<Vec<(String, f64, f64)>>>;

/// Report sink that copies every sample into a shared vector.
#[derive(Clone, Default)]
pub struct CollectingSink {
    pub samples: Samples,
}

impl ReportSink for CollectingSink {
    fn record(&mut self, label: &str, time: VirtualTime, value: f64) {
        self.samples
            .lock()
            .expect("sink lock")
            .push((label.to_string(), time.as_f64(), value));
    }
}
