use std::time::Duration;

use survey_common::ReferenceServer;

use crate::error::ThroughputError;

pub const DEFAULT_TRIALS: usize = 3;
pub const DEFAULT_TRIAL_PAUSE: Duration = Duration::from_secs(1);

pub trait ThroughputProvider {
    /// Pick the endpoint every later trial runs against.
    fn select_reference_server(&mut self) -> Result<ReferenceServer, ThroughputError>;

    /// One download transfer against the selected server, in Mbps.
    fn download_trial(&mut self) -> Result<f64, ThroughputError>;

    /// One upload transfer against the selected server, in Mbps.
    fn upload_trial(&mut self) -> Result<f64, ThroughputError>;

    /// Mean download rate of `trials` sequential transfers.
    fn measure_download(&mut self, trials: usize, pause: Duration) -> Result<f64, ThroughputError> {
        mean_of_trials(trials, pause, || self.download_trial())
    }

    /// Mean upload rate of `trials` sequential transfers.
    fn measure_upload(&mut self, trials: usize, pause: Duration) -> Result<f64, ThroughputError> {
        mean_of_trials(trials, pause, || self.upload_trial())
    }
}

/// Run `trial` `trials` times with `pause` between runs and average the
/// results. Zero trials average to 0.0.
pub fn mean_of_trials<E>(
    trials: usize,
    pause: Duration,
    mut trial: impl FnMut() -> Result<f64, E>,
) -> Result<f64, E> {
    if trials == 0 {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for run in 0..trials {
        if run > 0 && !pause.is_zero() {
            std::thread::sleep(pause);
        }
        total += trial()?;
    }

    Ok(total / trials as f64)
}
