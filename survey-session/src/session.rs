//! Survey session: one reference server, one log file and any number of
//! measurement cycles.
//!
//! ```text
//! Created -> ServerSelected -> Idle <-> Sampling
//!                                 \-> Closed
//! ```

use std::path::PathBuf;
use std::time::Duration;

use survey_common::time::now_local;
use survey_common::{Interrupt, LinkSnapshot, Position, ReferenceServer, Sample, ThroughputResult};
use survey_gps::{PositionError, PositionProvider, DEFAULT_MAX_ATTEMPTS};
use survey_radio::{LinkStateProvider, NeighborScanner};
use survey_speed::provider::{DEFAULT_TRIALS, DEFAULT_TRIAL_PAUSE};
use survey_speed::{ReachabilityProbe, ThroughputProvider};

use crate::error::SessionError;
use crate::logfile::{LogMode, SessionLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    ServerSelected,
    Idle,
    Sampling,
    Closed,
}

/// Where the session log goes.
#[derive(Debug, Clone)]
pub struct LogTarget {
    pub dir: PathBuf,
    pub user: String,
    pub mode: LogMode,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub interface: String,
    pub trials: usize,
    pub trial_pause: Duration,
    pub max_fix_attempts: usize,
    pub log: LogTarget,
}

impl SessionConfig {
    pub fn new(interface: impl Into<String>, log: LogTarget) -> Self {
        Self {
            interface: interface.into(),
            trials: DEFAULT_TRIALS,
            trial_pause: DEFAULT_TRIAL_PAUSE,
            max_fix_attempts: DEFAULT_MAX_ATTEMPTS,
            log,
        }
    }
}

/// Measurement capabilities a session drives.
pub struct Providers {
    pub link: Box<dyn LinkStateProvider + Send>,
    pub position: Box<dyn PositionProvider + Send>,
    pub throughput: Box<dyn ThroughputProvider + Send>,
    pub reachability: Box<dyn ReachabilityProbe + Send>,
    pub scanner: NeighborScanner,
}

pub struct Session {
    config: SessionConfig,
    providers: Providers,
    interrupt: Interrupt,
    server: ReferenceServer,
    log: Option<SessionLog>,
    state: SessionState,
}

impl Session {
    /// Select the reference server, verify the position source and open the
    /// log. Any failure here ends the session before the first sample.
    pub fn start(
        config: SessionConfig,
        providers: Providers,
        interrupt: Interrupt,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            config,
            providers,
            interrupt,
            server: ReferenceServer::default(),
            log: None,
            state: SessionState::Created,
        };

        session.select_server()?;
        session.open_log()?;

        Ok(session)
    }

    fn select_server(&mut self) -> Result<(), SessionError> {
        self.expect_state(SessionState::Created)?;

        let server = self
            .providers
            .throughput
            .select_reference_server()
            .map_err(SessionError::ReferenceServerSelection)?;

        log::info!(
            "Reference server {} ({}), {:.2} ms",
            server.name,
            server.url,
            server.latency_ms
        );

        self.server = server;
        self.state = SessionState::ServerSelected;
        Ok(())
    }

    fn open_log(&mut self) -> Result<(), SessionError> {
        self.expect_state(SessionState::ServerSelected)?;

        self.providers
            .position
            .check_source()
            .map_err(position_source_error)?;

        let target = &self.config.log;
        let log = SessionLog::create(&target.dir, &target.user, &now_local(), target.mode)?;

        self.log = Some(log);
        self.state = SessionState::Idle;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn server(&self) -> &ReferenceServer {
        &self.server
    }

    pub fn log(&self) -> Option<&SessionLog> {
        self.log.as_ref()
    }

    /// Run one measurement cycle.
    ///
    /// Only an unavailable position source and an operator interrupt fail the
    /// cycle; both close the session. Every other failure degrades the
    /// affected fields to their defaults.
    pub fn collect(&mut self) -> Result<Sample, SessionError> {
        self.expect_state(SessionState::Idle)?;
        self.state = SessionState::Sampling;

        match self.run_cycle() {
            Ok(sample) => {
                self.state = SessionState::Idle;
                Ok(sample)
            }
            Err(e) => {
                self.shutdown();
                Err(e)
            }
        }
    }

    fn run_cycle(&mut self) -> Result<Sample, SessionError> {
        let timestamp = now_local();
        let interface = self.config.interface.clone();

        let link = self.providers.link.poll(&interface);
        self.check_interrupt()?;

        let position = self.fix_or_sentinel()?;
        self.check_interrupt()?;

        let throughput = self.measure_throughput(&link);
        self.check_interrupt()?;

        let candidate = self.providers.scanner.find_better_candidate(&link, &interface);
        self.check_interrupt()?;

        Ok(Sample {
            timestamp,
            link,
            position,
            throughput,
            candidate,
        })
    }

    /// Append a collected sample to the session log.
    pub fn record(&mut self, sample: &Sample) -> Result<(), SessionError> {
        self.expect_state(SessionState::Idle)?;

        match self.log.as_mut() {
            Some(log) => Ok(log.append(sample)?),
            None => Err(SessionError::InvalidState(self.state)),
        }
    }

    /// Current link state, outside a measurement cycle.
    pub fn link_snapshot(&mut self) -> Result<LinkSnapshot, SessionError> {
        self.expect_state(SessionState::Idle)?;
        Ok(self.providers.link.poll(&self.config.interface))
    }

    /// Standalone fix attempt, outside a measurement cycle. `None` when no
    /// fix could be obtained.
    pub fn acquire_position(&mut self) -> Result<Option<Position>, SessionError> {
        self.expect_state(SessionState::Idle)?;

        match self.fix_or_sentinel() {
            Ok(position) => Ok((!position.is_no_fix()).then_some(position)),
            Err(e) => {
                self.shutdown();
                Err(e)
            }
        }
    }

    /// Release the log and close the session. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Some(mut session_log) = self.log.take() {
            if let Err(e) = session_log.finish() {
                log::error!("Failed to close session log: {}", e);
            }
        }

        log::info!("Session on {} closed", self.config.interface);
        self.state = SessionState::Closed;
    }

    /// An interrupt raised while the fix is being acquired belongs to the
    /// acquisition: it is consumed here and the fix is recorded as missing.
    fn fix_or_sentinel(&mut self) -> Result<Position, SessionError> {
        let result = self.providers.position.acquire_fix(self.config.max_fix_attempts);
        let interrupted = self.interrupt.take();

        match result {
            Err(PositionError::SourceUnavailable(reason)) => {
                Err(SessionError::SourceUnavailable(reason))
            }
            Ok(_) if interrupted => {
                log::warn!("No position fix: position acquisition interrupted");
                Ok(Position::NO_FIX)
            }
            Ok(position) => Ok(position),
            Err(e) => {
                log::warn!("No position fix: {}", e);
                Ok(Position::NO_FIX)
            }
        }
    }

    fn measure_throughput(&mut self, link: &LinkSnapshot) -> ThroughputResult {
        if !link.is_associated() {
            log::warn!(
                "{} is not associated, skipping throughput test",
                self.config.interface
            );
            return ThroughputResult::skipped(&self.server);
        }

        if !self.providers.reachability.is_reachable() {
            log::warn!("Network unreachable, skipping throughput test");
            return ThroughputResult::skipped(&self.server);
        }

        let trials = self.config.trials;
        let pause = self.config.trial_pause;

        let download_mbps = self
            .providers
            .throughput
            .measure_download(trials, pause)
            .unwrap_or_else(|e| {
                log::warn!("Download test failed: {}", e);
                0.0
            });

        let upload_mbps = self
            .providers
            .throughput
            .measure_upload(trials, pause)
            .unwrap_or_else(|e| {
                log::warn!("Upload test failed: {}", e);
                0.0
            });

        ThroughputResult {
            download_mbps,
            upload_mbps,
            server: self.server.clone(),
        }
    }

    fn check_interrupt(&self) -> Result<(), SessionError> {
        if self.interrupt.is_raised() {
            return Err(SessionError::Interrupted);
        }
        Ok(())
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state != expected {
            return Err(SessionError::InvalidState(self.state));
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn position_source_error(e: PositionError) -> SessionError {
    match e {
        PositionError::SourceUnavailable(reason) => SessionError::SourceUnavailable(reason),
        other => SessionError::SourceUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::{self, BufReader, Cursor, Read};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use survey_common::AssociatedLink;
    use survey_gps::transport::{ReportStream, Transport};
    use survey_gps::GpsdProvider;
    use survey_radio::scan::any_network;
    use survey_radio::{NeighborScan, RadioError, VisibleAccessPoint};
    use survey_speed::ThroughputError;

    use super::*;
    use crate::logfile::LogRow;

    const BSSID: &str = "A0:B1:C2:D3:E4:F5";

    fn associated_link() -> AssociatedLink {
        AssociatedLink {
            ssid: "eduroam".into(),
            bssid: BSSID.into(),
            rssi: -60,
            quality: 50,
            frequency: 2.437,
            bitrate: 72.2,
        }
    }

    struct FixedLink(Option<AssociatedLink>);

    impl LinkStateProvider for FixedLink {
        fn query_link(&mut self, _interface: &str) -> Result<Option<AssociatedLink>, RadioError> {
            Ok(self.0.clone())
        }
    }

    struct ScriptedPosition {
        source_up: Arc<AtomicBool>,
        fixes: VecDeque<Result<Position, PositionError>>,
        calls: Arc<AtomicUsize>,
    }

    impl PositionProvider for ScriptedPosition {
        fn check_source(&mut self) -> Result<(), PositionError> {
            if self.source_up.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(PositionError::SourceUnavailable(
                    "Missing ADB port forward".into(),
                ))
            }
        }

        fn acquire_fix(&mut self, max_attempts: usize) -> Result<Position, PositionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_source()?;
            self.fixes
                .pop_front()
                .unwrap_or(Err(PositionError::LockFailure {
                    attempts: max_attempts,
                }))
        }
    }

    struct FakeSpeed {
        select_ok: bool,
        selections: Arc<AtomicUsize>,
        trials: Arc<AtomicUsize>,
        fail_upload: bool,
        interrupt_on_trial: Option<Interrupt>,
    }

    impl ThroughputProvider for FakeSpeed {
        fn select_reference_server(&mut self) -> Result<ReferenceServer, ThroughputError> {
            self.selections.fetch_add(1, Ordering::SeqCst);
            if !self.select_ok {
                return Err(ThroughputError::ServerSelection("no servers".into()));
            }
            Ok(ReferenceServer {
                name: "Chicago, IL".into(),
                url: "http://speed.example.net/upload.php".into(),
                latency_ms: 12.0,
            })
        }

        fn download_trial(&mut self) -> Result<f64, ThroughputError> {
            let run = self.trials.fetch_add(1, Ordering::SeqCst);
            if let Some(interrupt) = &self.interrupt_on_trial {
                interrupt.raise();
            }
            Ok(40.0 + 10.0 * run as f64)
        }

        fn upload_trial(&mut self) -> Result<f64, ThroughputError> {
            self.trials.fetch_add(1, Ordering::SeqCst);
            if self.fail_upload {
                return Err(ThroughputError::NoServerSelected);
            }
            Ok(12.5)
        }
    }

    struct FixedReachability(bool);

    impl ReachabilityProbe for FixedReachability {
        fn is_reachable(&mut self) -> bool {
            self.0
        }
    }

    struct FixedScan(Vec<VisibleAccessPoint>);

    impl NeighborScan for FixedScan {
        fn scan(
            &mut self,
            _interface: &str,
            filter: &dyn Fn(&VisibleAccessPoint) -> bool,
        ) -> Result<Vec<VisibleAccessPoint>, RadioError> {
            Ok(self.0.iter().filter(|ap| filter(ap)).cloned().collect())
        }
    }

    /// gpsd stream whose reads raise the operator interrupt, as if the signal
    /// arrived while the provider was blocked on the daemon.
    struct InterruptingRead {
        interrupt: Interrupt,
        data: Cursor<Vec<u8>>,
    }

    impl Read for InterruptingRead {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt.raise();
            self.data.read(buf)
        }
    }

    struct InterruptingTransport {
        interrupt: Interrupt,
        lines: &'static str,
    }

    impl Transport for InterruptingTransport {
        fn open(&mut self) -> io::Result<ReportStream> {
            Ok(Box::new(BufReader::new(InterruptingRead {
                interrupt: self.interrupt.clone(),
                data: Cursor::new(self.lines.as_bytes().to_vec()),
            })))
        }
    }

    struct Harness {
        link: Option<AssociatedLink>,
        source_up: Arc<AtomicBool>,
        fixes: Vec<Result<Position, PositionError>>,
        fix_calls: Arc<AtomicUsize>,
        select_ok: bool,
        selections: Arc<AtomicUsize>,
        trials: Arc<AtomicUsize>,
        fail_upload: bool,
        interrupt_on_trial: bool,
        reachable: bool,
        neighbours: Vec<VisibleAccessPoint>,
        interrupt: Interrupt,
        dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                link: Some(associated_link()),
                source_up: Arc::new(AtomicBool::new(true)),
                fixes: vec![Ok(Position::new(40.4237, -86.9212))],
                fix_calls: Arc::new(AtomicUsize::new(0)),
                select_ok: true,
                selections: Arc::new(AtomicUsize::new(0)),
                trials: Arc::new(AtomicUsize::new(0)),
                fail_upload: false,
                interrupt_on_trial: false,
                reachable: true,
                neighbours: vec![VisibleAccessPoint {
                    bssid: "11:22:33:44:55:66".into(),
                    ssid: "eduroam".into(),
                    rssi: -48,
                    quality: 62,
                    frequency: 2.462,
                }],
                interrupt: Interrupt::new(),
                dir: tempfile::tempdir().expect("temp dir"),
            }
        }

        fn config(&self) -> SessionConfig {
            let mut config = SessionConfig::new(
                "wlan0",
                LogTarget {
                    dir: self.dir.path().to_path_buf(),
                    user: "tester".into(),
                    mode: LogMode::Lenient,
                },
            );
            config.trial_pause = Duration::ZERO;
            config
        }

        fn start(&self) -> Result<Session, SessionError> {
            self.start_with_position(Box::new(ScriptedPosition {
                source_up: self.source_up.clone(),
                fixes: self.fixes.iter().map(clone_fix).collect(),
                calls: self.fix_calls.clone(),
            }))
        }

        fn start_with_position(
            &self,
            position: Box<dyn PositionProvider + Send>,
        ) -> Result<Session, SessionError> {
            let providers = Providers {
                link: Box::new(FixedLink(self.link.clone())),
                position,
                throughput: Box::new(FakeSpeed {
                    select_ok: self.select_ok,
                    selections: self.selections.clone(),
                    trials: self.trials.clone(),
                    fail_upload: self.fail_upload,
                    interrupt_on_trial: self.interrupt_on_trial.then(|| self.interrupt.clone()),
                }),
                reachability: Box::new(FixedReachability(self.reachable)),
                scanner: NeighborScanner::new(
                    Box::new(FixedScan(self.neighbours.clone())),
                    any_network(),
                ),
            };

            Session::start(self.config(), providers, self.interrupt.clone())
        }

        fn log_files(&self) -> usize {
            std::fs::read_dir(self.dir.path())
                .expect("temp dir listing")
                .count()
        }
    }

    fn clone_fix(fix: &Result<Position, PositionError>) -> Result<Position, PositionError> {
        match fix {
            Ok(position) => Ok(*position),
            Err(PositionError::LockFailure { attempts }) => {
                Err(PositionError::LockFailure { attempts: *attempts })
            }
            Err(PositionError::SourceUnavailable(reason)) => {
                Err(PositionError::SourceUnavailable(reason.clone()))
            }
            Err(PositionError::Interrupted) => Err(PositionError::Interrupted),
        }
    }

    #[test]
    fn start_opens_log_with_header() {
        let harness = Harness::new();
        let session = harness.start().expect("session started");

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.server().name, "Chicago, IL");

        let log = session.log().expect("open log");
        let contents = std::fs::read_to_string(log.path()).expect("log contents");
        assert!(contents.starts_with("time,ssid,bssid,"));
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn server_selection_failure_is_fatal() {
        let mut harness = Harness::new();
        harness.select_ok = false;

        assert!(matches!(
            harness.start(),
            Err(SessionError::ReferenceServerSelection(_))
        ));
        assert_eq!(harness.log_files(), 0);
    }

    #[test]
    fn dead_position_source_blocks_start() {
        let harness = Harness::new();
        harness.source_up.store(false, Ordering::SeqCst);

        match harness.start() {
            Err(SessionError::SourceUnavailable(reason)) => assert!(reason.contains("ADB")),
            other => panic!("unexpected result: {:?}", other.map(|s| s.state())),
        }
        assert_eq!(harness.log_files(), 0);
    }

    #[test]
    fn full_cycle_is_logged() {
        let harness = Harness::new();
        let mut session = harness.start().expect("session started");

        let sample = session.collect().expect("sample collected");
        assert_eq!(session.state(), SessionState::Idle);

        assert_eq!(sample.link.bssid(), BSSID);
        assert_eq!(sample.position, Position::new(40.4237, -86.9212));
        assert_eq!(sample.throughput.download_mbps, 50.0);
        assert_eq!(sample.throughput.upload_mbps, 12.5);
        assert_eq!(sample.throughput.server.name, "Chicago, IL");
        assert_eq!(sample.candidate.bssid, "11:22:33:44:55:66");
        assert_eq!(sample.candidate.rssi, -48);

        session.record(&sample).expect("sample recorded");

        let path = session.log().expect("open log").path().to_path_buf();
        session.shutdown();

        let mut reader = csv::Reader::from_path(path).expect("log readable");
        let rows: Vec<LogRow> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("rows parsed");
        assert_eq!(rows, vec![LogRow::from(&sample)]);
    }

    #[test]
    fn degraded_cycle_still_produces_a_sample() {
        let mut harness = Harness::new();
        harness.link = None;
        harness.fixes = vec![Err(PositionError::LockFailure { attempts: 15 })];
        harness.reachable = false;
        let mut session = harness.start().expect("session started");

        let sample = session.collect().expect("sample collected");

        assert!(!sample.link.is_associated());
        assert_eq!(sample.link.rssi(), 0);
        assert!(sample.position.is_no_fix());
        assert_eq!(sample.throughput.download_mbps, 0.0);
        assert_eq!(sample.throughput.upload_mbps, 0.0);
        assert_eq!(sample.throughput.server.url, "http://speed.example.net/upload.php");
        assert!(sample.candidate.is_none());
        assert_eq!(harness.trials.load(Ordering::SeqCst), 0);

        session.record(&sample).expect("sample recorded");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.log().expect("open log").rows(), 1);
    }

    #[test]
    fn unassociated_station_skips_throughput_even_if_reachable() {
        let mut harness = Harness::new();
        harness.link = None;
        let mut session = harness.start().expect("session started");

        let sample = session.collect().expect("sample collected");

        assert_eq!(sample.throughput, ThroughputResult::skipped(session.server()));
        assert_eq!(harness.trials.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unreachable_network_skips_throughput() {
        let mut harness = Harness::new();
        harness.reachable = false;
        let mut session = harness.start().expect("session started");

        let sample = session.collect().expect("sample collected");

        assert_eq!(sample.throughput.download_mbps, 0.0);
        assert_eq!(harness.trials.load(Ordering::SeqCst), 0);
        assert_eq!(sample.candidate.bssid, "11:22:33:44:55:66");
    }

    #[test]
    fn failed_upload_trial_records_zero() {
        let mut harness = Harness::new();
        harness.fail_upload = true;
        let mut session = harness.start().expect("session started");

        let sample = session.collect().expect("sample collected");

        assert_eq!(sample.throughput.download_mbps, 50.0);
        assert_eq!(sample.throughput.upload_mbps, 0.0);
    }

    #[test]
    fn server_is_selected_once_per_session() {
        let mut harness = Harness::new();
        harness.fixes = Vec::new();
        let mut session = harness.start().expect("session started");

        for _ in 0..3 {
            let sample = session.collect().expect("sample collected");
            session.record(&sample).expect("sample recorded");
        }

        assert_eq!(harness.selections.load(Ordering::SeqCst), 1);
        assert_eq!(harness.fix_calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.log().expect("open log").rows(), 3);
    }

    #[test]
    fn lost_position_source_ends_the_session() {
        let harness = Harness::new();
        let mut session = harness.start().expect("session started");

        harness.source_up.store(false, Ordering::SeqCst);

        assert!(matches!(
            session.collect(),
            Err(SessionError::SourceUnavailable(_))
        ));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.log().is_none());
        assert!(matches!(
            session.collect(),
            Err(SessionError::InvalidState(SessionState::Closed))
        ));
    }

    #[test]
    fn interrupt_during_throughput_aborts_cycle() {
        let mut harness = Harness::new();
        harness.interrupt_on_trial = true;
        let mut session = harness.start().expect("session started");

        assert!(matches!(session.collect(), Err(SessionError::Interrupted)));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn interrupted_fix_is_recorded_as_no_fix() {
        let mut harness = Harness::new();
        harness.fixes = vec![Err(PositionError::Interrupted)];
        let mut session = harness.start().expect("session started");

        let sample = session.collect().expect("sample collected");
        assert!(sample.position.is_no_fix());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn standalone_position_and_link_queries() {
        let mut harness = Harness::new();
        harness.fixes = vec![
            Ok(Position::new(1.5, 2.5)),
            Err(PositionError::LockFailure { attempts: 15 }),
        ];
        let mut session = harness.start().expect("session started");

        assert_eq!(
            session.acquire_position().expect("fix attempt"),
            Some(Position::new(1.5, 2.5))
        );
        assert_eq!(session.acquire_position().expect("fix attempt"), None);

        let snapshot = session.link_snapshot().expect("link state");
        assert_eq!(snapshot.ssid(), "eduroam");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let harness = Harness::new();
        let mut session = harness.start().expect("session started");

        session.shutdown();
        session.shutdown();

        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(
            session.link_snapshot(),
            Err(SessionError::InvalidState(SessionState::Closed))
        ));
    }

    #[test]
    fn interrupt_inside_fix_read_keeps_the_session_open() {
        let harness = Harness::new();
        let transport = InterruptingTransport {
            interrupt: harness.interrupt.clone(),
            lines: "{\"class\":\"TPV\",\"mode\":3,\"lat\":40.4237,\"lon\":-86.9212}\n",
        };
        let gpsd = GpsdProvider::new(Box::new(transport), Vec::new(), harness.interrupt.clone());
        let mut session = harness
            .start_with_position(Box::new(gpsd))
            .expect("session started");

        let sample = session.collect().expect("sample collected");

        assert!(sample.position.is_no_fix());
        assert_eq!(sample.throughput.download_mbps, 50.0);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!harness.interrupt.is_raised());

        session.record(&sample).expect("sample recorded");
        assert_eq!(session.log().expect("open log").rows(), 1);
    }

    #[test]
    fn interrupt_during_standalone_fix_is_no_fix() {
        let harness = Harness::new();
        let transport = InterruptingTransport {
            interrupt: harness.interrupt.clone(),
            lines: "{\"class\":\"TPV\",\"mode\":3,\"lat\":1.5,\"lon\":2.5}\n",
        };
        let gpsd = GpsdProvider::new(Box::new(transport), Vec::new(), harness.interrupt.clone());
        let mut session = harness
            .start_with_position(Box::new(gpsd))
            .expect("session started");

        assert_eq!(session.acquire_position().expect("fix attempt"), None);
        assert_eq!(session.state(), SessionState::Idle);
    }
}
