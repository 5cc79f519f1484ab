use clap::{CommandFactory, Parser};
use std::error::Error;
use std::path::Path;
use std::time::Duration;

use survey_common::{Interrupt, Sample};
use survey_gps::gpsd::GPSD_WATCH;
use survey_gps::liveness::{AdbForward, LivenessCheck, ProcessRunning};
use survey_gps::transport::TcpTransport;
use survey_gps::{GpsdProvider, NmeaProvider, PositionProvider};
use survey_radio::platform::{self, PlatformRadio};
use survey_radio::scan::{ssid_filter, NeighborScanner};
use survey_session::{LogTarget, Providers, Session, SessionConfig, SessionError};
use survey_speed::{SpeedtestClient, TcpProbe};

mod config;
mod menu;
mod signals;

use config::{Config, PositionSource};
use menu::MenuAction;

#[derive(Parser, Debug)]
#[command(name = "bwsurvey")]
#[command(about = "Walk-around WiFi coverage survey with GPS and throughput logging")]
struct Args {
    /// Wireless interface to survey
    interface: String,

    /// Path to bwsurvey.toml
    #[arg(long, short = 'c', default_value = "bwsurvey.toml")]
    config: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let args = Args::parse();

    if !platform::is_wireless_interface(&args.interface) {
        eprintln!("Error: invalid wifi interface {}", args.interface);
        eprintln!("{}", Args::command().render_usage());
        std::process::exit(1);
    }

    let cfg = if Path::new(&args.config).exists() {
        match config::load_config(&args.config) {
            Ok(c) => {
                println!("Loaded config from {}", args.config);
                c
            }
            Err(e) => {
                eprintln!("Error: could not load config file '{}': {}", args.config, e);
                std::process::exit(1);
            }
        }
    } else {
        log::info!("No config at {}, using defaults", args.config);
        Config::default()
    };

    let interrupt = Interrupt::new();
    signals::spawn_listener(interrupt.clone())?;

    let providers = build_providers(&cfg, interrupt.clone())?;
    let session_config = SessionConfig {
        interface: args.interface.clone(),
        trials: cfg.session.trials,
        trial_pause: Duration::from_millis(cfg.session.trial_pause_ms),
        max_fix_attempts: cfg.position.max_attempts,
        log: LogTarget {
            dir: cfg.session.log_dir.clone(),
            user: cfg.session.user.clone(),
            mode: cfg.session.log_mode,
        },
    };

    println!("Selecting reference server. Please be patient.");
    let mut session = match Session::start(session_config, providers, interrupt.clone()) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Session failed to start: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = run(&mut session, &interrupt);

    println!("Shutting down scanner.");
    session.shutdown();

    if let Err(e) = result {
        log::error!("Survey stopped: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn build_providers(cfg: &Config, interrupt: Interrupt) -> Result<Providers, Box<dyn Error>> {
    let position_cfg = &cfg.position;
    let read_timeout = Duration::from_millis(position_cfg.read_timeout_ms);

    let mut checks: Vec<Box<dyn LivenessCheck + Send>> = Vec::new();
    if position_cfg.adb_port != 0 {
        checks.push(Box::new(AdbForward::new(position_cfg.adb_port)));
    }

    let position: Box<dyn PositionProvider + Send> = match position_cfg.source {
        PositionSource::Gpsd => {
            if !position_cfg.daemon_pattern.is_empty() {
                checks.push(Box::new(ProcessRunning::new(position_cfg.daemon_pattern.clone())));
            }
            let transport =
                TcpTransport::new(position_cfg.address(), read_timeout).with_greeting(GPSD_WATCH);
            Box::new(GpsdProvider::new(Box::new(transport), checks, interrupt))
        }
        PositionSource::Nmea => {
            let transport = TcpTransport::new(position_cfg.address(), read_timeout);
            Box::new(
                NmeaProvider::new(Box::new(transport), checks, interrupt)
                    .with_min_consecutive(position_cfg.min_consecutive),
            )
        }
    };

    let reachability = TcpProbe::new(
        cfg.reachability.address.clone(),
        Duration::from_millis(cfg.reachability.timeout_ms),
    );

    Ok(Providers {
        link: Box::new(PlatformRadio::new()),
        position,
        throughput: Box::new(SpeedtestClient::new(cfg.throughput.clone())?),
        reachability: Box::new(reachability),
        scanner: NeighborScanner::new(
            Box::new(PlatformRadio::new()),
            ssid_filter(cfg.target_ssid.clone()),
        ),
    })
}

/// Operator loop. Returns `Ok` on a requested shutdown and `Err` on a fatal
/// failure.
fn run(session: &mut Session, interrupt: &Interrupt) -> Result<(), Box<dyn Error>> {
    let server = session.server();
    println!(
        "Reference server: {} ({:.2} ms)\n{}",
        server.name, server.latency_ms, server.url
    );

    show_link(session)?;
    show_position(session)?;

    loop {
        if interrupt.is_raised() {
            log::warn!("Interrupted, leaving the survey loop");
            return Ok(());
        }

        match menu::prompt(interrupt)? {
            MenuAction::Collect => {
                println!("Running measurement cycle. Please be patient.");
                match session.collect() {
                    Ok(sample) => {
                        session.record(&sample)?;
                        print_sample(&sample);
                        println!("Logged scan results.\n");
                    }
                    Err(SessionError::Interrupted) => {
                        println!("Measurement cycle aborted.");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            MenuAction::RetryFix => show_position(session)?,
            MenuAction::RefreshLink => show_link(session)?,
            MenuAction::Shutdown => return Ok(()),
        }
    }
}

fn show_link(session: &mut Session) -> Result<(), SessionError> {
    let snapshot = session.link_snapshot()?;
    println!("{}", snapshot);
    if !snapshot.is_associated() {
        println!("Not associated. Wait 30 seconds and try to re-scan the WiFi device");
    }
    Ok(())
}

fn show_position(session: &mut Session) -> Result<(), SessionError> {
    match session.acquire_position()? {
        Some(position) => println!("GPS fix:\n{}", position),
        None => println!("Unable to obtain GPS fix.\nTry repositioning phone. Refresh getting GPS"),
    }
    Ok(())
}

fn print_sample(sample: &Sample) {
    println!("{}", sample.link);
    if sample.position.is_no_fix() {
        println!("No GPS fix");
    } else {
        println!("{}", sample.position);
    }
    println!(
        "Download: {:.2} Mbps\nUpload:   {:.2} Mbps",
        sample.throughput.download_mbps, sample.throughput.upload_mbps
    );
    if sample.candidate.is_none() {
        println!("No better AP on the same band");
    } else {
        println!(
            "Better AP: {} rssi={} quality={} freq={} GHz",
            sample.candidate.bssid,
            sample.candidate.rssi,
            sample.candidate.quality,
            sample.candidate.frequency
        );
    }
}
