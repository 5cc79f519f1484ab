use clap::Parser;
use survey_radio::{
    platform::{self, PlatformRadio},
    radio::LinkStateProvider,
    scan::{any_network, ssid_filter, NeighborScanner},
};

#[derive(Parser, Debug)]
#[command(name = "link-probe")]
#[command(about = "Poll the WiFi link and look for a better access point")]
struct Args {
    /// Wireless interface
    interface: String,

    /// Only consider neighbours broadcasting this SSID
    #[arg(long, short = 's')]
    ssid: Option<String>,

    /// Delay between polls
    #[arg(long, short = 'i', default_value_t = 2000)]
    interval_ms: u64,

    /// Skip the neighbour scan (it needs root)
    #[arg(long)]
    no_scan: bool,

    /// Print one JSON object per poll
    #[arg(long)]
    json: bool,
}

fn main() {
    simple_logger::SimpleLogger::new().env().init().ok();

    let args = Args::parse();

    if !platform::is_wireless_interface(&args.interface) {
        eprintln!("Error: invalid wifi interface {}", args.interface);
        std::process::exit(1);
    }

    log::info!("Start Link Probe on {}", args.interface);

    let mut radio = PlatformRadio::new();
    let filter = match &args.ssid {
        Some(ssid) => ssid_filter(ssid.clone()),
        None => any_network(),
    };
    let mut scanner = NeighborScanner::new(Box::new(PlatformRadio::new()), filter);

    let mut counter = 0u64;
    loop {
        let snapshot = radio.poll(&args.interface);
        let candidate = if args.no_scan {
            Default::default()
        } else {
            scanner.find_better_candidate(&snapshot, &args.interface)
        };

        counter += 1;
        if args.json {
            let line = serde_json::json!({
                "poll": counter,
                "link": snapshot,
                "better_ap": candidate,
            });
            println!("{}", line);
        } else {
            println!("[{:6}]\n{}", counter, snapshot);
            if candidate.is_none() {
                println!("No better AP on the same band\n");
            } else {
                println!(
                    "Better AP: {} rssi={} quality={} freq={} GHz\n",
                    candidate.bssid, candidate.rssi, candidate.quality, candidate.frequency
                );
            }
        }

        std::thread::sleep(std::time::Duration::from_millis(args.interval_ms));
    }
}
