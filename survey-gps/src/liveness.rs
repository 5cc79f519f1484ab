use std::process::Command;

/// Precondition that must hold before a position source is used.
pub trait LivenessCheck {
    fn name(&self) -> &str;

    fn check(&self) -> Result<(), String>;
}

/// The ADB port forward that bridges the phone's GPS feed to localhost.
pub struct AdbForward {
    port: u16,
}

impl AdbForward {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl LivenessCheck for AdbForward {
    fn name(&self) -> &str {
        "adb forward"
    }

    fn check(&self) -> Result<(), String> {
        let listing = command_stdout("adb", &["forward", "--list"])?;
        if forward_listed(&listing, self.port) {
            Ok(())
        } else {
            Err(format!("Missing ADB port forward tcp:{}", self.port))
        }
    }
}

/// A process whose command line contains `pattern`, e.g. "gpsd tcp".
pub struct ProcessRunning {
    pattern: String,
}

impl ProcessRunning {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl LivenessCheck for ProcessRunning {
    fn name(&self) -> &str {
        &self.pattern
    }

    fn check(&self) -> Result<(), String> {
        let processes = command_stdout("ps", &["ax"])?;
        if processes.contains(&self.pattern) {
            Ok(())
        } else {
            Err(format!("Missing or invalid '{}' process", self.pattern))
        }
    }
}

fn command_stdout(program: &str, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        return Err(format!("{} {} exited with {}", program, args.join(" "), output.status));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `adb forward --list` prints "<serial> tcp:<local> tcp:<remote>" per forward.
fn forward_listed(listing: &str, port: u16) -> bool {
    let forward = format!("tcp:{} tcp:{}", port, port);
    listing.lines().any(|line| line.trim_end().ends_with(&forward))
}
