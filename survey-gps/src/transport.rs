use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub type ReportStream = Box<dyn BufRead + Send>;

/// Opens the line-oriented stream a position source reads from.
pub trait Transport {
    fn open(&mut self) -> io::Result<ReportStream>;
}

/// TCP connection to a local daemon or port-forwarded bridge.
pub struct TcpTransport {
    address: String,
    read_timeout: Duration,
    greeting: Option<String>,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            address: address.into(),
            read_timeout,
            greeting: None,
        }
    }

    /// Line written right after connecting, e.g. a gpsd `?WATCH` command.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }
}

impl Transport for TcpTransport {
    fn open(&mut self) -> io::Result<ReportStream> {
        let addr = self
            .address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no address resolved"))?;

        let mut stream = TcpStream::connect_timeout(&addr, self.read_timeout)?;
        stream.set_read_timeout(Some(self.read_timeout))?;

        if let Some(greeting) = &self.greeting {
            stream.write_all(greeting.as_bytes())?;
        }

        log::debug!("Connected to position source at {}", addr);

        Ok(Box::new(BufReader::new(stream)))
    }
}

pub(crate) enum ReadOutcome {
    Line(String),
    Timeout,
    Closed,
    Failed(io::Error),
}

/// Read one report line. A read that times out still counts as an attempt.
pub(crate) fn read_report(stream: &mut ReportStream) -> ReadOutcome {
    let mut line = String::new();
    match stream.read_line(&mut line) {
        Ok(0) => ReadOutcome::Closed,
        Ok(_) => ReadOutcome::Line(line.trim_end().to_string()),
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            ReadOutcome::Timeout
        }
        Err(e) => ReadOutcome::Failed(e),
    }
}
