pub mod error;
pub mod logfile;
pub mod session;

pub use error::{LogError, SessionError};
pub use logfile::{log_file_name, LogMode, LogRow, SessionLog, COLUMNS};
pub use session::{LogTarget, Providers, Session, SessionConfig, SessionState};
