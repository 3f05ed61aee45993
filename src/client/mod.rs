pub mod session;
pub mod sink;
pub mod transport;
pub mod types;

pub use session::ChatSession;
pub use sink::{DisplaySink, SlotId, TerminalSink, Transcript};
pub use transport::{ApiClient, Transport};
pub use types::{RequestInput, RequestMode, SessionError, TransportError};
