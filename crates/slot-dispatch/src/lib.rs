//! slot-dispatch: one pass from utterance text to slot table and device
//!
//! [`Dispatcher`] owns the slot table and runs classify, parse, canonicalize,
//! apply, translate and emit for each request. [`RequestRunner`] gives each
//! request its own task with a bounded wait, and [`VoiceSession`] adds speech
//! capture and spoken feedback around it.

mod result;
pub use result::{DispatchError, DispatchResult, ErrorKind, Outcome};

mod dispatcher;
pub use dispatcher::{Dispatcher, DispatcherConfig};

mod runner;
pub use runner::RequestRunner;

mod session;
pub use session::VoiceSession;
