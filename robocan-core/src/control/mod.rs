//! Control layer
//!
//! Owns the session and arbitrates between live drive, recording, playback
//! and storage based on button press edges.

pub mod controller;
pub mod events;
pub mod session;
pub mod status;

pub use controller::Controller;
pub use events::{ControlEvent, EventSink};
pub use session::{DeletePress, Mode, Session};
pub use status::{StatusView, MAX_STATUS_LEN};
