//! Hardware abstraction traits
//!
//! These traits define the interface between the recording/playback logic
//! and the board it runs on.

pub mod channel;
pub mod clock;
pub mod input;

pub use channel::{Channel, ChannelDriver, Direction, InvalidDirection};
pub use clock::Clock;
pub use input::InputSource;
