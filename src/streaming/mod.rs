//! Audio streaming (sender side)

mod packetizer;
mod sender;


pub use packetizer::{Packetizer, SenderState};
pub use sender::{SendReport, SenderStats, SenderStream};
