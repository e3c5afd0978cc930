#![allow(dead_code)]

mod messages;
mod mock_transport;

pub use messages::*;
pub use mock_transport::*;
