mod edns;
mod orchestrator;

pub use edns::force_udp_size;
pub use orchestrator::{Orchestrator, ReplaySettings};
