mod exchange;
mod stub;

pub use exchange::exchange;
pub use stub::{StubAnswer, StubResolver};
