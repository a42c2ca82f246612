pub mod compare;
pub mod frame;
pub mod obfuscate;
pub mod pool;
pub mod replay;
pub mod resolver;
pub mod transport;
