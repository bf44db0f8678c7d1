pub mod forward_pass;
pub mod network;

pub use forward_pass::ForwardPass;
pub use network::{Network, DEFAULT_LEARNING_RATE};
