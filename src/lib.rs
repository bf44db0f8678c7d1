pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod data;
pub mod train;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use math::vector::argmax;
pub use activation::sigmoid::Sigmoid;
pub use layers::dense::Layer;
pub use network::{ForwardPass, Network, DEFAULT_LEARNING_RATE};
pub use loss::mse::MseLoss;
pub use optim::sgd::Sgd;
pub use data::{Dataset, MnistLoader};
pub use train::{train_loop, train_network, EpochStats, TrainConfig};
