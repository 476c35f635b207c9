#![doc = "Core configuration, error and randomness types for the degbench harness."]

pub mod config;
pub mod errors;
pub mod rng;

pub use config::{
    Alphabet, ExperimentConfig, LayoutConfig, PairingPolicy, ParameterGrid, SeedPolicy,
    ToolConfig,
};
pub use errors::{DegError, ErrorInfo};
pub use rng::{derive_substream_seed, RngHandle};
