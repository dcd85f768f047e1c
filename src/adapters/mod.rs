// Adapters layer: concrete implementations of domain ports.

pub mod process;
