//! Utility functions and types

pub mod data_loader;

pub use data_loader::{column_names, frame_to_matrix, DataLoader};
