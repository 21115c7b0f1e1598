/// PNG encoding and export destinations.
pub mod png;
