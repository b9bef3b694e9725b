//! APU channel implementations

pub mod pulse;
pub mod triangle;

pub use pulse::PulseChannel;
pub use triangle::TriangleChannel;
