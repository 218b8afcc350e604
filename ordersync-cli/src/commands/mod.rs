pub mod daemon;
pub mod endpoints;
pub mod sync;
