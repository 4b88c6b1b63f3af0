pub mod brightness;
pub mod color;
pub mod progress;
pub mod segment;
