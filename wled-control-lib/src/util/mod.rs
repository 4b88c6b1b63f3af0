pub mod effects;
pub mod traits;
