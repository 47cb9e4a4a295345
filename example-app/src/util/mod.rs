pub mod json;
pub mod trace;

pub use trace::RequestTrace;
