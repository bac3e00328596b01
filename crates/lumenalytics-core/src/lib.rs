pub mod error;
pub mod goal;
pub mod metrics;
pub mod ranges;
pub mod record;
pub mod source;
