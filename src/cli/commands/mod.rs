pub mod fan_in;
pub mod fan_out;

pub use fan_in::*;
pub use fan_out::*;
