//! Hyperbolic API client module.

mod hyperbolic;
mod prompt;
mod provider;
mod throttle;

pub use hyperbolic::*;
pub use prompt::*;
pub use provider::*;
pub use throttle::*;
