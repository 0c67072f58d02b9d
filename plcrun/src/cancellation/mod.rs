//! Cooperative cancellation for user interrupts.

mod signal;
mod token;

pub use signal::listen_for_interrupts;
pub use token::CancellationToken;
