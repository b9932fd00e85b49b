//! Cooperative cancellation of in-flight reviews.

mod token;

pub use token::CancellationToken;
