//! Interchangeable deliverability verifiers, selected by `EMAIL_VERIFIER`.

pub mod http;
pub mod process;
pub mod skip;

pub use http::HttpEmailVerifier;
pub use process::ProcessEmailVerifier;
pub use skip::SkipEmailVerifier;
