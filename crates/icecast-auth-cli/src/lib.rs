//! Answer Icecast authentication callbacks from a static policy file.
//!
//! The binary reads one request from stdin with [`icecast_auth::AuthHandler`],
//! decides with a [`Policy`] and writes the answer to stdout.

mod policy;

pub use policy::Policy;
