//! Top-level facade crate for ScrapeLab.
//!
//! Re-exports the registry core and the server library so users can depend
//! on a single crate.

pub mod core {
    pub use scrapelab_core::*;
}

pub mod server {
    pub use scrapelab_server::*;
}
