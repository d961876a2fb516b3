//! Form autofill engine: discover the fillable fields of a page, resolve a
//! value for each (heuristic rules, a user record, or an external value
//! service), and apply it the way a user would.

use tracing_subscriber::EnvFilter;

pub mod apply;
pub mod browser;
pub mod cli;
pub mod dom;
pub mod error;
pub mod field;
pub mod resolve;
pub mod run;
pub mod service;
pub mod trace;

pub use error::FillError;

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("form_autofill={}", default_level)));

    // A second init (tests, embedding) is not an error worth surfacing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
