//! End-to-end tests for the rescale crates.
//!
//! This crate exercises `rescale-core` and `rescale-ops` together through
//! the public [`PixelSource`](rescale_core::PixelSource) interface. The
//! [`sources`] module holds instrumented sources shared by the tests.

pub mod sources;

#[cfg(test)]
mod config;
#[cfg(test)]
mod resample;
#[cfg(test)]
mod sharpen;
#[cfg(test)]
mod streaming;

/// Installs a `RUST_LOG`-driven subscriber once per test binary.
#[cfg(test)]
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
