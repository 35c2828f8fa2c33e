/*! Integration tests for Squad.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - guard: Tests for route protection over HTTP
 * - cache: Tests for the shared backend cache
 * - backend: Tests for the Apps Script client against a local upstream
 * - server: Tests for the JSON API, session endpoints and pages
 * - store: Tests for loading a representative's profile
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("squad=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod backend;
mod cache;
mod server;
mod store;
