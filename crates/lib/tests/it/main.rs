/*! Integration tests for ScholarAI.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * - provider: adapters against a local mock of each provider's HTTP API
 * - orchestrator: retry and backoff timing over a real adapter
 * - server: the `/api/gemini` surface end to end
 * - client: backend calls and the direct-call escape hatch
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("scholarai=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod client;
mod helpers;
mod orchestrator;
mod provider;
mod server;
