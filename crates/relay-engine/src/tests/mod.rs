//! Engine scenario tests.
//!
//! - `harness.rs`   - mock collaborators and a running engine task
//! - `delivery.rs`  - frames to consumers: fan-out, fallback, throttle, retries
//! - `transport.rs` - reconnect backoff, keep-alive, stale signals
//! - `oauth.rs`     - redirect handling through the engine

mod oauth;
