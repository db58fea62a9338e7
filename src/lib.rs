//! Libpod Pods - typed client for the libpod pod lifecycle REST API.
//!
//! A small library for driving Podman pods over the libpod REST API with:
//! - **Pod handles**: inspect, start, stop, restart, pause, unpause, kill, remove, top, exists
//! - **Stats streaming**: live newline-delimited JSON events from `/stats`
//! - **Status tables**: every response status classified into success or a typed error
//! - **Cancellation**: per-call tokens that abort in-flight requests and streams
//! - **Dual delivery**: await the outcome, or receive it through a callback
//!
//! ## Quick Start
//!
//! Configuration is loaded from environment variables. Create a `.env` file:
//!
//! ```text
//! LIBPOD_URL=http://localhost:8080
//! LIBPOD_API_VERSION=v4.0.0
//! ```
//!
//! Then drive a pod:
//!
//! ```ignore
//! use libpod_pods::{CallOptions, LibpodClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LibpodClient::from_env()?;
//!     let pod = client.pod("web");
//!
//!     pod.start(None).await?;
//!     pod.kill(Some(CallOptions::new().with_query("signal", "SIGTERM"))).await?;
//!
//!     Ok(())
//! }
//! ```

// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy for strict discipline
#![deny(clippy::all)]                 // All standard Clippy lints
#![deny(clippy::pedantic)]            // Very strict Clippy lints
#![deny(clippy::unwrap_used)]         // unwrap() is forbidden
#![deny(clippy::expect_used)]         // expect() is forbidden
#![deny(clippy::panic)]               // panic!() is forbidden
#![deny(clippy::print_stdout)]        // println!() is forbidden in production
#![deny(clippy::todo)]                // TODO is forbidden
#![deny(clippy::unimplemented)]       // unimplemented!() is forbidden
#![deny(clippy::unwrap_in_result)]    // unwrap() in Result is forbidden
#![deny(clippy::module_inception)]    // Module with same name as crate is forbidden
#![deny(clippy::redundant_clone)]     // Useless clones are forbidden
#![deny(clippy::shadow_unrelated)]    // Shadowing unrelated variables is forbidden
#![deny(clippy::too_many_arguments)]  // Limit function arguments
#![deny(clippy::cognitive_complexity)] // Limit cognitive complexity
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Modules
// ============================================================================

/// Client configuration loaded from the environment.
pub mod libpod_config;

/// Error taxonomy shared by all operations.
pub mod libpod_error;

/// Declarative table of pod operations and their status codes.
///
/// Use this module to see which statuses each operation accepts.
pub mod libpod_operation;

/// Per-call options and per-operation defaults.
pub mod libpod_options;

/// Transport seam and the `reqwest` implementation.
///
/// Implement [`Transport`] to run operations over something other than TCP.
pub mod libpod_transport;

/// Response decoding and the stats stream.
pub mod libpod_decoder;

/// Request dispatch and status interpretation.
pub mod libpod_dispatcher;

/// Pod handles and the client factory.
///
/// Use this module for everyday pod management.
pub mod libpod_pod;

/// Typed views of inspect, top and stats payloads.
pub mod libpod_types;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use libpod_config::LibpodClientConfig;
pub use libpod_decoder::PodStream;
pub use libpod_dispatcher::{Dispatcher, PodResponse};
pub use libpod_error::LibpodError;
pub use libpod_operation::{OperationDescriptor, PodOperation, StatusOutcome};
pub use libpod_options::{CallOptions, OperationDefaults};
pub use libpod_pod::{LibpodClient, Pod, PodResult};
pub use libpod_transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
pub use libpod_types::{PodInspect, PodStatsReport, PodTop};
pub use tokio_util::sync::CancellationToken;
