//! Example binary demonstrating the libpod_pods library.
//!
//! Runs one pod operation and prints its outcome. Streaming operations print
//! one JSON event per line until the connection closes or Ctrl-C is pressed.
//!
//! ## Usage
//!
//! 1. Create a `.env` file with your configuration (`LIBPOD_URL`, ...)
//! 2. Run: `cargo run -- <pod-id> [operation]` (default operation: `inspect`)
//!
//! The pod ID may also come from `LIBPOD_POD_ID`.

#![allow(clippy::print_stdout)] // Allow println! in the binary example

use futures::StreamExt;
use libpod_pods::{CallOptions, CancellationToken, LibpodClient, LibpodError, PodOperation, PodResponse};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let pod_id = match args.next() {
        Some(id) => id,
        None => std::env::var("LIBPOD_POD_ID").map_err(|_| LibpodError::MissingEnv("LIBPOD_POD_ID"))?,
    };
    let operation = match args.next() {
        Some(name) => name.parse::<PodOperation>()?,
        None => PodOperation::Inspect,
    };

    let client = LibpodClient::from_env()?;
    let pod = client.pod(pod_id);

    // Ctrl-C cancels the call, and the stream if one is open.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    println!("{operation} {pod:?}");
    let options = CallOptions::new().with_cancel(cancel);

    match pod.call(operation, Some(options)).await {
        Ok(PodResponse::Payload(value)) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Ok(PodResponse::Stream(stream)) => {
            let mut events = stream.json_lines();
            while let Some(event) = events.next().await {
                match event {
                    Ok(value) => println!("{value}"),
                    Err(LibpodError::Cancelled) => break,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Err(LibpodError::Cancelled) => println!("cancelled"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
