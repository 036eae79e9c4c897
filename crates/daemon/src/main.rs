// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demonstration binary: builds a `Kernel`, starts it, and blocks until
//! the reserved `automaton.stop` service is invoked or the process is
//! interrupted. Not a wire protocol or CLI -- it takes no arguments and
//! exposes no socket.

use automaton_daemon::{Kernel, KernelConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let kernel = Kernel::new(KernelConfig::default());
    kernel.start();
    tracing::info!("automaton kernel started");
    kernel.block_till_stopped().await;
    tracing::info!("automaton kernel stopped");
}
