//! Async wrapper around [`Harvester`] for use in async runtimes (Tokio, etc.).
//!
//! A harvest is a long, strictly sequential run of blocking requests and
//! sleeps. The wrapper moves the whole run onto Tokio's blocking thread pool
//! via [`tokio::task::spawn_blocking`], keeping the async event loop free.
//! It does not add any concurrency to the run itself.
//!
//! # Example
//!
//! ```no_run
//! use ladder_harvest::{AsyncHarvester, Harvester, MemorySink};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let harvester = AsyncHarvester::new(Harvester::builder().build().unwrap());
//!     let (report, sink) = harvester.run(MemorySink::new()).await.unwrap();
//!     println!("{} ({} summaries)", report.message, sink.items.len());
//! }
//! ```

use std::sync::Arc;

use crate::error::{HarvestError, Result};
use crate::sink::StorageSink;
use crate::{Harvester, RunReport};

/// Async wrapper around [`Harvester`].
///
/// Cheap to clone; clones share the same harvester.
#[derive(Clone)]
pub struct AsyncHarvester {
    inner: Arc<Harvester>,
}

impl AsyncHarvester {
    pub fn new(harvester: Harvester) -> Self {
        Self {
            inner: Arc::new(harvester),
        }
    }

    /// Run a full harvest on the blocking thread pool.
    ///
    /// The sink is moved into the blocking task and handed back together
    /// with the report.
    pub async fn run<S>(&self, sink: S) -> Result<(RunReport, S)>
    where
        S: StorageSink + Send + 'static,
    {
        let harvester = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut sink = sink;
            let report = harvester.run(&mut sink);
            (report, sink)
        })
        .await
        .map_err(|e| HarvestError::InvalidArgument(format!("Task join error: {e}")))
    }

    /// Access the wrapped harvester.
    pub fn harvester(&self) -> &Harvester {
        &self.inner
    }
}
