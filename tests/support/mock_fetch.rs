use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use batchfetch::{FetchRequest, RemoteFetchClient, DEFAULT_OUTPUT_DIR_FIELD};
use futures::future::BoxFuture;
use tokio::time::sleep;

/// Writes one `<out_name>.nc` artifact per request into the request's output
/// directory, failing or panicking on demand.
#[derive(Clone, Default)]
pub struct MockFetchClient {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    failing: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(self, out_name: &str) -> Self {
        self.inner
            .failing
            .lock()
            .expect("mock poisoned")
            .insert(out_name.to_owned());
        self
    }

    pub fn panic_on(self, out_name: &str) -> Self {
        self.inner
            .panicking
            .lock()
            .expect("mock poisoned")
            .insert(out_name.to_owned());
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock().expect("mock poisoned") = Some(delay);
        self
    }

    /// Out names in the order requests were issued.
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().expect("mock poisoned").clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    async fn handle(&self, request: &FetchRequest) -> Result<()> {
        let out_name = request
            .out_name()
            .context("request without out_name")?
            .to_owned();
        self.inner
            .calls
            .lock()
            .expect("mock poisoned")
            .push(out_name.clone());

        let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let delay = *self.inner.delay.lock().expect("mock poisoned");
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        let result = self.land_artifact(request, &out_name).await;
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn land_artifact(&self, request: &FetchRequest, out_name: &str) -> Result<()> {
        let panics = self
            .inner
            .panicking
            .lock()
            .expect("mock poisoned")
            .contains(out_name);
        if panics {
            self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("mock client panicked on {out_name}");
        }
        let fails = self
            .inner
            .failing
            .lock()
            .expect("mock poisoned")
            .contains(out_name);
        if fails {
            return Err(anyhow!("remote service rejected {out_name}"));
        }

        let dir = request
            .get(DEFAULT_OUTPUT_DIR_FIELD)
            .and_then(|value| value.as_str())
            .map(PathBuf::from)
            .context("request without output directory")?;
        tokio::fs::write(dir.join(format!("{out_name}.nc")), out_name.as_bytes())
            .await
            .with_context(|| format!("failed to store artifact {out_name}"))?;
        Ok(())
    }
}

impl RemoteFetchClient for MockFetchClient {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.handle(request))
    }
}
