//! Application fetches that can optionally pull in their binary.
//!
//! An [`EnhancedApp`] wraps a pending application fetch. Awaiting it yields
//! the application as the API returned it. Calling
//! [`include_binary`](EnhancedApp::include_binary) yields a new pending value
//! whose `binary` field is replaced with the full [`Binary`].
//!
//! Both the base fetch and the hydration are shared futures: every clone and
//! every `include_binary` call on the same base observes one network call.

use crate::client::FastEdgeClient;
use crate::types::{Application, BinaryRef};
use crate::Result;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::IntoFuture;
use std::sync::{Arc, OnceLock};

type SharedApp<'a> = Shared<BoxFuture<'a, Result<Application>>>;

/// A pending application fetch that can be extended with its binary.
#[derive(Clone)]
pub struct EnhancedApp<'a> {
    client: &'a FastEdgeClient,
    pending: SharedApp<'a>,
    with_binary: Arc<OnceLock<SharedApp<'a>>>,
}

impl<'a> EnhancedApp<'a> {
    pub(crate) fn new(
        client: &'a FastEdgeClient,
        fetch: BoxFuture<'a, Result<Application>>,
    ) -> Self {
        Self {
            client,
            pending: fetch.shared(),
            with_binary: Arc::new(OnceLock::new()),
        }
    }

    /// Resolve the application's binary reference into the full binary.
    ///
    /// Applications without a binary resolve unchanged. Repeated or chained
    /// calls reuse the first hydration.
    pub fn include_binary(&self) -> EnhancedApp<'a> {
        let pending = self
            .with_binary
            .get_or_init(|| hydrate_binary(self.client, self.pending.clone()).boxed().shared())
            .clone();
        EnhancedApp {
            client: self.client,
            pending,
            with_binary: Arc::clone(&self.with_binary),
        }
    }
}

impl<'a> IntoFuture for EnhancedApp<'a> {
    type Output = Result<Application>;
    type IntoFuture = SharedApp<'a>;

    fn into_future(self) -> Self::IntoFuture {
        self.pending
    }
}

impl std::fmt::Debug for EnhancedApp<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancedApp")
            .field("hydrating", &self.with_binary.get().is_some())
            .finish_non_exhaustive()
    }
}

async fn hydrate_binary<'a>(
    client: &'a FastEdgeClient,
    app: SharedApp<'a>,
) -> Result<Application> {
    let mut app = app.await?;
    if let Some(BinaryRef::Id(id)) = app.binary {
        if id > 0 {
            let binary = client.binaries().get(id).await?;
            app.binary = Some(BinaryRef::Resolved(Box::new(binary)));
        }
    }
    Ok(app)
}
