//! The context store.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ContextError, Result};
use crate::Token;

tokio::task_local! {
    /// Token of the request the current task is working for.
    static CURRENT: Token;
}

type Entries<H> = Arc<Mutex<HashMap<Token, Arc<H>>>>;

/// Associates in-flight requests with their transport handles.
///
/// A request registers its handles with [`begin`](Self::begin) and runs its
/// handler with [`run`](Self::run). Any code awaited inside that handler,
/// however deeply nested, reaches the handles through
/// [`current`](Self::current). The association lives in task-local storage,
/// so it follows the handler across suspension points and never leaks into
/// a concurrently running request.
///
/// Cloning is cheap and yields a handle to the same store.
pub struct ContextStore<H> {
    entries: Entries<H>,
}

impl<H> Clone for ContextStore<H> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<H> Default for ContextStore<H> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<H> std::fmt::Debug for ContextStore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStore")
            .field("active", &self.active())
            .finish()
    }
}

impl<H> ContextStore<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request's handles and mint its token.
    pub fn begin(&self, handles: H) -> Token {
        let token = Token::new();
        lock(&self.entries).insert(token, Arc::new(handles));
        tracing::trace!(%token, "request context opened");
        token
    }

    /// Run `future` as the request identified by `token`.
    ///
    /// The token's entry is released when the returned future completes or
    /// is dropped, whether or not it was ever polled, so a cancelled or
    /// panicking request does not leak its handles.
    pub fn run<F: Future>(&self, token: Token, future: F) -> impl Future<Output = F::Output> {
        let release = Release {
            entries: Arc::clone(&self.entries),
            token,
        };
        CURRENT.scope(token, async move {
            let _release = release;
            future.await
        })
    }

    /// `begin` and `run` in one step.
    pub fn enter<F: Future>(&self, handles: H, future: F) -> impl Future<Output = F::Output> {
        let token = self.begin(handles);
        self.run(token, future)
    }

    /// Handles of the request the calling task is working for.
    pub fn current(&self) -> Result<Arc<H>> {
        let Some(token) = current_token() else {
            tracing::error!("request context requested outside of a request scope");
            return Err(ContextError::OutsideScope);
        };

        lock(&self.entries).get(&token).cloned().ok_or_else(|| {
            tracing::error!(%token, "request context requested after the request finished");
            ContextError::NotFound(token)
        })
    }

    /// Carry the current request scope into a future that will run on
    /// another task.
    ///
    /// `tokio::spawn` does not inherit task-locals. Wrap the spawned future
    /// with `bind` to keep `current` working in it. Outside a scope the
    /// future is returned as is.
    pub fn bind<F: Future>(&self, future: F) -> impl Future<Output = F::Output> {
        let token = current_token();
        async move {
            match token {
                Some(token) => CURRENT.scope(token, future).await,
                None => future.await,
            }
        }
    }

    /// Number of requests currently holding an entry.
    pub fn active(&self) -> usize {
        lock(&self.entries).len()
    }
}

/// Token of the current request scope, if any.
pub fn current_token() -> Option<Token> {
    CURRENT.try_with(|token| *token).ok()
}

fn lock<H>(entries: &Entries<H>) -> MutexGuard<'_, HashMap<Token, Arc<H>>> {
    // Entries are inserted and removed whole, a poisoned map is still consistent
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes a token's entry when dropped.
struct Release<H> {
    entries: Entries<H>,
    token: Token,
}

impl<H> Drop for Release<H> {
    fn drop(&mut self) {
        lock(&self.entries).remove(&self.token);
        tracing::trace!(token = %self.token, "request context released");
    }
}
