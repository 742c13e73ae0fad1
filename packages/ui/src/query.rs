//! Query cache context and the two read hooks.
//!
//! The [`QueryClient`] itself is not reactive. [`Queries`] pairs it with a
//! revision signal so that any invalidation made through it (or mirrored with
//! [`Queries::sync`]) re-runs the resources below.

use api::auth::{fetch_user, user_query_key};
use api::tasks::load_tasks;
use api::{ApiError, Task, UserInfo};
use dioxus::prelude::*;
use store::{QueryClient, QueryKey};

use crate::auth::{use_auth, use_client};

/// Query cache plus the revision components subscribe to.
#[derive(Clone, Copy)]
pub struct Queries {
    cache: CopyValue<QueryClient>,
    revision: Signal<u64>,
}

impl Queries {
    /// A cheap handle on the shared cache.
    pub fn cache(&self) -> QueryClient {
        self.cache.read().clone()
    }

    /// Read the revision, subscribing the caller.
    pub fn revision(&self) -> u64 {
        (self.revision)()
    }

    pub fn invalidate(&mut self, prefix: &QueryKey) {
        self.cache.read().invalidate(prefix);
        self.sync();
    }

    pub fn clear(&mut self) {
        self.cache.read().clear();
        self.sync();
    }

    /// Publish cache changes made outside this handle.
    pub fn sync(&mut self) {
        let current = self.cache.read().revision();
        if *self.revision.peek() != current {
            self.revision.set(current);
        }
    }
}

pub fn use_queries() -> Queries {
    use_context::<Queries>()
}

/// Mark everything under `prefix` stale; watching resources refetch.
///
/// Safe to call from event handlers, unlike the `use_` hooks.
pub fn invalidate_queries(prefix: impl Into<QueryKey>) {
    let mut queries = consume_context::<Queries>();
    queries.invalidate(&prefix.into());
}

#[component]
pub fn QueryProvider(children: Element) -> Element {
    let cache = use_hook(|| CopyValue::new(QueryClient::new()));
    let revision = use_signal(|| 0u64);

    use_context_provider(|| Queries { cache, revision });

    rsx! {
        {children}
    }
}

/// The signed-in user, refetched whenever the cache revision or the auth
/// state changes.
pub fn use_user_query() -> Resource<Result<Option<UserInfo>, ApiError>> {
    let client = use_client();
    let queries = use_queries();
    let auth = use_auth();

    use_resource(move || {
        let client = client.clone();
        async move {
            queries.revision();
            let _ = auth().user;
            fetch_user(&client, &queries.cache()).await
        }
    })
}

/// The signed-in user's tasks, newest first.
pub fn use_dashboard_tasks() -> Resource<Result<Vec<Task>, ApiError>> {
    let client = use_client();
    let queries = use_queries();
    let auth = use_auth();

    use_resource(move || {
        let client = client.clone();
        async move {
            queries.revision();
            let user_id = auth().user.map(|u| u.id);
            match user_id {
                Some(_) => load_tasks(&client, &queries.cache()).await,
                None => Ok(Vec::new()),
            }
        }
    })
}
