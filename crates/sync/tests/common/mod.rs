#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use fti_sync::{
    client::Client,
    mutator::{Interaction, ResourceKind},
    session::{Credential, Session},
    store::{DurableStore, MemoryStore},
};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Memory store that counts removals.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub removes: AtomicUsize,
}

impl CountingStore {
    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

impl DurableStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> fti_sync::Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> fti_sync::Result<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

pub async fn client_with_store(store: Arc<dyn DurableStore>) -> (MockServer, Client) {
    let server = MockServer::start().await;
    let session = Session::establish(store, Credential::new(TOKEN)).unwrap();
    let client = Client::new(&server.uri(), session).unwrap();
    (server, client)
}

pub async fn client() -> (MockServer, Client) {
    client_with_store(Arc::new(MemoryStore::new())).await
}

#[derive(Debug, Default)]
pub struct RecordingUi {
    pub answer: bool,
    pub prompts: Vec<String>,
    pub closed: Vec<ResourceKind>,
}

impl RecordingUi {
    pub fn confirming() -> Self {
        Self {
            answer: true,
            ..Default::default()
        }
    }
}

impl Interaction for RecordingUi {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answer
    }

    fn close_form(&mut self, kind: ResourceKind) {
        self.closed.push(kind);
    }
}
