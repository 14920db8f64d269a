//! In-process transport that replays scripted replies per root field.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use storage::MemoryStore;
use tokio::sync::Mutex;

use crate::{
    error::TransportError,
    pages::PageContext,
    session::{SessionStore, StoredSession},
    transport::{GraphQlRequest, GraphQlTransport},
    LearningClient,
};

#[derive(Debug, Clone)]
pub enum Reply {
    Data(Value),
    Fail(String),
}

#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<GraphQlRequest>>,
    token: Mutex<Option<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reply used once, ahead of the fallback.
    pub async fn push(&self, root_field: &str, value: Value) {
        self.queued
            .lock()
            .await
            .entry(root_field.to_string())
            .or_default()
            .push_back(Reply::Data(value));
    }

    pub async fn push_failure(&self, root_field: &str, message: &str) {
        self.queued
            .lock()
            .await
            .entry(root_field.to_string())
            .or_default()
            .push_back(Reply::Fail(message.to_string()));
    }

    /// Reply used whenever nothing is queued.
    pub async fn always(&self, root_field: &str, value: Value) {
        self.fallback
            .lock()
            .await
            .insert(root_field.to_string(), Reply::Data(value));
    }

    pub async fn calls(&self) -> Vec<GraphQlRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn calls_to(&self, operation_name: &str) -> Vec<GraphQlRequest> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.operation_name == operation_name)
            .cloned()
            .collect()
    }

    pub async fn token(&self) -> Option<String> {
        self.token.lock().await.clone()
    }
}

fn root_field_of(query: &str) -> Option<String> {
    let body = &query[query.find('{')? + 1..];
    let name: String = body
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!name.is_empty()).then_some(name)
}

#[async_trait]
impl GraphQlTransport for ScriptedTransport {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, TransportError> {
        let root = root_field_of(&request.query).unwrap_or_default();
        self.calls.lock().await.push(request);

        let queued = self
            .queued
            .lock()
            .await
            .get_mut(&root)
            .and_then(VecDeque::pop_front);
        let reply = match queued {
            Some(reply) => Some(reply),
            None => self.fallback.lock().await.get(&root).cloned(),
        };

        match reply {
            Some(Reply::Data(value)) => Ok(json!({ (root): value })),
            Some(Reply::Fail(message)) => Err(TransportError::GraphQl(vec![message])),
            None => Err(TransportError::GraphQl(vec![format!("unscripted field {root}")])),
        }
    }

    async fn set_auth_token(&self, token: Option<String>) {
        *self.token.lock().await = token;
    }
}

pub async fn context(transport: Arc<ScriptedTransport>) -> PageContext {
    PageContext::new(
        LearningClient::new(transport),
        SessionStore::new(Arc::new(MemoryStore::new())),
    )
}

pub async fn signed_in_context(transport: Arc<ScriptedTransport>) -> PageContext {
    let ctx = context(transport).await;
    ctx.session
        .save(&StoredSession {
            user_id: shared::domain::UserId::new("u1"),
            email: Some("ada@example.com".to_string()),
            name: Some("Ada".to_string()),
            token: Some("tok-1".to_string()),
        })
        .await
        .expect("session");
    ctx
}
