//! Relying parties allowed to start an authorization flow.

use gatehouse_core::RegisteredClient;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, RegisteredClient>,
}

impl ClientRegistry {
    pub fn new(clients: impl IntoIterator<Item = RegisteredClient>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|c| (c.client_id.clone(), c))
                .collect(),
        }
    }

    pub fn get(&self, client_id: &str) -> Option<&RegisteredClient> {
        self.clients.get(client_id)
    }

    /// The client, if it exists and registered `redirect_uri`.
    pub fn authorize(&self, client_id: &str, redirect_uri: &str) -> Option<&RegisteredClient> {
        self.get(client_id)
            .filter(|client| client.allows_redirect(redirect_uri))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
