use super::*;
use footlog_core::ID;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process [`SessionStore`]. Expired sessions are ignored on read and
/// swept out on every write.
#[derive(Default)]
pub struct Vault {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    sessions: HashMap<ID<Member>, Session>,
    owners: HashMap<Vec<u8>, ID<Member>>,
}

impl State {
    fn live(&self, account: ID<Member>) -> Option<&Session> {
        self.sessions.get(&account).filter(|s| !s.expired())
    }
    /// Drops every expired session along with its reverse index entry.
    fn sweep(&mut self) {
        let State { sessions, owners } = self;
        sessions.retain(|_, session| !session.expired());
        owners.retain(|_, account| sessions.contains_key(account));
    }
    fn evict(&mut self, account: ID<Member>) {
        if let Some(old) = self.sessions.remove(&account) {
            self.owners.remove(&Crypto::hash(old.token()));
        }
    }
}

impl SessionStore for Vault {
    async fn put(&self, account: ID<Member>, session: &Session) -> Result<(), AuthError> {
        let mut state = self.state.write().await;
        state.sweep();
        state.evict(account);
        state.owners.insert(Crypto::hash(session.token()), account);
        state.sessions.insert(account, session.clone());
        Ok(())
    }
    async fn get(&self, account: ID<Member>) -> Result<Option<String>, AuthError> {
        Ok(self
            .state
            .read()
            .await
            .live(account)
            .map(|s| s.token().to_owned()))
    }
    async fn put_ip(&self, account: ID<Member>, ip: &str) -> Result<(), AuthError> {
        if let Some(session) = self.state.write().await.sessions.get_mut(&account) {
            session.rebind(ip);
        }
        Ok(())
    }
    async fn get_ip(&self, account: ID<Member>) -> Result<Option<String>, AuthError> {
        Ok(self
            .state
            .read()
            .await
            .live(account)
            .map(|s| s.ip().to_owned()))
    }
    async fn delete(&self, account: ID<Member>) -> Result<(), AuthError> {
        self.state.write().await.evict(account);
        Ok(())
    }
    async fn owner(&self, token: &str) -> Result<Option<ID<Member>>, AuthError> {
        let state = self.state.read().await;
        Ok(state
            .owners
            .get(&Crypto::hash(token))
            .copied()
            .filter(|account| state.live(*account).is_some_and(|s| s.token() == token)))
    }
}
