use super::*;
use footlog_core::ID;
use footlog_core::Unique;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process [`MemberRepository`] keyed by id, with unique emails.
#[derive(Default)]
pub struct Roster {
    members: RwLock<HashMap<ID<Member>, Member>>,
}

impl Roster {
    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }
}

impl MemberRepository for Roster {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AuthError> {
        Ok(self
            .members
            .read()
            .await
            .values()
            .find(|m| m.email() == email)
            .cloned())
    }
    async fn find_by_id(&self, id: ID<Member>) -> Result<Option<Member>, AuthError> {
        Ok(self.members.read().await.get(&id).cloned())
    }
    async fn save(&self, member: Member) -> Result<Member, AuthError> {
        let mut members = self.members.write().await;
        if members
            .values()
            .any(|m| m.email() == member.email() && m.id() != member.id())
        {
            return Err(AuthError::EmailTaken);
        }
        members.insert(member.id(), member.clone());
        Ok(member)
    }
}
