use super::*;
use footlog_core::ID;

/// Account lookup and provisioning shared by password login, sign-up and
/// delegated login.
pub struct Resolver<M> {
    members: M,
}

impl<M> Resolver<M>
where
    M: MemberRepository,
{
    pub fn new(members: M) -> Self {
        Self { members }
    }
    pub fn members(&self) -> &M {
        &self.members
    }
    pub async fn by_email(&self, email: &str) -> Result<Option<Member>, AuthError> {
        self.members.find_by_email(email).await
    }
    pub async fn by_id(&self, id: ID<Member>) -> Result<Member, AuthError> {
        self.members
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
    /// Creates a local account. The email must not be registered yet.
    pub async fn register(&self, member: Member) -> Result<Member, AuthError> {
        if self.members.find_by_email(member.email()).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        log::info!("registering member {}", member.email());
        self.members.save(member).await
    }
    /// Returns the account registered under the profile's email, creating a
    /// delegated-only one on first sight. Existing accounts are not updated.
    /// A concurrent first login that provisions the same email wins, and its
    /// account is returned.
    pub async fn find_or_create(&self, profile: &Profile) -> Result<Member, AuthError> {
        match self.members.find_by_email(&profile.email).await? {
            Some(member) => Ok(member),
            None => {
                log::info!("provisioning {} member {}", profile.origin.as_str(), profile.email);
                let member = Member::new(ID::default(), profile.name.clone(), profile.email.clone())
                    .with_hashword(password::unusable()?)
                    .with_gender(profile.gender)
                    .with_origin(profile.origin)
                    .with_role(Role::User);
                match self.members.save(member).await {
                    Err(AuthError::EmailTaken) => {
                        log::debug!("lost provisioning race for {}", profile.email);
                        self.members
                            .find_by_email(&profile.email)
                            .await?
                            .ok_or(AuthError::EmailTaken)
                    }
                    saved => saved,
                }
            }
        }
    }
}
