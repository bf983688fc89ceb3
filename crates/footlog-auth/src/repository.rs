use super::*;
use footlog_core::ID;

/// Account persistence consumed by the auth core.
/// Abstracts storage from the authentication flows.
#[allow(async_fn_in_trait)]
pub trait MemberRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AuthError>;
    async fn find_by_id(&self, id: ID<Member>) -> Result<Option<Member>, AuthError>;
    async fn save(&self, member: Member) -> Result<Member, AuthError>;
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use footlog_core::Unique;
    use footlog_pg::*;
    use std::sync::Arc;
    use tokio_postgres::Client;
    use tokio_postgres::Row;

    const COLUMNS: &str = "id, name, email, hashword, role, gender, origin";

    fn hydrate(row: Row) -> Member {
        let member = Member::new(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            row.get::<_, String>(1),
            row.get::<_, String>(2),
        )
        .with_role(Role::from(row.get::<_, &str>(4)))
        .with_gender(Gender::from(row.get::<_, &str>(5)))
        .with_origin(Origin::from(row.get::<_, &str>(6)));
        match row.get::<_, Option<String>>(3) {
            Some(hashword) => member.with_hashword(hashword),
            None => member,
        }
    }

    fn unavailable(e: PgErr) -> AuthError {
        log::error!("member store: {}", e);
        AuthError::StoreUnavailable(e.to_string())
    }

    impl MemberRepository for Arc<Client> {
        async fn find_by_email(&self, email: &str) -> Result<Option<Member>, AuthError> {
            self.query_opt(
                const_format::concatcp!("SELECT ", COLUMNS, " FROM ", USERS, " WHERE email = $1"),
                &[&email],
            )
            .await
            .map(|opt| opt.map(hydrate))
            .map_err(unavailable)
        }

        async fn find_by_id(&self, id: ID<Member>) -> Result<Option<Member>, AuthError> {
            self.query_opt(
                const_format::concatcp!("SELECT ", COLUMNS, " FROM ", USERS, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await
            .map(|opt| opt.map(hydrate))
            .map_err(unavailable)
        }

        async fn save(&self, member: Member) -> Result<Member, AuthError> {
            self.execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    USERS,
                    " (",
                    COLUMNS,
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7)
                     ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        hashword = EXCLUDED.hashword,
                        role = EXCLUDED.role,
                        gender = EXCLUDED.gender"
                ),
                &[
                    &member.id().inner(),
                    &member.name(),
                    &member.email(),
                    &member.hashword(),
                    &member.role().as_str(),
                    &member.gender().as_str(),
                    &member.origin().as_str(),
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
                    AuthError::EmailTaken
                } else {
                    unavailable(e)
                }
            })
            .map(|_| member)
        }
    }
}
