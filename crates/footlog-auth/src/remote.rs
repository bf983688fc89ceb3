use super::*;
use footlog_core::ID;
use redis::AsyncCommands;

/// Redis-backed [`SessionStore`].
///
/// Keys: `refresh:{account}` and `ip:{account}` hold the session,
/// `owner:{sha256(token)}` indexes it by token. All three share one TTL and
/// are written in a single MULTI/EXEC.
#[derive(Clone)]
pub struct RedisVault {
    client: redis::Client,
}

impl RedisVault {
    pub fn new(url: &str) -> Result<Self, AuthError> {
        redis::Client::open(url)
            .map(|client| Self { client })
            .map_err(unavailable)
    }
    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AuthError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)
    }
}

impl SessionStore for RedisVault {
    async fn put(&self, account: ID<Member>, session: &Session) -> Result<(), AuthError> {
        let ref mut conn = self.connection().await?;
        let ttl = session.ttl().as_secs().max(1);
        let previous: Option<String> = conn.get(refresh(account)).await.map_err(unavailable)?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        if let Some(ref previous) = previous {
            pipe.cmd("DEL").arg(owner(previous)).ignore();
        }
        pipe.cmd("SET")
            .arg(refresh(account))
            .arg(session.token())
            .arg("EX")
            .arg(ttl)
            .ignore()
            .cmd("SET")
            .arg(address(account))
            .arg(session.ip())
            .arg("EX")
            .arg(ttl)
            .ignore()
            .cmd("SET")
            .arg(owner(session.token()))
            .arg(account.to_string())
            .arg("EX")
            .arg(ttl)
            .ignore();
        let () = pipe.query_async(conn).await.map_err(unavailable)?;
        Ok(())
    }
    async fn get(&self, account: ID<Member>) -> Result<Option<String>, AuthError> {
        let ref mut conn = self.connection().await?;
        conn.get(refresh(account)).await.map_err(unavailable)
    }
    async fn put_ip(&self, account: ID<Member>, ip: &str) -> Result<(), AuthError> {
        let ref mut conn = self.connection().await?;
        let _: redis::Value = redis::cmd("SET")
            .arg(address(account))
            .arg(ip)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async(conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
    async fn get_ip(&self, account: ID<Member>) -> Result<Option<String>, AuthError> {
        let ref mut conn = self.connection().await?;
        conn.get(address(account)).await.map_err(unavailable)
    }
    async fn delete(&self, account: ID<Member>) -> Result<(), AuthError> {
        let ref mut conn = self.connection().await?;
        let previous: Option<String> = conn.get(refresh(account)).await.map_err(unavailable)?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        if let Some(ref previous) = previous {
            pipe.cmd("DEL").arg(owner(previous)).ignore();
        }
        pipe.cmd("DEL")
            .arg(refresh(account))
            .arg(address(account))
            .ignore();
        let () = pipe.query_async(conn).await.map_err(unavailable)?;
        Ok(())
    }
    async fn owner(&self, token: &str) -> Result<Option<ID<Member>>, AuthError> {
        let ref mut conn = self.connection().await?;
        let account: Option<String> = conn.get(owner(token)).await.map_err(unavailable)?;
        let Some(account) = account.and_then(|s| ID::<Member>::try_from(s.as_str()).ok()) else {
            return Ok(None);
        };
        let current: Option<String> = conn.get(refresh(account)).await.map_err(unavailable)?;
        Ok(current.filter(|t| t == token).map(|_| account))
    }
}

fn refresh(account: ID<Member>) -> String {
    format!("refresh:{}", account)
}

fn address(account: ID<Member>) -> String {
    format!("ip:{}", account)
}

fn owner(token: &str) -> String {
    Crypto::hash(token)
        .iter()
        .fold(String::from("owner:"), |mut key, byte| {
            key.push_str(&format!("{:02x}", byte));
            key
        })
}

fn unavailable(e: redis::RedisError) -> AuthError {
    log::error!("session store: {}", e);
    AuthError::StoreUnavailable(e.to_string())
}
