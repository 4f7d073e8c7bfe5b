//! Redis backend via a multiplexed, auto-reconnecting connection manager.
//!
//! Every primitive maps onto a single Redis command, except `push_back`,
//! which sends RPUSH and EXPIRE as one MULTI/EXEC block.

use super::QueueBackend;
use crate::error::Result;
use ::redis::aio::ConnectionManager;
use async_trait::async_trait;
use std::time::Duration;

/// Redis-backed store handle. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect to Redis at `url` (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = ::redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::debug!("connected to redis");
        Ok(Self { conn })
    }

    /// Simple health check — PING.
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Redis expiries are whole seconds and must be positive. Sub-second
/// remainders round up.
fn ttl_secs(ttl: Duration) -> u64 {
    (ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0)).max(1)
}

#[async_trait]
impl QueueBackend for RedisBackend {
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = ::redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = ::redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn push_back(&self, key: &str, values: Vec<String>, ttl: Duration) -> Result<u64> {
        if values.is_empty() {
            return self.len(key).await;
        }
        let mut conn = self.conn.clone();
        let (len,): (u64,) = ::redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(key)
            .arg(values)
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl_secs(ttl))
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(len)
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let head: Option<String> = ::redis::cmd("LPOP").arg(key).query_async(&mut conn).await?;
        Ok(head)
    }

    async fn len(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let len: u64 = ::redis::cmd("LLEN").arg(key).query_async(&mut conn).await?;
        Ok(len)
    }

    async fn index(&self, key: &str, index: u64) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = ::redis::cmd("LINDEX")
            .arg(key)
            .arg(index)
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut cmd = ::redis::cmd("DEL");
        for key in keys {
            cmd.arg(*key);
        }
        let mut conn = self.conn.clone();
        let _: u64 = cmd.query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_rounds_to_at_least_one_second() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::ZERO), 1);
        assert_eq!(ttl_secs(Duration::from_millis(1_900)), 2);
        assert_eq!(ttl_secs(Duration::from_secs(86_400)), 86_400);
    }
}
