use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands};

use crate::domain::repository::TwoFactorStore;
use crate::domain::types::{Redemption, TwoFactorRecord};
use crate::error::ApiError;

fn two_factor_key(email: &str) -> String {
    format!("two_factor:{email}")
}

/// Seconds until the store may drop `record`, at least 1.
fn retention_secs(record: &TwoFactorRecord) -> u64 {
    (record.purge_at() - Utc::now()).num_seconds().max(1) as u64
}

// ── Redis ────────────────────────────────────────────────────────────────────

/// Compare and consume in one server-side step.
/// KEYS[1] = record key, ARGV[1] = submitted code, ARGV[2] = now in epoch ms.
const REDEEM_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return {'missing'}
end
local record = cjson.decode(raw)
if tonumber(ARGV[2]) > tonumber(record.expires_at) then
  redis.call('DEL', KEYS[1])
  return {'expired'}
end
if record.code ~= ARGV[1] then
  return {'mismatch'}
end
redis.call('DEL', KEYS[1])
return {'redeemed', raw}
"#;

fn redemption_from_reply(reply: Vec<String>) -> Result<Redemption, ApiError> {
    match reply.as_slice() {
        [status] if status == "missing" => Ok(Redemption::Missing),
        [status] if status == "expired" => Ok(Redemption::Expired),
        [status] if status == "mismatch" => Ok(Redemption::Mismatch),
        [status, raw] if status == "redeemed" => {
            let record = serde_json::from_str(raw).context("decode two-factor record")?;
            Ok(Redemption::Redeemed(record))
        }
        _ => Err(ApiError::Internal(anyhow::anyhow!(
            "unexpected redeem reply {reply:?}"
        ))),
    }
}

#[derive(Clone)]
pub struct RedisTwoFactorStore {
    pub pool: Pool,
}

impl RedisTwoFactorStore {
    async fn connection(&self) -> Result<deadpool_redis::Connection, ApiError> {
        self.pool
            .get()
            .await
            .map_err(|e| ApiError::Internal(e.into()))
    }
}

impl TwoFactorStore for RedisTwoFactorStore {
    async fn put(&self, email: &str, record: &TwoFactorRecord) -> Result<(), ApiError> {
        let mut conn = self.connection().await?;
        let value = serde_json::to_vec(record).context("encode two-factor record")?;
        let (): () = conn
            .set_ex(two_factor_key(email), value, retention_secs(record))
            .await
            .map_err(|e: redis::RedisError| ApiError::Internal(e.into()))?;
        Ok(())
    }

    async fn redeem(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, ApiError> {
        let mut conn = self.connection().await?;
        let reply: Vec<String> = redis::cmd("EVAL")
            .arg(REDEEM_SCRIPT)
            .arg(1)
            .arg(two_factor_key(email))
            .arg(code)
            .arg(now.timestamp_millis())
            .query_async(&mut conn)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
        redemption_from_reply(reply)
    }

    async fn discard(&self, email: &str) -> Result<(), ApiError> {
        let mut conn = self.connection().await?;
        let _: i64 = conn
            .del(two_factor_key(email))
            .await
            .map_err(|e: redis::RedisError| ApiError::Internal(e.into()))?;
        Ok(())
    }
}

// ── In-process ───────────────────────────────────────────────────────────────

/// Single-instance store for development and tests.
#[derive(Clone, Default)]
pub struct MemoryTwoFactorStore {
    records: Arc<Mutex<HashMap<String, TwoFactorRecord>>>,
}

impl MemoryTwoFactorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_records<T>(&self, f: impl FnOnce(&mut HashMap<String, TwoFactorRecord>) -> T) -> T {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        records.retain(|_, record| record.purge_at() > now);
        f(&mut records)
    }

    /// Code currently pending for `email`, without consuming it.
    pub fn pending_code(&self, email: &str) -> Option<String> {
        self.with_records(|records| records.get(email).map(|r| r.code.clone()))
    }
}

impl TwoFactorStore for MemoryTwoFactorStore {
    async fn put(&self, email: &str, record: &TwoFactorRecord) -> Result<(), ApiError> {
        self.with_records(|records| records.insert(email.to_owned(), record.clone()));
        Ok(())
    }

    async fn redeem(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, ApiError> {
        Ok(self.with_records(|records| {
            let (expired, matches) = match records.get(email) {
                Some(record) => (record.is_expired_at(now), record.code == code),
                None => return Redemption::Missing,
            };
            if !expired && !matches {
                return Redemption::Mismatch;
            }
            match records.remove(email) {
                Some(record) if !expired => Redemption::Redeemed(record),
                _ => Redemption::Expired,
            }
        }))
    }

    async fn discard(&self, email: &str) -> Result<(), ApiError> {
        self.with_records(|records| records.remove(email));
        Ok(())
    }
}

// ── Backend selection ────────────────────────────────────────────────────────

/// The store picked at startup: Redis when `REDIS_URL` is set.
#[derive(Clone)]
pub enum TwoFactorBackend {
    Redis(RedisTwoFactorStore),
    Memory(MemoryTwoFactorStore),
}

impl TwoFactorStore for TwoFactorBackend {
    async fn put(&self, email: &str, record: &TwoFactorRecord) -> Result<(), ApiError> {
        match self {
            Self::Redis(store) => store.put(email, record).await,
            Self::Memory(store) => store.put(email, record).await,
        }
    }

    async fn redeem(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, ApiError> {
        match self {
            Self::Redis(store) => store.redeem(email, code, now).await,
            Self::Memory(store) => store.redeem(email, code, now).await,
        }
    }

    async fn discard(&self, email: &str) -> Result<(), ApiError> {
        match self {
            Self::Redis(store) => store.discard(email).await,
            Self::Memory(store) => store.discard(email).await,
        }
    }
}
