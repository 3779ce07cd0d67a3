use redis::AsyncCommands;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppResult;

pub async fn get_cache<T: DeserializeOwned>(client: &redis::Client, key: &str) -> AppResult<Option<T>> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let value: Option<String> = conn.get(key).await?;
    match value {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub async fn set_cache<T: Serialize>(client: &redis::Client, key: &str, value: &T, ttl: u64) -> AppResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let json = serde_json::to_string(value)?;
    let _: () = conn.set_ex(key, json, ttl).await?;
    Ok(())
}

pub async fn delete_cache(client: &redis::Client, key: &str) -> AppResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let _: i64 = conn.del(key).await?;
    Ok(())
}

pub async fn ping(client: &redis::Client) -> AppResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}
