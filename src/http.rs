use crate::config::WriteOptions;
use crate::event::LogDocument;
use crate::store::{Collection, StoreConnection, StoreConnector, StoreError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Connector for document stores that expose a REST data API.
///
/// The connection string is the database URL, e.g.
/// `http://127.0.0.1:8080/logs_db`; the last path segment is the
/// database, everything before it the API base. Connecting issues a ping
/// against the base URL, so an unreachable server fails the connect
/// instead of the first insert.
///
/// Recognized connection options: `user` and `password` select HTTP
/// basic auth; every other entry is appended verbatim to each insert's
/// query string.
#[derive(Clone, Default)]
pub struct HttpConnector {
    client: Client,
}

impl HttpConnector {
    pub fn new() -> Self {
        HttpConnector { client: Client::new() }
    }
}

#[async_trait]
impl StoreConnector for HttpConnector {
    async fn connect(
        &self,
        connection_string: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<Arc<dyn StoreConnection>, StoreError> {
        let (base_url, database) = split_database(connection_string);

        let user = options.get("user").cloned();
        let password = options.get("password").cloned();
        let extra: BTreeMap<String, String> = options
            .iter()
            .filter(|(k, _)| k.as_str() != "user" && k.as_str() != "password")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut ping = self.client.get(format!("{}/", base_url));
        if let Some(user) = &user {
            ping = ping.basic_auth(user, password.as_deref());
        }

        let resp = ping.send().await?;
        if !resp.status().is_success() {
            return Err(format!(
                "document store at {} refused the connection with status {}",
                base_url,
                resp.status()
            )
            .into());
        }

        Ok(Arc::new(HttpConnection {
            client: self.client.clone(),
            base_url,
            database,
            user,
            password,
            extra,
        }))
    }
}

/// Split `http://host:port/db` into the API base and the database name.
/// A URL without a database path falls back to `default`.
fn split_database(connection_string: &str) -> (String, String) {
    let trimmed = connection_string.trim_end_matches('/');
    let after_scheme = trimmed.find("://").map(|i| i + 3).unwrap_or(0);

    match trimmed[after_scheme..].rfind('/') {
        Some(slash) => {
            let split = after_scheme + slash;
            (trimmed[..split].to_string(), trimmed[split + 1..].to_string())
        }
        None => (trimmed.to_string(), "default".to_string()),
    }
}

struct HttpConnection {
    client: Client,
    base_url: String,
    database: String,
    user: Option<String>,
    password: Option<String>,
    extra: BTreeMap<String, String>,
}

impl StoreConnection for HttpConnection {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        Arc::new(HttpCollection {
            client: self.client.clone(),
            url: format!(
                "{}/{}/{}",
                self.base_url,
                urlencoding::encode(&self.database),
                urlencoding::encode(name)
            ),
            user: self.user.clone(),
            password: self.password.clone(),
            extra: self.extra.clone(),
        })
    }
}

struct HttpCollection {
    client: Client,
    url: String,
    user: Option<String>,
    password: Option<String>,
    extra: BTreeMap<String, String>,
}

impl HttpCollection {
    fn insert_url(&self, options: WriteOptions) -> String {
        let mut query = if options.acknowledge {
            format!("w=1&journal={}", options.durable)
        } else {
            "w=0".to_string()
        };

        for (key, value) in &self.extra {
            query.push_str(&format!(
                "&{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }

        format!("{}?{}", self.url, query)
    }
}

#[async_trait]
impl Collection for HttpCollection {
    async fn insert(&self, document: &LogDocument, options: WriteOptions) -> Result<(), StoreError> {
        let body = serde_json::to_string(document)?;
        let mut request = self
            .client
            .post(self.insert_url(options))
            .header("content-type", "application/json")
            .body(body);

        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_deref());
        }

        if !options.acknowledge {
            // Fire and forget: transmit without observing completion.
            tokio::spawn(async move {
                let _ = request.send().await;
            });
            return Ok(());
        }

        let resp = request.send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("insert failed with status {}: {}", status, text).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_is_the_last_path_segment() {
        let (base, db) = split_database("http://127.0.0.1:8080/logs_db");
        assert_eq!(base, "http://127.0.0.1:8080");
        assert_eq!(db, "logs_db");
    }

    #[test]
    fn missing_database_falls_back_to_default() {
        let (base, db) = split_database("http://127.0.0.1:8080");
        assert_eq!(base, "http://127.0.0.1:8080");
        assert_eq!(db, "default");
    }

    #[test]
    fn trailing_slashes_are_ignored() {
        let (base, db) = split_database("http://store.internal/logs/");
        assert_eq!(base, "http://store.internal");
        assert_eq!(db, "logs");
    }
}
