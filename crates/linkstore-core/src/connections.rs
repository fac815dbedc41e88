//! Connections between two profiles under `/conexoes/`. Duplicate pairs are allowed.

use crate::error::{ServiceError, ServiceResult};
use crate::schema::{
    connection_key, new_id, now_rfc3339, profile_key, Connection, ConnectionStatus, CONNECTIONS_PREFIX,
};
use crate::store::KvAdapter;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionRequest {
    #[serde(default)]
    pub profile_id_1: Option<String>,
    #[serde(default)]
    pub profile_id_2: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct ConnectionService {
    kv: KvAdapter,
}

fn parse_status(raw: Option<&str>) -> ServiceResult<ConnectionStatus> {
    match raw {
        None => Ok(ConnectionStatus::default()),
        Some(s) => ConnectionStatus::parse(s).ok_or_else(|| {
            ServiceError::validation("status must be one of: pending, accepted, rejected")
        }),
    }
}

impl ConnectionService {
    pub fn new(kv: KvAdapter) -> Self {
        Self { kv }
    }

    /// Both ids are required and distinct (400); both profiles must exist (404).
    pub async fn create(&self, req: ConnectionRequest) -> ServiceResult<Connection> {
        let first = req.profile_id_1.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let second = req.profile_id_2.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let (Some(first), Some(second)) = (first, second) else {
            return Err(ServiceError::validation("profile_id_1 and profile_id_2 are required"));
        };
        if first == second {
            return Err(ServiceError::validation("a profile cannot connect to itself"));
        }
        let status = parse_status(req.status.as_deref())?;

        for id in [first, second] {
            if !self.kv.exists(&profile_key(id)).await? {
                return Err(ServiceError::not_found(format!("profile {} not found", id)));
            }
        }

        let connection = Connection {
            id: new_id(),
            profile_id_1: first.to_string(),
            profile_id_2: second.to_string(),
            status,
            created_at: now_rfc3339(),
            updated_at: None,
        };
        self.kv
            .put_record(&connection_key(&connection.id), &connection)
            .await?;
        tracing::info!(
            target: "linkstore::network",
            id = %connection.id,
            from = first,
            to = second,
            status = status.as_str(),
            "connection created"
        );
        Ok(connection)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Connection>> {
        let records = self.kv.list_records::<Connection>(CONNECTIONS_PREFIX).await?;
        Ok(records.into_iter().map(|(_, c)| c).collect())
    }

    /// Connections where `profile_id` is either side.
    pub async fn for_profile(&self, profile_id: &str) -> ServiceResult<Vec<Connection>> {
        if !self.kv.exists(&profile_key(profile_id)).await? {
            return Err(ServiceError::not_found("profile not found"));
        }
        let all = self.list().await?;
        Ok(all.into_iter().filter(|c| c.involves(profile_id)).collect())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Connection> {
        self.kv
            .get_record(&connection_key(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("connection not found"))
    }

    pub async fn update_status(&self, id: &str, status: Option<&str>) -> ServiceResult<Connection> {
        let Some(raw) = status else {
            return Err(ServiceError::validation("status is required"));
        };
        let status = parse_status(Some(raw))?;
        let mut connection = self.get(id).await?;
        connection.status = status;
        connection.updated_at = Some(now_rfc3339());
        self.kv.put_record(&connection_key(id), &connection).await?;
        tracing::info!(target: "linkstore::network", id = id, status = status.as_str(), "connection updated");
        Ok(connection)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.kv.delete(&connection_key(id)).await? {
            return Err(ServiceError::not_found("connection not found"));
        }
        tracing::info!(target: "linkstore::network", id = id, "connection deleted");
        Ok(())
    }
}
