//! Persistence for custom personas
//!
//! This module provides:
//! - `PersonaStore` trait injected into the orchestrator and enhancer
//! - `InMemoryPersonaStore` backed by a concurrent map
//! - `SledPersonaStore` for on-disk key-value persistence

use crate::error::{Error, Result};
use crate::persona::{AgentRating, CustomPersona, PersonaUpdate};
use crate::types::AgentId;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use tokio::sync::Mutex;

/// Storage of custom personas
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// Load a persona by ID
    async fn get(&self, id: &AgentId) -> Result<Option<CustomPersona>>;

    /// Insert or replace a persona
    async fn put(&self, persona: CustomPersona) -> Result<()>;

    /// All personas in creation order
    async fn list(&self) -> Result<Vec<CustomPersona>>;

    /// Delete a persona, returning whether it existed
    async fn delete(&self, id: &AgentId) -> Result<bool>;

    /// Increment the usage counter of a persona
    async fn record_usage(&self, id: &AgentId) -> Result<()>;

    /// Fold a rating into a persona's average, returning the updated persona
    async fn record_rating(&self, rating: &AgentRating) -> Result<CustomPersona>;
}

/// Reject a custom persona name already taken by another stored persona.
///
/// Debate turns are keyed by display name, so names are unique
/// case-insensitively. `except` is the persona being renamed, if any.
pub async fn ensure_unique_name(
    store: &dyn PersonaStore,
    name: &str,
    except: Option<&AgentId>,
) -> Result<()> {
    let taken = store
        .list()
        .await?
        .into_iter()
        .any(|p| Some(&p.id) != except && p.name.eq_ignore_ascii_case(name));
    if taken {
        return Err(Error::invalid_input(format!(
            "A persona named '{}' already exists",
            name
        )));
    }
    Ok(())
}

/// Apply a partial update to a stored persona and save it
pub async fn update_persona(
    store: &dyn PersonaStore,
    id: &AgentId,
    update: PersonaUpdate,
) -> Result<CustomPersona> {
    let mut persona = store
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found(id.to_string()))?;
    if let Some(name) = &update.name {
        ensure_unique_name(store, name, Some(id)).await?;
    }
    persona.apply_update(update)?;
    store.put(persona.clone()).await?;
    Ok(persona)
}

fn decode(bytes: &[u8]) -> Result<CustomPersona> {
    serde_json::from_slice(bytes)
        .map_err(|e| Error::storage(format!("Corrupt persona record: {}", e)))
}

fn creation_order(personas: &mut [CustomPersona]) {
    personas.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// In-memory store, the default for tests and single-process deployments
#[derive(Debug, Default)]
pub struct InMemoryPersonaStore {
    personas: DashMap<AgentId, CustomPersona>,
}

impl InMemoryPersonaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonaStore for InMemoryPersonaStore {
    async fn get(&self, id: &AgentId) -> Result<Option<CustomPersona>> {
        Ok(self.personas.get(id).map(|entry| entry.value().clone()))
    }

    async fn put(&self, persona: CustomPersona) -> Result<()> {
        self.personas.insert(persona.id.clone(), persona);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CustomPersona>> {
        let mut personas: Vec<_> = self
            .personas
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        creation_order(&mut personas);
        Ok(personas)
    }

    async fn delete(&self, id: &AgentId) -> Result<bool> {
        Ok(self.personas.remove(id).is_some())
    }

    async fn record_usage(&self, id: &AgentId) -> Result<()> {
        let mut entry = self
            .personas
            .get_mut(id)
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        entry.usage_count += 1;
        Ok(())
    }

    async fn record_rating(&self, rating: &AgentRating) -> Result<CustomPersona> {
        let mut entry = self
            .personas
            .get_mut(&rating.agent_id)
            .ok_or_else(|| Error::not_found(rating.agent_id.to_string()))?;
        entry.apply_rating(rating)?;
        Ok(entry.value().clone())
    }
}

/// sled-backed store; personas are JSON values keyed by ID
pub struct SledPersonaStore {
    tree: sled::Tree,
    /// Serializes read-modify-write updates
    write_lock: Mutex<()>,
}

impl SledPersonaStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        let tree = db.open_tree("personas")?;
        Ok(Self {
            tree,
            write_lock: Mutex::new(()),
        })
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.tree.flush_async().await?;
        Ok(())
    }

    fn load(&self, id: &AgentId) -> Result<Option<CustomPersona>> {
        match self.tree.get(id.as_str())? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, persona: &CustomPersona) -> Result<()> {
        let bytes = serde_json::to_vec(persona)?;
        self.tree.insert(persona.id.as_str(), bytes)?;
        Ok(())
    }
}

#[async_trait]
impl PersonaStore for SledPersonaStore {
    async fn get(&self, id: &AgentId) -> Result<Option<CustomPersona>> {
        self.load(id)
    }

    async fn put(&self, persona: CustomPersona) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.save(&persona)
    }

    async fn list(&self) -> Result<Vec<CustomPersona>> {
        let mut personas = Vec::new();
        for item in self.tree.iter() {
            let (_, bytes) = item?;
            personas.push(decode(&bytes)?);
        }
        creation_order(&mut personas);
        Ok(personas)
    }

    async fn delete(&self, id: &AgentId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        Ok(self.tree.remove(id.as_str())?.is_some())
    }

    async fn record_usage(&self, id: &AgentId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut persona = self
            .load(id)?
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        persona.usage_count += 1;
        self.save(&persona)
    }

    async fn record_rating(&self, rating: &AgentRating) -> Result<CustomPersona> {
        let _guard = self.write_lock.lock().await;
        let mut persona = self
            .load(&rating.agent_id)?
            .ok_or_else(|| Error::not_found(rating.agent_id.to_string()))?;
        persona.apply_rating(rating)?;
        self.save(&persona)?;
        Ok(persona)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaDraft;
    use chrono::{Duration, Utc};

    fn persona(name: &str, minutes_ago: i64) -> CustomPersona {
        let mut persona = CustomPersona::from_draft(
            PersonaDraft::new(
                name,
                "This agent cares deeply about fairness and uses careful reasoning to decide.",
            ),
            "Weighs fairness first.",
        );
        persona.created_at = Utc::now() - Duration::minutes(minutes_ago);
        persona
    }

    fn rating(agent_id: &AgentId, value: u8) -> AgentRating {
        AgentRating {
            agent_id: agent_id.clone(),
            debate_id: "d1".to_string(),
            user_id: "anonymous".to_string(),
            argument_quality: value,
            consistency: value,
            engagement: value,
            overall_satisfaction: value,
            comment: Some("solid".to_string()),
            created_at: Utc::now(),
        }
    }

    async fn exercise_store(store: &dyn PersonaStore) {
        let newer = persona("Newer", 1);
        let older = persona("Older", 10);
        store.put(newer.clone()).await.unwrap();
        store.put(older.clone()).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Older", "Newer"]);

        store.record_usage(&older.id).await.unwrap();
        store.record_usage(&older.id).await.unwrap();
        let updated = store.record_rating(&rating(&older.id, 4)).await.unwrap();
        assert_eq!(updated.usage_count, 2);
        assert_eq!(updated.rating_count, 1);
        assert!((updated.average_rating - 4.0).abs() < f64::EPSILON);

        let missing = AgentId::new("missing");
        assert!(matches!(
            store.record_usage(&missing).await,
            Err(Error::NotFound(_))
        ));

        assert!(store.delete(&newer.id).await.unwrap());
        assert!(!store.delete(&newer.id).await.unwrap());
        assert!(store.get(&newer.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_names_are_rejected() {
        let store = InMemoryPersonaStore::new();
        let gaia = persona("Gaia", 5);
        let other = persona("Other", 1);
        store.put(gaia.clone()).await.unwrap();
        store.put(other.clone()).await.unwrap();

        assert!(matches!(
            ensure_unique_name(&store, "gaia", None).await,
            Err(Error::InvalidInput(_))
        ));
        ensure_unique_name(&store, "Gaia", Some(&gaia.id)).await.unwrap();
        ensure_unique_name(&store, "Terra", None).await.unwrap();

        let rename = PersonaUpdate {
            name: Some("GAIA".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_persona(&store, &other.id, rename).await,
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(store.get(&other.id).await.unwrap().unwrap().name, "Other");

        let rename = PersonaUpdate {
            name: Some("Terra".to_string()),
            ..Default::default()
        };
        let renamed = update_persona(&store, &other.id, rename).await.unwrap();
        assert_eq!(renamed.name, "Terra");
        assert_eq!(store.get(&other.id).await.unwrap(), Some(renamed));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryPersonaStore::new();
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn test_sled_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledPersonaStore::open(dir.path().join("personas.db")).unwrap();
        exercise_store(&store).await;
        store.flush().await.unwrap();
    }

    #[tokio::test]
    async fn test_sled_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.db");
        let original = persona("Keeper", 0);
        {
            let store = SledPersonaStore::open(&path).unwrap();
            store.put(original.clone()).await.unwrap();
            store.flush().await.unwrap();
        }
        let store = SledPersonaStore::open(&path).unwrap();
        assert_eq!(store.get(&original.id).await.unwrap(), Some(original));
    }

    #[tokio::test]
    async fn test_corrupt_sled_record_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledPersonaStore::open(dir.path().join("personas.db")).unwrap();
        store.tree.insert("broken", &b"not json"[..]).unwrap();

        let broken = AgentId::new("broken");
        assert!(matches!(store.get(&broken).await, Err(Error::Storage(_))));
        assert!(matches!(store.list().await, Err(Error::Storage(_))));
    }
}
