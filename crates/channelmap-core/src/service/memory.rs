//! In-memory catalog implementing both collaborator traits
//!
//! Channels are addressed by id or by code. Mappings without an id are assigned one
//! when stored.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::{ChannelSchemaSource, MappingStore};
use crate::error::{Error, Result};
use crate::types::{Catalog, Channel, ChannelField, InternalSchema, MappingSet};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe channel catalog held in memory
#[derive(Debug)]
pub struct InMemoryCatalog {
    internal: InternalSchema,
    channels: RwLock<IndexMap<String, Channel>>,
    next_mapping_id: AtomicU64,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::with_internal_schema(InternalSchema::default())
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_schema(internal: InternalSchema) -> Self {
        Self {
            internal,
            channels: RwLock::new(IndexMap::new()),
            next_mapping_id: AtomicU64::new(1),
        }
    }

    /// Build a catalog from a catalog document
    pub fn from_catalog(catalog: Catalog) -> Result<Self> {
        let store = Self::with_internal_schema(catalog.internal_fields.unwrap_or_default());
        for channel in catalog.channels {
            store.insert_channel(channel)?;
        }
        Ok(store)
    }

    /// Snapshot the catalog as a document
    pub fn to_catalog(&self) -> Result<Catalog> {
        Ok(Catalog {
            internal_fields: Some(self.internal.clone()),
            channels: self.channels()?,
        })
    }

    /// Add or replace a channel, keyed by its id
    pub fn insert_channel(&self, mut channel: Channel) -> Result<()> {
        self.assign_ids(&mut channel.mappings);
        let mut channels = self.write()?;
        if let Some((existing, _)) = channels
            .iter()
            .find(|(id, other)| **id != channel.id && other.code == channel.code)
        {
            return Err(Error::store(format!(
                "channel code '{}' is already used by channel {}",
                channel.code, existing
            )));
        }
        channels.insert(channel.id.clone(), channel);
        Ok(())
    }

    /// All channels in insertion order
    pub fn channels(&self) -> Result<Vec<Channel>> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// Look up a channel by id or code
    pub fn channel(&self, key: &str) -> Result<Channel> {
        let channels = self.read()?;
        Self::find(&channels, key)
            .map(|(_, channel)| channel.clone())
            .ok_or_else(|| Error::channel_not_found(key))
    }

    fn find<'a>(channels: &'a IndexMap<String, Channel>, key: &str) -> Option<(&'a String, &'a Channel)> {
        channels
            .get_key_value(key)
            .or_else(|| channels.iter().find(|(_, channel)| channel.code == key))
    }

    fn assign_ids(&self, mappings: &mut MappingSet) {
        for mapping in mappings.iter() {
            if let Some(id) = mapping.id {
                self.next_mapping_id.fetch_max(id.saturating_add(1), Ordering::Relaxed);
            }
        }
        for mapping in mappings.iter_mut().filter(|mapping| mapping.id.is_none()) {
            mapping.id = Some(self.next_mapping_id.fetch_add(1, Ordering::Relaxed));
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexMap<String, Channel>>> {
        self.channels
            .read()
            .map_err(|_| Error::store("catalog lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexMap<String, Channel>>> {
        self.channels
            .write()
            .map_err(|_| Error::store("catalog lock poisoned"))
    }
}

impl ChannelSchemaSource for InMemoryCatalog {
    fn channel_fields(&self, channel_id: &str) -> Result<Vec<ChannelField>> {
        Ok(self.channel(channel_id)?.fields)
    }

    fn internal_schema(&self) -> Result<InternalSchema> {
        Ok(self.internal.clone())
    }
}

impl MappingStore for InMemoryCatalog {
    fn fetch_mappings(&self, channel_id: &str) -> Result<MappingSet> {
        Ok(self.channel(channel_id)?.mappings)
    }

    fn replace_mappings(&self, channel_id: &str, mut mappings: MappingSet) -> Result<()> {
        self.assign_ids(&mut mappings);
        let mut channels = self.write()?;
        let id = Self::find(&channels, channel_id)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| Error::channel_not_found(channel_id))?;
        if let Some(channel) = channels.get_mut(&id) {
            channel.mappings = mappings;
        }
        Ok(())
    }
}
