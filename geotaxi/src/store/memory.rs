use super::{Store, StoreError};
use async_trait::async_trait;
use geotaxi_codecs::resp::Command;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct Contents {
    pub hashes: HashMap<String, HashMap<String, String>>,
    pub geo: HashMap<String, HashMap<String, (f64, f64)>>,
    pub zsets: HashMap<String, HashMap<String, f64>>,
    pub sets: HashMap<String, HashSet<String>>,
    pub batches: Vec<Vec<Command>>,
}

impl Contents {
    pub fn score(&self, key: &str, member: &str) -> Option<f64> {
        self.zsets.get(key)?.get(member).copied()
    }

    pub fn key_count(&self) -> usize {
        self.hashes.len() + self.geo.len() + self.zsets.len() + self.sets.len()
    }
}

/// In-process stand-in for the store. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Arc<Mutex<Contents>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn contents(&self) -> MutexGuard<'_, Contents> {
        self.contents.lock().unwrap()
    }

    /// Makes every following batch fail as if the connection dropped.
    pub fn fail(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn pipeline(&mut self, commands: Vec<Command>) -> Result<(), StoreError> {
        if *self.failing.lock().unwrap() {
            return Err(StoreError::Closed);
        }
        let mut contents = self.contents.lock().unwrap();
        for command in &commands {
            match command.clone() {
                Command::Auth { .. } => {}
                Command::HSet { key, field, value } => {
                    contents.hashes.entry(key).or_default().insert(field, value);
                }
                Command::GeoAdd {
                    key,
                    lon,
                    lat,
                    member,
                } => {
                    contents.geo.entry(key).or_default().insert(member, (lon, lat));
                }
                Command::ZAdd { key, score, member } => {
                    contents
                        .zsets
                        .entry(key)
                        .or_default()
                        .insert(member, score as f64);
                }
                Command::ZIncrBy {
                    key,
                    increment,
                    member,
                } => {
                    *contents
                        .zsets
                        .entry(key)
                        .or_default()
                        .entry(member)
                        .or_default() += increment as f64;
                }
                Command::SAdd { key, member } => {
                    contents.sets.entry(key).or_default().insert(member);
                }
            }
        }
        contents.batches.push(commands);
        Ok(())
    }
}
