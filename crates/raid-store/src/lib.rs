//! Raid Store - RON persistence for raid-core
//!
//! All state lives under one data directory:
//!
//! ```text
//! <root>/
//!   settings.ron     Settings
//!   profiles.ron     { "name": BuildingProfile }
//!   loot.ron         LootTables
//!   lockouts.ron     { PlayerId: LockoutRecord }
//!   stats.ron        RaidStats
//!   rotation.ron     Rotation
//!   spawns/*.ron     [SpawnCandidate], one file per spawn index
//! ```
//!
//! Missing files read as defaults, so an empty directory boots a
//! working manager.

mod error;
pub mod store;

pub use error::{Error, Result};

use indexmap::IndexMap;
use raid_core::lockout::LockoutRecord;
use raid_core::profile::Rotation;
use raid_core::{
    BuildingProfile, Clock, LootTables, Lockouts, PlayerId, RaidManager, RaidStats, Settings,
    SpawnCandidate,
};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.ron";
const PROFILES_FILE: &str = "profiles.ron";
const LOOT_FILE: &str = "loot.ron";
const LOCKOUTS_FILE: &str = "lockouts.ron";
const STATS_FILE: &str = "stats.ron";
const ROTATION_FILE: &str = "rotation.ron";
const SPAWNS_DIR: &str = "spawns";

/// Handle on a data directory
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Open (and create if needed) a data directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(SPAWNS_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    pub fn settings(&self) -> Result<Settings> {
        store::read_or_default(&self.path(SETTINGS_FILE))
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        store::write(&self.path(SETTINGS_FILE), settings)
    }

    /// Building profiles keyed by blueprint name.
    ///
    /// An empty `name` takes the key; a name that disagrees with its key
    /// is overwritten so the registry key stays the file key.
    pub fn profiles(&self) -> Result<Vec<BuildingProfile>> {
        let records: IndexMap<String, BuildingProfile> =
            store::read_records(&self.path(PROFILES_FILE))?;
        let mut profiles = Vec::with_capacity(records.len());
        for (key, mut profile) in records {
            if key.trim().is_empty() {
                return Err(Error::InvalidRecord {
                    key,
                    reason: "profile key is empty".to_string(),
                });
            }
            if profile.name.is_empty() {
                profile.name = key;
            } else if profile.name != key {
                log::warn!(
                    "profile '{}' is stored under key '{}', using the key",
                    profile.name,
                    key
                );
                profile.name = key;
            }
            profiles.push(profile);
        }
        Ok(profiles)
    }

    pub fn save_profiles(&self, profiles: &[BuildingProfile]) -> Result<()> {
        let records: IndexMap<String, BuildingProfile> = profiles
            .iter()
            .map(|p| (p.name.clone(), p.clone()))
            .collect();
        store::write_records(&self.path(PROFILES_FILE), &records)
    }

    pub fn loot_tables(&self) -> Result<LootTables> {
        store::read_or_default(&self.path(LOOT_FILE))
    }

    pub fn lockouts(&self) -> Result<Lockouts> {
        let records: IndexMap<PlayerId, LockoutRecord> =
            store::read_records(&self.path(LOCKOUTS_FILE))?;
        Ok(Lockouts::from_records(records))
    }

    pub fn save_lockouts(&self, lockouts: &Lockouts) -> Result<()> {
        store::write_records(&self.path(LOCKOUTS_FILE), lockouts.records())
    }

    pub fn stats(&self) -> Result<RaidStats> {
        store::read_or_default(&self.path(STATS_FILE))
    }

    pub fn save_stats(&self, stats: &RaidStats) -> Result<()> {
        store::write(&self.path(STATS_FILE), stats)
    }

    pub fn rotation(&self) -> Result<Rotation> {
        store::read_or_default(&self.path(ROTATION_FILE))
    }

    pub fn save_rotation(&self, rotation: &Rotation) -> Result<()> {
        store::write(&self.path(ROTATION_FILE), rotation)
    }

    /// Every `spawns/*.ron` file, keyed by file stem, in name order
    pub fn spawn_files(&self) -> Result<Vec<(String, Vec<SpawnCandidate>)>> {
        let dir = self.path(SPAWNS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "ron").unwrap_or(false) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("skipping spawn file with a non UTF-8 name: {:?}", path);
                continue;
            };
            let candidates: Vec<SpawnCandidate> = store::read_or_default(&path)?;
            files.push((name.to_string(), candidates));
        }
        Ok(files)
    }

    pub fn save_spawn_file(&self, name: &str, candidates: &[SpawnCandidate]) -> Result<()> {
        if name.is_empty() || name.contains(['/', '\\', '.']) {
            return Err(Error::InvalidRecord {
                key: name.to_string(),
                reason: "spawn file names must be plain words".to_string(),
            });
        }
        let path = self.path(SPAWNS_DIR).join(format!("{}.ron", name));
        store::write(&path, &candidates)
    }

    /// Build a manager from everything on disk
    pub fn bootstrap(&self, clock: Clock) -> Result<RaidManager> {
        let settings = self.settings()?;
        let profiles = self.profiles()?;
        let tables = self.loot_tables()?;
        let mut lockouts = self.lockouts()?;
        let pruned = lockouts.prune(clock.epoch_secs());
        if pruned > 0 {
            log::debug!("dropped {} expired lockouts on load", pruned);
        }

        let mut manager =
            RaidManager::new(settings, profiles, tables, clock).with_records(lockouts, self.stats()?);
        manager.restore_rotation(self.rotation()?);
        for (name, candidates) in self.spawn_files()? {
            manager.load_spawn_file(&name, candidates);
        }
        log::info!(
            "bootstrapped from {}: {} profiles",
            self.root.display(),
            manager.profiles().len()
        );
        Ok(manager)
    }

    /// Re-read configuration into a running manager; live events are kept
    pub fn reload(&self, manager: &mut RaidManager) -> Result<()> {
        let settings = self.settings()?;
        let profiles = self.profiles()?;
        let tables = self.loot_tables()?;
        manager.reinitialize(settings, profiles, tables);
        for (name, candidates) in self.spawn_files()? {
            manager.load_spawn_file(&name, candidates);
        }
        Ok(())
    }

    /// Write the manager's mutable records back to disk
    pub fn persist(&self, manager: &RaidManager) -> Result<()> {
        self.save_lockouts(manager.lockouts())?;
        self.save_stats(manager.stats())?;
        self.save_rotation(manager.profiles().rotation())?;
        log::debug!("persisted records to {}", self.root.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use raid_core::{Difficulty, Vec3};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT: AtomicUsize = AtomicUsize::new(0);

    /// Fresh empty directory under the system temp dir
    pub(crate) fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "raid-store-{}-{}-{}",
            tag,
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_empty_dir_boots_defaults() {
        let data = DataDir::open(scratch_dir("empty")).unwrap();
        assert!(data.root().join(SPAWNS_DIR).is_dir());

        let manager = data.bootstrap(Clock::new(1_700_000_000)).unwrap();
        assert!(manager.profiles().is_empty());
        assert!(manager.lockouts().is_empty());
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn test_profiles_take_their_key() {
        let data = DataDir::open(scratch_dir("profiles")).unwrap();
        fs::write(
            data.root().join(PROFILES_FILE),
            r#"{
                "fort": (difficulty: Easy, spawns: Some("field")),
                "tower": (name: "keep", difficulty: Hard),
            }"#,
        )
        .unwrap();

        let profiles = data.profiles().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "fort");
        assert_eq!(profiles[0].spawns.as_deref(), Some("field"));
        assert_eq!(profiles[1].name, "tower");
        assert_eq!(profiles[1].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_empty_profile_key_is_rejected() {
        let data = DataDir::open(scratch_dir("blank")).unwrap();
        fs::write(data.root().join(PROFILES_FILE), r#"{ " ": (difficulty: Easy) }"#).unwrap();
        assert!(matches!(
            data.profiles(),
            Err(Error::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_spawn_files_load_by_stem() {
        let data = DataDir::open(scratch_dir("spawns")).unwrap();
        let field = vec![
            SpawnCandidate::at(Vec3::flat(10.0, 20.0)),
            SpawnCandidate::at(Vec3::flat(-10.0, 20.0)),
        ];
        data.save_spawn_file("field", &field).unwrap();
        data.save_spawn_file("beach", &field[..1]).unwrap();
        fs::write(data.root().join(SPAWNS_DIR).join("notes.txt"), "ignored").unwrap();

        let files = data.spawn_files().unwrap();
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["beach", "field"]);
        assert_eq!(files[1].1, field);

        assert!(data.save_spawn_file("../escape", &field).is_err());

        let manager = data.bootstrap(Clock::new(0)).unwrap();
        assert_eq!(manager.spawn_index("field").map(|i| i.count()), Some(2));
    }

    #[test]
    fn test_persist_round_trips_records() {
        let data = DataDir::open(scratch_dir("persist")).unwrap();
        let now = 1_700_000_000;

        let mut lockouts = Lockouts::new();
        lockouts.set(PlayerId(7), Difficulty::Easy, now, 600);
        lockouts.set(PlayerId(8), Difficulty::Easy, now - 10_000, 600);
        let mut stats = RaidStats::default();
        stats.record_open(Difficulty::Easy);
        stats.record_completion(Difficulty::Easy, &[PlayerId(7)]);

        let manager = RaidManager::new(
            Settings::default(),
            vec![BuildingProfile::new("fort", Difficulty::Easy)],
            LootTables::default(),
            Clock::new(now),
        )
        .with_records(lockouts, stats);
        data.persist(&manager).unwrap();
        data.save_profiles(&[BuildingProfile::new("fort", Difficulty::Easy)])
            .unwrap();

        let restored = data.bootstrap(Clock::new(now)).unwrap();
        // The stale lockout is pruned on load
        assert_eq!(restored.lockouts().len(), 1);
        assert!(restored
            .lockouts()
            .has_lockout(PlayerId(7), Difficulty::Easy, now + 1));
        assert_eq!(restored.stats().completions(PlayerId(7), Difficulty::Easy), 1);
        assert!(restored.profiles().get("fort").is_some());
    }

    #[test]
    fn test_reload_keeps_records() {
        let data = DataDir::open(scratch_dir("reload")).unwrap();
        let mut manager = data.bootstrap(Clock::new(0)).unwrap();
        assert!(manager.profiles().is_empty());

        data.save_profiles(&[BuildingProfile::new("tower", Difficulty::Hard)])
            .unwrap();
        data.save_spawn_file("field", &[SpawnCandidate::at(Vec3::flat(0.0, 0.0))])
            .unwrap();
        data.reload(&mut manager).unwrap();

        assert!(manager.profiles().get("tower").is_some());
        assert!(manager.spawn_index("field").is_some());
    }

    #[test]
    fn test_bad_settings_surface_the_file() {
        let data = DataDir::open(scratch_dir("settings")).unwrap();
        fs::write(data.root().join(SETTINGS_FILE), "(seed: \"nope\")").unwrap();
        match data.settings() {
            Err(Error::Ron { file, .. }) => assert!(file.ends_with(SETTINGS_FILE)),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
