//! Slot bookkeeping and durable storage.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use tilegym_core::TileGrid;
use tracing::{debug, info};

use crate::codec::{self, DecodeError};
use crate::error::CacheError;

/// Default number of slots.
pub const DEFAULT_CAPACITY: usize = 100;
/// Default aging threshold.
pub const DEFAULT_AGING_THRESHOLD: u32 = 10;
/// Default probability of a fresh random start once the cache is full.
pub const DEFAULT_P_RANDOM: f64 = 0.7;

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    occupied: bool,
    age: u32,
    tries: u32,
}

/// How the next episode should start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Start {
    /// The cache is still filling; start normally.
    Grow,
    /// Start from a fresh random map; the episode is not scored.
    Random,
    /// Start from the level stored in `slot`.
    Seeded {
        /// Slot the level came from.
        slot: usize,
        /// The stored level.
        grid: TileGrid,
    },
}

/// What an episode outcome did to its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The episode beat the slot; its level was replaced.
    Promoted {
        /// The slot.
        slot: usize,
        /// Age after promotion.
        age: u32,
    },
    /// The episode did not beat the slot.
    Failed {
        /// The slot.
        slot: usize,
        /// Failed tries so far.
        tries: u32,
    },
    /// The slot failed too often and was emptied.
    Evicted {
        /// The slot.
        slot: usize,
    },
}

/// Builder for [`LevelCache`].
///
/// Required: `dir`. Defaults: capacity [`DEFAULT_CAPACITY`], aging
/// threshold [`DEFAULT_AGING_THRESHOLD`], `p_random` [`DEFAULT_P_RANDOM`].
#[derive(Clone, Debug)]
pub struct LevelCacheBuilder {
    dir: Option<PathBuf>,
    capacity: usize,
    aging_threshold: u32,
    p_random: f64,
}

impl LevelCacheBuilder {
    /// Directory holding the slot files. Created if missing.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Number of slots. Must be > 0.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Reward bar at age zero, and the eviction margin for `tries - age`.
    pub fn aging_threshold(mut self, threshold: u32) -> Self {
        self.aging_threshold = threshold;
        self
    }

    /// Probability of a random start once full. Must lie in `[0, 1]`.
    pub fn p_random(mut self, p: f64) -> Self {
        self.p_random = p;
        self
    }

    /// Validate the configuration and open the cache.
    ///
    /// Slot files already in the directory are loaded with their
    /// counters.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidConfig`] for a missing directory, zero
    /// capacity or a `p_random` outside `[0, 1]`; [`CacheError::Io`] or
    /// [`CacheError::Corrupt`] if an existing slot file cannot be read.
    pub fn open(self) -> Result<LevelCache, CacheError> {
        let dir = self.dir.ok_or_else(|| CacheError::InvalidConfig {
            reason: "dir is required".into(),
        })?;
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig {
                reason: "capacity must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.p_random) {
            return Err(CacheError::InvalidConfig {
                reason: format!("p_random must lie in [0, 1], got {}", self.p_random),
            });
        }
        fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;

        let mut cache = LevelCache {
            dir,
            aging_threshold: self.aging_threshold,
            p_random: self.p_random,
            slots: vec![Slot::default(); self.capacity],
            current: 0,
        };
        for slot in 0..self.capacity {
            let path = cache.slot_path(slot);
            if path.is_file() {
                let rec = read_record(&path)?;
                cache.slots[slot] = Slot {
                    occupied: true,
                    age: rec.age,
                    tries: rec.tries,
                };
            }
        }
        debug!(
            dir = %cache.dir.display(),
            stored = cache.stored_count(),
            capacity = self.capacity,
            "level cache opened"
        );
        Ok(cache)
    }
}

/// A fixed set of slots, each holding a level with its age and failed-try
/// counters, mirrored one file per slot.
///
/// A slot that keeps being beaten ages and gets harder to replace. A slot
/// whose `tries - age` exceeds the aging threshold is emptied.
#[derive(Debug)]
pub struct LevelCache {
    dir: PathBuf,
    aging_threshold: u32,
    p_random: f64,
    slots: Vec<Slot>,
    current: usize,
}

impl LevelCache {
    /// Start configuring a cache.
    pub fn builder() -> LevelCacheBuilder {
        LevelCacheBuilder {
            dir: None,
            capacity: DEFAULT_CAPACITY,
            aging_threshold: DEFAULT_AGING_THRESHOLD,
            p_random: DEFAULT_P_RANDOM,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The aging threshold.
    pub fn aging_threshold(&self) -> u32 {
        self.aging_threshold
    }

    /// Probability of a random start once full.
    pub fn p_random(&self) -> f64 {
        self.p_random
    }

    /// Slots holding a level.
    pub fn stored_count(&self) -> usize {
        self.slots.iter().filter(|s| s.occupied).count()
    }

    /// Whether every slot holds a level.
    pub fn is_full(&self) -> bool {
        self.stored_count() >= self.capacity()
    }

    /// Whether `slot` holds a level.
    pub fn is_occupied(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.occupied)
    }

    /// The slot outcomes are recorded against.
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// Times `slot` has been beaten.
    pub fn age(&self, slot: usize) -> u32 {
        self.slots.get(slot).map_or(0, |s| s.age)
    }

    /// Failed attempts at `slot`.
    pub fn tries(&self, slot: usize) -> u32 {
        self.slots.get(slot).map_or(0, |s| s.tries)
    }

    /// File backing `slot`.
    pub fn slot_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("map_{slot}.tgm"))
    }

    /// Read the level stored in `slot`.
    pub fn load(&self, slot: usize) -> Result<TileGrid, CacheError> {
        if !self.is_occupied(slot) {
            return Err(CacheError::MissingSlot { slot });
        }
        Ok(read_record(&self.slot_path(slot))?.grid)
    }

    /// Decide how the next episode starts.
    ///
    /// While the cache is filling this is always [`Start::Grow`]. Once
    /// full, a random start is drawn with probability `p_random`;
    /// otherwise a uniformly chosen slot becomes current and its level is
    /// returned.
    pub fn choose_start<R: Rng>(&mut self, rng: &mut R) -> Result<Start, CacheError> {
        if !self.is_full() {
            return Ok(Start::Grow);
        }
        if rng.random::<f64>() < self.p_random {
            return Ok(Start::Random);
        }
        let slot = rng.random_range(0..self.capacity());
        self.current = slot;
        let grid = self.load(slot)?;
        debug!(slot, "seeding episode from cache");
        Ok(Start::Seeded { slot, grid })
    }

    /// Store `grid` in the first empty slot at or after the current one,
    /// wrapping around, and make it current.
    ///
    /// Returns the slot used, or `None` when the cache is full.
    pub fn store_next(&mut self, grid: &TileGrid) -> Result<Option<usize>, CacheError> {
        let n = self.capacity();
        let Some(slot) = (0..n)
            .map(|k| (self.current + k) % n)
            .find(|&s| !self.slots[s].occupied)
        else {
            return Ok(None);
        };
        self.write_slot(slot, grid, 0, 0)?;
        self.slots[slot] = Slot {
            occupied: true,
            age: 0,
            tries: 0,
        };
        self.current = slot;
        debug!(slot, stored = self.stored_count(), "stored level");
        Ok(Some(slot))
    }

    /// Score an episode against the current slot.
    ///
    /// A `reward` above `max(aging_threshold - age, 0)` replaces the slot's
    /// level with `grid` and ages it. Anything else counts as a failed
    /// try; once `tries - age` exceeds the aging threshold the slot is
    /// emptied and its counters reset.
    ///
    /// # Errors
    ///
    /// [`CacheError::MissingSlot`] if the current slot is empty, or an I/O
    /// error from updating its file.
    pub fn record_outcome(&mut self, reward: f64, grid: &TileGrid) -> Result<Outcome, CacheError> {
        let slot = self.current;
        let Slot { occupied, age, tries } = self.slots[slot];
        if !occupied {
            return Err(CacheError::MissingSlot { slot });
        }

        let bar = f64::from(self.aging_threshold.saturating_sub(age));
        if reward > bar {
            let age = age + 1;
            self.write_slot(slot, grid, age, tries)?;
            self.slots[slot].age = age;
            info!(slot, age, reward, "cache slot promoted");
            return Ok(Outcome::Promoted { slot, age });
        }

        let tries = tries + 1;
        if tries.saturating_sub(age) > self.aging_threshold {
            let path = self.slot_path(slot);
            fs::remove_file(&path).map_err(|e| CacheError::io(&path, e))?;
            self.slots[slot] = Slot::default();
            info!(slot, age, tries, "cache slot evicted");
            return Ok(Outcome::Evicted { slot });
        }

        let path = self.slot_path(slot);
        let mut file = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|e| CacheError::io(&path, e))?;
        codec::write_counters(&mut file, age, tries).map_err(|e| CacheError::io(&path, e))?;
        self.slots[slot].tries = tries;
        debug!(slot, age, tries, reward, "cache slot held");
        Ok(Outcome::Failed { slot, tries })
    }

    fn write_slot(
        &self,
        slot: usize,
        grid: &TileGrid,
        age: u32,
        tries: u32,
    ) -> Result<(), CacheError> {
        let path = self.slot_path(slot);
        let write = || -> io::Result<()> {
            let mut w = BufWriter::new(File::create(&path)?);
            codec::encode(&mut w, grid, age, tries)?;
            w.flush()
        };
        write().map_err(|e| CacheError::io(&path, e))
    }
}

fn read_record(path: &Path) -> Result<codec::SlotRecord, CacheError> {
    let file = File::open(path).map_err(|e| CacheError::io(path, e))?;
    codec::decode(&mut BufReader::new(file)).map_err(|e| match e {
        DecodeError::Io(source) => CacheError::io(path, source),
        DecodeError::Malformed(detail) => CacheError::Corrupt {
            path: path.to_path_buf(),
            detail,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tilegym_core::{Pos, TileId};

    fn grid(mark: u8) -> TileGrid {
        let mut g = TileGrid::filled(4, 3, TileId(0)).unwrap();
        g.set(Pos::new(1, 1), TileId(mark)).unwrap();
        g
    }

    fn open(dir: &Path, capacity: usize) -> LevelCache {
        LevelCache::builder()
            .dir(dir)
            .capacity(capacity)
            .open()
            .unwrap()
    }

    #[test]
    fn builder_validates() {
        assert!(matches!(
            LevelCache::builder().open(),
            Err(CacheError::InvalidConfig { .. })
        ));
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            LevelCache::builder().dir(tmp.path()).capacity(0).open(),
            Err(CacheError::InvalidConfig { .. })
        ));
        assert!(matches!(
            LevelCache::builder().dir(tmp.path()).p_random(1.5).open(),
            Err(CacheError::InvalidConfig { .. })
        ));
        let cache = LevelCache::builder().dir(tmp.path()).open().unwrap();
        assert_eq!(cache.capacity(), 100);
        assert_eq!(cache.aging_threshold(), 10);
        assert_eq!(cache.p_random(), 0.7);
    }

    #[test]
    fn stores_round_robin_until_full() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = open(tmp.path(), 3);
        assert_eq!(cache.store_next(&grid(1)).unwrap(), Some(0));
        assert_eq!(cache.store_next(&grid(2)).unwrap(), Some(1));
        assert_eq!(cache.store_next(&grid(3)).unwrap(), Some(2));
        assert!(cache.is_full());
        assert_eq!(cache.store_next(&grid(4)).unwrap(), None);
        assert_eq!(cache.load(1).unwrap(), grid(2));
        assert!(cache.slot_path(2).is_file());
    }

    #[test]
    fn refills_evicted_slot_first() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = LevelCache::builder()
            .dir(tmp.path())
            .capacity(3)
            .aging_threshold(0)
            .open()
            .unwrap();
        cache.store_next(&grid(1)).unwrap();
        cache.store_next(&grid(2)).unwrap();
        // threshold 0: the first failure already has tries - age = 1 > 0.
        assert_eq!(
            cache.record_outcome(0.0, &grid(9)).unwrap(),
            Outcome::Evicted { slot: 1 }
        );
        assert!(!cache.slot_path(1).exists());
        assert_eq!(cache.store_next(&grid(5)).unwrap(), Some(1));
        assert_eq!(cache.store_next(&grid(6)).unwrap(), Some(2));
    }

    #[test]
    fn promotion_raises_the_bar() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = open(tmp.path(), 2);
        cache.store_next(&grid(1)).unwrap();
        assert_eq!(
            cache.record_outcome(10.0, &grid(2)).unwrap(),
            Outcome::Failed { slot: 0, tries: 1 }
        );
        assert_eq!(
            cache.record_outcome(10.5, &grid(2)).unwrap(),
            Outcome::Promoted { slot: 0, age: 1 }
        );
        assert_eq!(cache.load(0).unwrap(), grid(2));
        // bar is now 9
        assert_eq!(
            cache.record_outcome(9.5, &grid(3)).unwrap(),
            Outcome::Promoted { slot: 0, age: 2 }
        );
        assert_eq!((cache.age(0), cache.tries(0)), (2, 1));
    }

    #[test]
    fn counters_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut cache = open(tmp.path(), 2);
            cache.store_next(&grid(1)).unwrap();
            cache.record_outcome(11.0, &grid(2)).unwrap();
            cache.record_outcome(0.0, &grid(3)).unwrap();
            cache.record_outcome(0.0, &grid(3)).unwrap();
        }
        let cache = open(tmp.path(), 2);
        assert_eq!(cache.stored_count(), 1);
        assert_eq!((cache.age(0), cache.tries(0)), (1, 2));
        assert_eq!(cache.load(0).unwrap(), grid(2));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("map_1.tgm"), b"nope, not a level").unwrap();
        let err = LevelCache::builder()
            .dir(tmp.path())
            .capacity(2)
            .open()
            .unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { .. }));
    }

    #[test]
    fn empty_slots_are_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = open(tmp.path(), 2);
        assert!(matches!(cache.load(0), Err(CacheError::MissingSlot { slot: 0 })));
        assert!(matches!(
            cache.record_outcome(1.0, &grid(1)),
            Err(CacheError::MissingSlot { slot: 0 })
        ));
    }

    #[test]
    fn start_depends_on_fill_and_p_random() {
        let tmp = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut cache = LevelCache::builder()
            .dir(tmp.path())
            .capacity(2)
            .p_random(0.0)
            .open()
            .unwrap();
        assert_eq!(cache.choose_start(&mut rng).unwrap(), Start::Grow);
        cache.store_next(&grid(1)).unwrap();
        cache.store_next(&grid(2)).unwrap();
        for _ in 0..10 {
            match cache.choose_start(&mut rng).unwrap() {
                Start::Seeded { slot, grid: g } => {
                    assert_eq!(cache.current_slot(), slot);
                    assert_eq!(g, grid(slot as u8 + 1));
                }
                other => panic!("expected a seeded start, got {other:?}"),
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let mut cache = LevelCache::builder()
            .dir(tmp.path())
            .capacity(1)
            .p_random(1.0)
            .open()
            .unwrap();
        cache.store_next(&grid(1)).unwrap();
        assert_eq!(cache.choose_start(&mut rng).unwrap(), Start::Random);
    }
}
