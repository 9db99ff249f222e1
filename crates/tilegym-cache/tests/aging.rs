//! Aging and eviction across many episodes.

use tilegym_cache::{Bootstrapping, LevelCache, Outcome};
use tilegym_core::{Action, Pos, TileGrid, TileId};
use tilegym_env::Env;
use tilegym_test_utils::{scenario_a, scenario_b, ScriptedEnv};

#[test]
fn slot_ages_then_stagnates_and_is_purged() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = LevelCache::builder()
        .dir(tmp.path())
        .capacity(3)
        .aging_threshold(10)
        .open()
        .unwrap();
    assert_eq!(cache.store_next(&scenario_a()).unwrap(), Some(0));

    // Bar starts at 10, then 9.
    assert_eq!(
        cache.record_outcome(10.5, &scenario_b()).unwrap(),
        Outcome::Promoted { slot: 0, age: 1 }
    );
    assert_eq!(
        cache.record_outcome(9.5, &scenario_a()).unwrap(),
        Outcome::Promoted { slot: 0, age: 2 }
    );
    assert_eq!(cache.load(0).unwrap(), scenario_a());

    // Bar is now 8; an 8.0 does not clear it.
    for n in 1..=12 {
        assert_eq!(
            cache.record_outcome(8.0, &scenario_b()).unwrap(),
            Outcome::Failed { slot: 0, tries: n }
        );
    }
    assert_eq!((cache.age(0), cache.tries(0)), (2, 12));
    assert!(cache.slot_path(0).is_file());

    assert_eq!(
        cache.record_outcome(0.0, &scenario_b()).unwrap(),
        Outcome::Evicted { slot: 0 }
    );
    assert_eq!((cache.age(0), cache.tries(0)), (0, 0));
    assert!(!cache.is_occupied(0));
    assert!(!cache.slot_path(0).exists());
    assert_eq!(cache.store_next(&scenario_b()).unwrap(), Some(0));
}

#[test]
fn every_slot_written_after_capacity_episodes() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = LevelCache::builder()
        .dir(tmp.path())
        .capacity(4)
        .open()
        .unwrap();
    let mut scripted = ScriptedEnv::coding(11);
    for _ in 0..4 {
        scripted.push_episode(0.0, 2);
    }
    let mut env = Bootstrapping::new(scripted, cache);
    for episode in 0..4 {
        env.reset().unwrap();
        assert_eq!(env.cache().current_slot(), episode);
        env.step(&Action::multi(&[episode, 0, 1])).unwrap();
        env.step(&Action::multi(&[episode, 1, 1])).unwrap();
    }
    assert!(env.cache().is_full());
    for slot in 0..4 {
        assert!(env.cache().slot_path(slot).is_file());
        assert_eq!(env.cache().tries(slot), 1);
    }
}

#[test]
fn seeded_episodes_age_and_purge_a_single_slot() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = LevelCache::builder()
        .dir(tmp.path())
        .capacity(1)
        .aging_threshold(10)
        .p_random(0.0)
        .open()
        .unwrap();
    let mut scripted = ScriptedEnv::coding(21);
    scripted.push_episode(11.0, 1).push_episode(9.5, 1);
    for _ in 0..13 {
        scripted.push_episode(0.0, 1);
    }
    let mut env = Bootstrapping::new(scripted, cache);
    let edit = |x: usize| Action::multi(&[x, 2, 1]);

    env.reset().unwrap();
    env.step(&edit(1)).unwrap();
    let first_final = env.level().grid().clone();
    assert_eq!(env.cache().age(0), 1);

    // The cache is full, so this episode starts from the promoted level.
    env.reset().unwrap();
    assert!(!env.is_random_run());
    assert_eq!(env.level().grid(), &first_final);
    env.step(&edit(2)).unwrap();
    assert_eq!(env.cache().age(0), 2);

    for n in 1..=12 {
        env.reset().unwrap();
        env.step(&edit(3)).unwrap();
        assert_eq!(env.last_outcome(), Some(Outcome::Failed { slot: 0, tries: n }));
    }
    env.reset().unwrap();
    env.step(&edit(4)).unwrap();
    assert_eq!(env.last_outcome(), Some(Outcome::Evicted { slot: 0 }));
    assert!(!env.cache().is_full());

    // The purged slot is refilled with the last final level.
    let purged_final = env.level().grid().clone();
    env.reset().unwrap();
    assert_eq!(env.cache().load(0).unwrap(), purged_final);
    assert_eq!((env.cache().age(0), env.cache().tries(0)), (0, 0));
}

#[test]
fn reopened_cache_seeds_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let mut level = TileGrid::filled(14, 14, TileId(0)).unwrap();
    level.set(Pos::new(6, 6), TileId(3)).unwrap();
    {
        let mut cache = LevelCache::builder()
            .dir(tmp.path())
            .capacity(1)
            .open()
            .unwrap();
        cache.store_next(&level).unwrap();
    }
    let cache = LevelCache::builder()
        .dir(tmp.path())
        .capacity(1)
        .p_random(0.0)
        .open()
        .unwrap();
    let mut env = Bootstrapping::new(ScriptedEnv::coding(3), cache);
    env.reset().unwrap();
    assert_eq!(env.level().grid(), &level);
}
