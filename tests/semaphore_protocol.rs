use ksema::config::MAX_SEMS;
use ksema::sync::{Acquire, Release, SemState, SemaphoreTable};
use ksema::task::{Scheduler, TaskManager, TaskStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn empty_start_fill_drain_then_block() {
    ksema::console::init();
    let table: SemaphoreTable = SemaphoreTable::new();
    let tm = TaskManager::new();
    let worker = tm.spawn();
    let other = tm.spawn();
    assert_eq!(tm.schedule(), Some(worker));

    let id = table.create(3, SemState::Empty).unwrap();
    assert_eq!(table.count(id), Ok(0));

    for _ in 0..3 {
        assert_eq!(table.give(id, &tm), Ok(Release::Stored));
    }
    assert_eq!(table.count(id), Ok(3));

    for _ in 0..3 {
        assert_eq!(table.take(id, &tm), Ok(Acquire::Immediate));
    }
    assert_eq!(table.count(id), Ok(0));
    assert_eq!(tm.status(worker), Some(TaskStatus::Running));

    assert_eq!(table.take(id, &tm), Ok(Acquire::Blocked));
    assert_eq!(tm.status(worker), Some(TaskStatus::Blocked));
    assert_eq!(tm.schedule(), Some(other));

    assert_eq!(table.give(id, &tm), Ok(Release::Woke(worker)));
    assert_eq!(tm.status(worker), Some(TaskStatus::Ready));
    assert_eq!(table.count(id), Ok(0));
    assert_eq!(tm.ready_tasks(), [worker]);
}

#[test]
fn uncontended_sequences_track_capped_count() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let table = SemaphoreTable::<MAX_SEMS>::new();
    let tm = TaskManager::new();
    tm.spawn();
    tm.schedule();

    for round in 0..MAX_SEMS {
        let max = rng.gen_range(1..=8);
        let state = if round % 2 == 0 {
            SemState::Empty
        } else {
            SemState::Full
        };
        let id = table.create(max, state).unwrap();
        let mut expected = match state {
            SemState::Empty => 0,
            SemState::Full => max,
        };

        for _ in 0..200 {
            if expected > 0 && rng.gen_bool(0.5) {
                assert_eq!(table.take(id, &tm), Ok(Acquire::Immediate));
                expected -= 1;
            } else {
                let released = table.give(id, &tm).unwrap();
                if expected < max {
                    assert_eq!(released, Release::Stored);
                    expected += 1;
                } else {
                    assert_eq!(released, Release::Saturated);
                }
            }
            assert_eq!(table.count(id), Ok(expected));
            assert!(expected <= max);
        }
        assert_eq!(table.waiters(id), Ok(0));
        assert!(tm.current_task().is_some());
    }
}

#[test]
fn give_with_waiters_never_changes_count() {
    let table = SemaphoreTable::<MAX_SEMS>::new();
    let tm = TaskManager::new();
    let id = table.create(2, SemState::Empty).unwrap();

    let tasks: Vec<_> = (0..4).map(|_| tm.spawn()).collect();
    for &t in &tasks {
        assert_eq!(tm.schedule(), Some(t));
        assert_eq!(table.take(id, &tm), Ok(Acquire::Blocked));
    }

    for &t in &tasks {
        assert_eq!(table.count(id), Ok(0));
        assert_eq!(table.give(id, &tm), Ok(Release::Woke(t)));
        assert_eq!(table.count(id), Ok(0));
    }
    assert_eq!(tm.ready_tasks(), tasks);
    assert_eq!(table.give(id, &tm), Ok(Release::Stored));
    assert_eq!(table.count(id), Ok(1));
}
