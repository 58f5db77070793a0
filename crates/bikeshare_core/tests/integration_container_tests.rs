mod support;

use bevy_ecs::prelude::Entity;
use bikeshare_core::container::{RequestKind, RequestOutcome, ResourceContainer, Waiter};
use bikeshare_core::error::KernelError;
use bikeshare_core::process::ProcessId;
use proptest::prelude::*;

fn pid(raw: u32) -> ProcessId {
    ProcessId::from(Entity::from_raw(raw))
}

#[test]
fn oversized_get_on_full_dock_is_invalid() {
    let mut dock = ResourceContainer::new("dock", 10, 0).unwrap();
    dock.put(pid(1), 10).unwrap();
    assert_eq!(
        dock.get(pid(2), 15),
        Err(KernelError::InvalidAmount {
            amount: 15,
            capacity: 10
        })
    );
    assert_eq!(dock.level(), 10);
}

#[test]
fn front_waiter_is_released_and_the_next_keeps_waiting() {
    let mut dock = ResourceContainer::new("dock", 5, 0).unwrap();
    assert_eq!(dock.get(pid(1), 3).unwrap(), RequestOutcome::Queued);
    assert_eq!(dock.get(pid(2), 1).unwrap(), RequestOutcome::Queued);

    let RequestOutcome::Granted { released } = dock.put(pid(3), 3).unwrap() else {
        panic!("put into an empty dock should be granted");
    };
    assert_eq!(released.iter().map(|w| w.process).collect::<Vec<_>>(), vec![pid(1)]);
    assert_eq!(dock.level(), 0);
    assert_eq!(dock.waiter_count(), 1);
}

#[test]
fn one_put_can_release_several_waiters() {
    let mut dock = ResourceContainer::new("dock", 6, 0).unwrap();
    dock.get(pid(1), 2).unwrap();
    dock.get(pid(2), 2).unwrap();
    dock.get(pid(3), 3).unwrap();

    let RequestOutcome::Granted { released } = dock.put(pid(9), 5).unwrap() else {
        panic!("put should be granted");
    };
    assert_eq!(
        released,
        vec![
            Waiter { process: pid(1), amount: 2, kind: RequestKind::Get },
            Waiter { process: pid(2), amount: 2, kind: RequestKind::Get },
        ]
    );
    assert_eq!(dock.level(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Get(u32),
    Put(u32),
}

fn arb_op(capacity: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..=capacity).prop_map(Op::Get),
        (1..=capacity).prop_map(Op::Put),
    ]
}

proptest! {
    #[test]
    fn level_stays_within_bounds(
        capacity in 1u32..12,
        initial in 0u32..12,
        ops in prop::collection::vec(arb_op(12), 0..80),
    ) {
        let initial = initial.min(capacity);
        let mut dock = ResourceContainer::new("dock", capacity, initial).unwrap();
        for (i, op) in ops.into_iter().enumerate() {
            let result = match op {
                Op::Get(n) => dock.get(pid(i as u32), n),
                Op::Put(n) => dock.put(pid(i as u32), n),
            };
            match result {
                Ok(_) => {}
                Err(KernelError::InvalidAmount { amount, .. }) => prop_assert!(amount > capacity),
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
            prop_assert!(dock.level() <= dock.capacity());
        }
    }

    #[test]
    fn waiters_are_released_in_arrival_order(
        amounts in prop::collection::vec(1u32..4, 1..20),
        refills in prop::collection::vec(1u32..8, 1..20),
    ) {
        let mut dock = ResourceContainer::new("dock", 8, 0).unwrap();
        for (i, amount) in amounts.iter().enumerate() {
            prop_assert_eq!(dock.get(pid(i as u32), *amount).unwrap(), RequestOutcome::Queued);
        }

        let mut released_order = Vec::new();
        for (j, refill) in refills.iter().enumerate() {
            let refill = (*refill).min(dock.free());
            if refill == 0 {
                continue;
            }
            match dock.put(pid(1000 + j as u32), refill).unwrap() {
                RequestOutcome::Granted { released } => {
                    released_order.extend(released.into_iter().map(|w| w.process));
                }
                RequestOutcome::Queued => prop_assert!(false, "put within free space must be granted"),
            }
        }

        let expected: Vec<_> = (0..released_order.len() as u32).map(pid).collect();
        prop_assert_eq!(&released_order, &expected);
        let still_waiting: Vec<_> = dock.waiters().map(|w| w.process).collect();
        let rest: Vec<_> = (expected.len() as u32..amounts.len() as u32).map(pid).collect();
        prop_assert_eq!(&still_waiting, &rest);
    }
}
