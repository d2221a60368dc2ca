//! Cooperative round-robin scheduler. One hardware timer supplies a fixed
//! quantum (the GCD of all task periods); every quantum, each task whose
//! accumulated elapsed time has reached its period is stepped once, in the
//! order the tasks were registered. Tasks never block and are never
//! reentered, which is what makes the lock-free [`Shared`] record safe.

use heapless::Vec;

use crate::Shared;

/// One bounded step of a task's state machine. Must return well within a
/// scheduler quantum.
pub trait Task {
    fn step(&mut self, shared: &mut Shared);
}

struct Slot<'a> {
    period: u32,
    elapsed: u32,
    task: &'a mut dyn Task,
}

/// Returned by [`Scheduler::add`] when the task table is already at
/// capacity.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TableFull;

/// Fixed-order task table. `N` is the table capacity; registration order is
/// execution order.
pub struct Scheduler<'a, const N: usize> {
    quantum: u32,
    slots: Vec<Slot<'a>, N>,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    pub fn new(quantum: u32) -> Self {
        Scheduler {
            quantum,
            slots: Vec::new(),
        }
    }

    /// Registers a task with the given period. Each task starts with its
    /// elapsed time already at its period, so everything runs on the very
    /// first tick. Fails only if the table is full.
    pub fn add(&mut self, period: u32, task: &'a mut dyn Task) -> Result<(), TableFull> {
        self.slots
            .push(Slot {
                period,
                elapsed: period,
                task,
            })
            .map_err(|_| TableFull)
    }

    /// Advances the table by one quantum. Elapsed time is reset to zero only
    /// when a task actually executes.
    pub fn tick(&mut self, shared: &mut Shared) {
        for slot in self.slots.iter_mut() {
            if slot.elapsed >= slot.period {
                slot.task.step(shared);
                slot.elapsed = 0;
            }
            slot.elapsed += self.quantum;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    // The glob below re-imports heapless's two-parameter `Vec`; the tests
    // want the std one.
    use std::vec::Vec;

    use super::*;

    struct Tracer {
        id: u8,
        log: Rc<RefCell<Vec<u8>>>,
    }

    impl Task for Tracer {
        fn step(&mut self, _shared: &mut Shared) {
            self.log.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn tasks_run_at_their_own_periods() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fast = Tracer { id: 1, log: log.clone() };
        let mut slow = Tracer { id: 2, log: log.clone() };

        let mut shared = Shared::new();
        let mut sched = Scheduler::<2>::new(100);
        sched.add(100, &mut fast).unwrap();
        sched.add(200, &mut slow).unwrap();

        for _ in 0..4 {
            sched.tick(&mut shared);
        }
        // Both run on the first tick; the slow task then runs every other
        // quantum.
        assert_eq!(*log.borrow(), vec![1, 2, 1, 1, 2, 1]);
    }

    #[test]
    fn same_period_tasks_keep_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut first = Tracer { id: 1, log: log.clone() };
        let mut second = Tracer { id: 2, log: log.clone() };
        let mut third = Tracer { id: 3, log: log.clone() };

        let mut shared = Shared::new();
        let mut sched = Scheduler::<3>::new(50);
        sched.add(50, &mut first).unwrap();
        sched.add(50, &mut second).unwrap();
        sched.add(50, &mut third).unwrap();

        for _ in 0..3 {
            sched.tick(&mut shared);
        }
        assert_eq!(*log.borrow(), vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn table_capacity_is_enforced() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut only = Tracer { id: 1, log: log.clone() };
        let mut extra = Tracer { id: 2, log };

        let mut sched = Scheduler::<1>::new(100);
        assert_eq!(sched.add(100, &mut only), Ok(()));
        assert_eq!(sched.add(100, &mut extra), Err(TableFull));
    }
}
