// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Schedule calculation: contracts in, a linear execution order out.
//!
//! Calculation runs in four passes. Contracts are rebuilt and tick-filtered
//! first; a contribution index maps every tag to its contributing tasks;
//! ordering requirements then materialize as edges between contributors;
//! finally a depth-first emission produces a topological order, detecting
//! cycles on the way, and strips the entries with no function (abstract
//! tasks and tick-filtered tasks) from the cached schedule. Filtered tasks
//! stay in the graph during the sort, so their ordering constraints still
//! propagate to the tasks that survive.

use crate::contract::{Order, TaskContract, TaskInfo, TickTypes};
use crate::error::ScheduleError;
use std::collections::HashMap;

/// The signature every task function shares: it receives the caller's
/// world list and owns any parallelism internally.
pub type TaskFn<W> = fn(&mut [W]);

/// A schedulable unit of work over worlds of type `W`.
///
/// Declare the type with [`define_task!`](crate::define_task) or
/// [`declare_abstract_task!`](crate::declare_abstract_task), then
/// implement this trait for it.
pub trait Task<W>: TaskInfo {
    /// Emits the task's contract. Invoked fresh on every schedule
    /// calculation.
    fn define_contract(contract: &mut TaskContract);

    /// The work function; `None` marks an abstract ordering point.
    fn function() -> Option<TaskFn<W>> {
        None
    }
}

struct TaskEntry<W> {
    name: &'static str,
    tag: u32,
    define_contract: fn(&mut TaskContract),
    function: Option<TaskFn<W>>,
    contract: TaskContract,
    active: Option<TaskFn<W>>,
    required: Vec<usize>,
}

/// Collects registered tasks and turns their contracts into a cached,
/// linear, cycle-free execution order.
pub struct TaskScheduler<W> {
    entries: Vec<TaskEntry<W>>,
    schedule: Vec<usize>,
    calculated: bool,
}

impl<W> Default for TaskScheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> TaskScheduler<W> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            schedule: Vec::new(),
            calculated: false,
        }
    }

    /// Registers a task type. Registration order has no effect on the
    /// calculated order beyond tie-breaking between unrelated tasks.
    pub fn register<T: Task<W>>(&mut self) -> Result<(), ScheduleError> {
        let name = T::task_name();
        if self.entries.iter().any(|entry| entry.name == name) {
            return Err(ScheduleError::DuplicateTask(name.to_string()));
        }
        self.entries.push(TaskEntry {
            name,
            tag: crate::contract::tag_of::<T>(),
            define_contract: T::define_contract,
            function: T::function(),
            contract: TaskContract::default(),
            active: None,
            required: Vec::new(),
        });
        self.calculated = false;
        Ok(())
    }

    /// Resolves every contract into a linear execution order for the
    /// given tick phases, caching it until the next calculation.
    ///
    /// On failure the cached schedule is left empty.
    pub fn calculate_schedule(&mut self, tick_types: TickTypes) -> Result<(), ScheduleError> {
        self.schedule.clear();
        self.calculated = false;

        // Pass 1: rebuild contracts and filter by tick type. Filtered
        // tasks keep their place in the graph so ordering constraints
        // still flow through them.
        for entry in &mut self.entries {
            entry.contract = TaskContract::default();
            (entry.define_contract)(&mut entry.contract);
            entry.required.clear();
            if entry.contract.tick_types.intersects(tick_types) {
                entry.active = entry.function;
            } else {
                log::info!(
                    "Excluding task {} (task ticks: {:?}, schedule ticks: {:?})",
                    entry.name,
                    entry.contract.tick_types,
                    tick_types
                );
                entry.active = None;
            }
        }

        // Pass 2: index every tag by its contributing tasks. Each task
        // contributes its own tag, which is how ordering against a
        // concrete task resolves.
        let mut contributors: HashMap<u32, Vec<usize>> = HashMap::new();
        for (index, entry) in self.entries.iter().enumerate() {
            contributors.entry(entry.tag).or_default().push(index);
            for (tag, _) in &entry.contract.contributed {
                contributors.entry(*tag).or_default().push(index);
            }
        }

        // Pass 3: materialize edges. "A before B" makes every contributor
        // of B depend on every contributor of A.
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let selves = contributors
                .get(&entry.tag)
                .cloned()
                .unwrap_or_else(|| vec![index]);
            for requirement in &entry.contract.order_requirements {
                let Some(others) = contributors.get(&requirement.tag) else {
                    return Err(ScheduleError::UnknownDependency {
                        task: entry.name.to_string(),
                        dependency: requirement.tag_name.to_string(),
                    });
                };
                for &this in &selves {
                    for &other in others {
                        match requirement.order {
                            Order::Before => edges.push((other, this)),
                            Order::After => edges.push((this, other)),
                        }
                    }
                }
            }
        }
        for (dependent, required) in edges {
            self.entries[dependent].required.push(required);
        }

        // Pass 4: depth-first topological emission with cycle detection.
        let mut order = Vec::with_capacity(self.entries.len());
        let mut inserted = vec![false; self.entries.len()];
        let mut stack = Vec::new();
        for index in 0..self.entries.len() {
            if let Err(edges) = self.visit(index, &mut inserted, &mut order, &mut stack) {
                let error = ScheduleError::DependencyCycle { edges };
                log::error!("{error}");
                self.schedule.clear();
                return Err(error);
            }
        }

        // Abstract and tick-filtered tasks drop out of the final order.
        self.schedule = order
            .into_iter()
            .filter(|&index| self.entries[index].active.is_some())
            .collect();
        self.calculated = true;

        log::debug!("Calculated task schedule:");
        for &index in &self.schedule {
            log::debug!(" - {}", self.entries[index].name);
        }
        Ok(())
    }

    fn visit(
        &self,
        index: usize,
        inserted: &mut [bool],
        order: &mut Vec<usize>,
        stack: &mut Vec<usize>,
    ) -> Result<(), Vec<(String, String)>> {
        if let Some(position) = stack.iter().position(|&candidate| candidate == index) {
            // A repeated occurrence on the provisional stack is a cycle;
            // report every edge of it.
            stack.push(index);
            let edges = stack[position..]
                .windows(2)
                .map(|pair| {
                    (
                        self.entries[pair[0]].name.to_string(),
                        self.entries[pair[1]].name.to_string(),
                    )
                })
                .collect();
            stack.pop();
            return Err(edges);
        }
        if inserted[index] {
            return Ok(());
        }

        stack.push(index);
        for &required in &self.entries[index].required {
            if let Err(edges) = self.visit(required, inserted, order, stack) {
                stack.pop();
                return Err(edges);
            }
        }
        stack.pop();

        inserted[index] = true;
        order.push(index);
        Ok(())
    }

    /// Whether a schedule is currently cached.
    #[must_use]
    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    /// The names of the cached schedule, in execution order.
    #[must_use]
    pub fn schedule_names(&self) -> Vec<&'static str> {
        self.schedule
            .iter()
            .map(|&index| self.entries[index].name)
            .collect()
    }

    /// Runs the cached schedule in order, passing the caller's world
    /// list to each task function. Sequential by contract: a task that
    /// wants parallelism owns it internally.
    pub fn execute_schedule(&self, worlds: &mut [W]) {
        for &index in &self.schedule {
            if let Some(function) = self.entries[index].active {
                function(worlds);
            }
        }
    }
}

impl<W> std::fmt::Debug for TaskScheduler<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("tasks", &self.entries.len())
            .field("scheduled", &self.schedule.len())
            .field("calculated", &self.calculated)
            .finish()
    }
}
