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

//! Task contracts: the ordering intent a task declares about itself.
//!
//! A contract never names other tasks directly; it names *dependency
//! tags*. Every task contributes its own tag (the reverse lookup that
//! lets ordering against a concrete task resolve through the same
//! mechanism) and may contribute additional abstract tags. Ordering
//! requirements then relate the declaring task to every contributor of a
//! tag. Tags are the CRC-32 of the task name, the same stable hashing
//! convention the reflection registry uses for types.

bitflags::bitflags! {
    /// The tick phases a task participates in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TickTypes: u32 {
        /// Normal game simulation ticks.
        const GAME = 1 << 0;
        /// Editor-viewport ticks.
        const EDITOR = 1 << 1;
        /// Offline tool ticks (batch processing, asset bakes).
        const TOOLS = 1 << 2;
    }
}

impl Default for TickTypes {
    /// Tasks run in game and editor ticks unless they say otherwise.
    fn default() -> Self {
        TickTypes::GAME | TickTypes::EDITOR
    }
}

/// Names a task type; implemented by the declaration macros.
pub trait TaskInfo: 'static {
    /// The task's unique name.
    fn task_name() -> &'static str;
}

/// The dependency tag of a task type.
#[must_use]
pub fn tag_of<T: TaskInfo>() -> u32 {
    crc32fast::hash(T::task_name().as_bytes())
}

/// Which side of a tag's contributors the declaring task lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// The declaring task runs before every contributor.
    Before,
    /// The declaring task runs after every contributor.
    After,
}

/// One ordering requirement against a dependency tag.
#[derive(Debug, Clone)]
pub struct OrderRequirement {
    pub(crate) tag: u32,
    pub(crate) tag_name: &'static str,
    pub(crate) order: Order,
}

/// A task's declared contract, rebuilt fresh on every schedule
/// calculation.
#[derive(Debug, Clone, Default)]
pub struct TaskContract {
    pub(crate) tick_types: TickTypes,
    pub(crate) contributed: Vec<(u32, &'static str)>,
    pub(crate) order_requirements: Vec<OrderRequirement>,
}

impl TaskContract {
    /// Declares which tick phases this task participates in.
    pub fn tick_types(&mut self, tick_types: TickTypes) {
        self.tick_types = tick_types;
    }

    /// Declares that this task satisfies the given dependency tag.
    pub fn contributes<T: TaskInfo>(&mut self) {
        self.contributed.push((tag_of::<T>(), T::task_name()));
    }

    /// Requires this task to execute before every contributor of the tag.
    pub fn execute_before<T: TaskInfo>(&mut self) {
        self.order_requirements.push(OrderRequirement {
            tag: tag_of::<T>(),
            tag_name: T::task_name(),
            order: Order::Before,
        });
    }

    /// Requires this task to execute after every contributor of the tag.
    pub fn execute_after<T: TaskInfo>(&mut self) {
        self.order_requirements.push(OrderRequirement {
            tag: tag_of::<T>(),
            tag_name: T::task_name(),
            order: Order::After,
        });
    }
}

/// Declares an abstract task: a named ordering point with no function.
///
/// The type still takes part in schedule calculation, where other tasks
/// order against it or contribute to it, but it is stripped from the
/// final schedule. Implement [`Task`](crate::Task) for it to give it a
/// contract.
#[macro_export]
macro_rules! declare_abstract_task {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::TaskInfo for $name {
            fn task_name() -> &'static str {
                stringify!($name)
            }
        }
    };
}

/// Declares a concrete task type.
///
/// Implement [`Task`](crate::Task) for it, returning the work function
/// from [`function`](crate::Task::function) and emitting the contract in
/// [`define_contract`](crate::Task::define_contract).
#[macro_export]
macro_rules! define_task {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::TaskInfo for $name {
            fn task_name() -> &'static str {
                stringify!($name)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    declare_abstract_task!(Anchor);
    define_task!(Worker);

    #[test]
    fn tags_are_stable_name_hashes() {
        assert_eq!(tag_of::<Anchor>(), crc32fast::hash(b"Anchor"));
        assert_ne!(tag_of::<Anchor>(), tag_of::<Worker>());
    }

    #[test]
    fn contract_records_declarations_in_order() {
        let mut contract = TaskContract::default();
        contract.tick_types(TickTypes::TOOLS);
        contract.contributes::<Anchor>();
        contract.execute_before::<Anchor>();
        contract.execute_after::<Worker>();

        assert_eq!(contract.tick_types, TickTypes::TOOLS);
        assert_eq!(contract.contributed, vec![(tag_of::<Anchor>(), "Anchor")]);
        assert_eq!(contract.order_requirements.len(), 2);
        assert_eq!(contract.order_requirements[0].order, Order::Before);
        assert_eq!(contract.order_requirements[1].tag_name, "Worker");
    }

    #[test]
    fn default_contract_ticks_in_game_and_editor() {
        let contract = TaskContract::default();
        assert!(contract.tick_types.contains(TickTypes::GAME));
        assert!(contract.tick_types.contains(TickTypes::EDITOR));
        assert!(!contract.tick_types.contains(TickTypes::TOOLS));
    }
}
