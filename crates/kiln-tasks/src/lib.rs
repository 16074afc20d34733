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

//! # Kiln Tasks
//!
//! A declarative task scheduler: tasks describe *what they must run
//! relative to*, never *when*, and the scheduler resolves those contracts
//! into one linear, cycle-free execution order per tick-phase mask.
//!
//! ```
//! use kiln_tasks::standard::{self, PrePhysicsGameplay};
//! use kiln_tasks::{define_task, Task, TaskContract, TaskScheduler, TickTypes};
//!
//! struct World;
//!
//! define_task!(ApplyPlayerIntent);
//! fn apply_player_intent(_worlds: &mut [World]) {}
//!
//! impl Task<World> for ApplyPlayerIntent {
//!     fn define_contract(contract: &mut TaskContract) {
//!         contract.contributes::<PrePhysicsGameplay>();
//!     }
//!     fn function() -> Option<fn(&mut [World])> {
//!         Some(apply_player_intent)
//!     }
//! }
//!
//! let mut scheduler = TaskScheduler::<World>::new();
//! standard::register_standard_tasks(&mut scheduler).unwrap();
//! scheduler.register::<ApplyPlayerIntent>().unwrap();
//! scheduler.calculate_schedule(TickTypes::GAME).unwrap();
//! scheduler.execute_schedule(&mut [World]);
//! ```

#![warn(missing_docs)]

pub mod contract;
pub mod error;
pub mod scheduler;
pub mod standard;

pub use contract::{tag_of, Order, OrderRequirement, TaskContract, TaskInfo, TickTypes};
pub use error::ScheduleError;
pub use scheduler::{Task, TaskFn, TaskScheduler};
