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

//! The standard abstract backbone every frame hangs off:
//! `ReceiveInput → PrePhysicsGameplay → ProcessPhysics →
//! PostPhysicsGameplay → Render → PostRender`.
//!
//! Game and engine tasks order themselves against these anchors instead
//! of against each other, which keeps unrelated systems decoupled.

use crate::contract::TaskContract;
use crate::declare_abstract_task;
use crate::error::ScheduleError;
use crate::scheduler::{Task, TaskScheduler};

declare_abstract_task!(
    /// Input devices have been polled.
    pub ReceiveInput
);

declare_abstract_task!(
    /// Gameplay that must run before the physics step.
    pub PrePhysicsGameplay
);

declare_abstract_task!(
    /// The physics simulation step.
    pub ProcessPhysics
);

declare_abstract_task!(
    /// Gameplay that consumes physics results.
    pub PostPhysicsGameplay
);

declare_abstract_task!(
    /// Scene submission to the renderer.
    pub Render
);

declare_abstract_task!(
    /// End-of-frame work: swap, readback, telemetry.
    pub PostRender
);

impl<W> Task<W> for ReceiveInput {
    fn define_contract(contract: &mut TaskContract) {
        contract.execute_before::<PrePhysicsGameplay>();
    }
}

impl<W> Task<W> for PrePhysicsGameplay {
    fn define_contract(contract: &mut TaskContract) {
        contract.execute_before::<ProcessPhysics>();
    }
}

impl<W> Task<W> for ProcessPhysics {
    fn define_contract(_contract: &mut TaskContract) {}
}

impl<W> Task<W> for PostPhysicsGameplay {
    fn define_contract(contract: &mut TaskContract) {
        contract.execute_after::<ProcessPhysics>();
    }
}

impl<W> Task<W> for Render {
    fn define_contract(contract: &mut TaskContract) {
        contract.execute_after::<PostPhysicsGameplay>();
    }
}

impl<W> Task<W> for PostRender {
    fn define_contract(contract: &mut TaskContract) {
        contract.execute_after::<Render>();
    }
}

/// Registers the whole standard backbone into a scheduler.
pub fn register_standard_tasks<W>(scheduler: &mut TaskScheduler<W>) -> Result<(), ScheduleError> {
    scheduler.register::<ReceiveInput>()?;
    scheduler.register::<PrePhysicsGameplay>()?;
    scheduler.register::<ProcessPhysics>()?;
    scheduler.register::<PostPhysicsGameplay>()?;
    scheduler.register::<Render>()?;
    scheduler.register::<PostRender>()?;
    Ok(())
}
