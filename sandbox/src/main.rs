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

//! Sandbox demo: a scene schema registered with the reflection engine,
//! written to disk, read back, and then a frame driven through the task
//! scheduler.
//!
//! Run with `RUST_LOG=debug cargo run -p sandbox` to watch the archive
//! and scheduler narrate what they do.

use anyhow::{Context, Result};
use kiln_reflect::math::Vector3;
use kiln_reflect::{
    from_file, impl_element, to_file, ElementPtr, ElementVec, EnginePath, Guid, Registry, Version,
};
use kiln_tasks::standard::{self, PostPhysicsGameplay, PrePhysicsGameplay};
use kiln_tasks::{define_task, Task, TaskContract, TaskScheduler, TickTypes};

/// A placed entity in the demo scene.
#[derive(Default)]
struct SceneEntity {
    name: String,
    asset: EnginePath,
    id: Guid,
    position: Vector3,
}
impl_element!(SceneEntity, "SceneEntity");

/// The demo scene: a named list of entities.
#[derive(Default)]
struct Scene {
    name: String,
    entities: ElementVec,
}
impl_element!(Scene, "Scene");

fn register_scene_schema(registry: &mut Registry) -> Result<()> {
    registry
        .register_class::<SceneEntity>("SceneEntity", Some("Element"), |compositor| {
            compositor.field("Name", |e| &mut e.name);
            compositor.field("Asset", |e| &mut e.asset);
            compositor.field("Id", |e| &mut e.id).hide();
            compositor.field("Position", |e| &mut e.position);
        })
        .context("registering SceneEntity")?;
    registry
        .register_class::<Scene>("Scene", Some("Element"), |compositor| {
            compositor.field("Name", |s| &mut s.name);
            compositor.field("Entities", |s| &mut s.entities);
        })
        .context("registering Scene")?;
    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene {
        name: "courtyard".to_string(),
        entities: ElementVec::default(),
    };
    for (name, asset, x) in [
        ("fountain", "props/fountain.mesh", 0.0),
        ("bench_a", "props/bench.mesh", -4.0),
        ("bench_b", "props/bench.mesh", 4.0),
    ] {
        scene.entities.0.push(Box::new(SceneEntity {
            name: name.to_string(),
            asset: EnginePath::new(asset),
            id: Guid::generate(),
            position: Vector3::new(x, 0.0, 0.0),
        }) as ElementPtr);
    }
    scene
}

/// The world the demo tasks tick.
#[derive(Default)]
struct GameWorld {
    frame: u64,
    simulated_entities: usize,
}

define_task!(AdvanceFrame);

fn advance_frame(worlds: &mut [GameWorld]) {
    for world in worlds {
        world.frame += 1;
        log::info!("frame {}", world.frame);
    }
}

impl Task<GameWorld> for AdvanceFrame {
    fn define_contract(contract: &mut TaskContract) {
        contract.contributes::<PrePhysicsGameplay>();
    }
    fn function() -> Option<fn(&mut [GameWorld])> {
        Some(advance_frame)
    }
}

define_task!(SettlePhysicsResults);

fn settle_physics_results(worlds: &mut [GameWorld]) {
    for world in worlds {
        log::info!(
            "settled {} entities after physics",
            world.simulated_entities
        );
    }
}

impl Task<GameWorld> for SettlePhysicsResults {
    fn define_contract(contract: &mut TaskContract) {
        contract.contributes::<PostPhysicsGameplay>();
    }
    fn function() -> Option<fn(&mut [GameWorld])> {
        Some(settle_physics_results)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Reflection: register the scene schema and round-trip it to disk.
    let mut registry = Registry::new();
    register_scene_schema(&mut registry)?;

    let path = std::env::temp_dir().join("kiln-sandbox-scene.kiln");
    let mut spool: Vec<ElementPtr> = vec![
        Box::new(Version::new("kiln-sandbox", 1)),
        Box::new(build_scene()),
    ];
    to_file(&registry, &mut spool, &path).context("writing the scene archive")?;
    log::info!("wrote scene archive to {}", path.display());

    let read = from_file(&registry, &path).context("reading the scene archive back")?;
    let scene = read
        .iter()
        .find_map(|element| element.as_any().downcast_ref::<Scene>())
        .context("the archive should contain a Scene")?;
    log::info!(
        "read back scene '{}' with {} entities",
        scene.name,
        scene.entities.0.len()
    );

    // Scheduling: hang two tasks off the standard backbone and tick.
    let mut scheduler = TaskScheduler::<GameWorld>::new();
    standard::register_standard_tasks(&mut scheduler)
        .context("registering the standard backbone")?;
    scheduler.register::<SettlePhysicsResults>()?;
    scheduler.register::<AdvanceFrame>()?;
    scheduler.calculate_schedule(TickTypes::GAME)?;
    log::info!("schedule: {:?}", scheduler.schedule_names());

    let mut worlds = [GameWorld {
        frame: 0,
        simulated_entities: scene.entities.0.len(),
    }];
    for _ in 0..3 {
        scheduler.execute_schedule(&mut worlds);
    }
    log::info!("ticked to frame {}", worlds[0].frame);

    std::fs::remove_file(&path).ok();
    Ok(())
}
