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

//! Errors surfaced by schedule registration and calculation.

use std::fmt;

/// Why a schedule could not be registered or calculated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A task with this name is already registered.
    DuplicateTask(String),
    /// An ordering requirement names a tag with no contributors.
    UnknownDependency {
        /// The task that declared the requirement.
        task: String,
        /// The tag nobody contributes to.
        dependency: String,
    },
    /// The resolved edges contain a cycle; each entry reads
    /// "`.0` must execute after `.1`".
    DependencyCycle {
        /// The edges of the detected cycle, in stack order.
        edges: Vec<(String, String)>,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::DuplicateTask(name) => {
                write!(f, "Task '{name}' is already registered")
            }
            ScheduleError::UnknownDependency { task, dependency } => {
                write!(
                    f,
                    "Task '{task}' orders against '{dependency}', which nothing contributes to"
                )
            }
            ScheduleError::DependencyCycle { edges } => {
                write!(f, "Dependency cycle detected in task scheduler:")?;
                for (before, after) in edges {
                    write!(f, " {before} must execute after {after};")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_names_every_edge() {
        let err = ScheduleError::DependencyCycle {
            edges: vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "A".to_string()),
            ],
        };
        let text = format!("{err}");
        assert!(text.contains("A must execute after B"));
        assert!(text.contains("B must execute after A"));
    }
}
