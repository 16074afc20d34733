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

//! Math aggregates understood by the archive.
//!
//! These are the fixed-layout value types the serializer speaks natively:
//! vectors, matrices, and colors. They carry just enough arithmetic to be
//! useful to tool code; they are not a geometry library.

pub mod color;
pub mod matrix;
pub mod vector;

pub use color::{Color3, Color4, HdrColor3, HdrColor4};
pub use matrix::{Matrix3, Matrix4};
pub use vector::{Vector2, Vector3, Vector4};
