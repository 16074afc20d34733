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

//! Color value types: 8-bit channel colors and their HDR variants.
//!
//! The HDR variants pair the 8-bit channels with an `f32` intensity scale,
//! so a tool can brighten a color past white without widening the channels.

/// An opaque RGB color with 8-bit channels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct Color3 {
    /// The red channel.
    pub r: u8,
    /// The green channel.
    pub g: u8,
    /// The blue channel.
    pub b: u8,
}

/// An RGBA color with 8-bit channels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct Color4 {
    /// The red channel.
    pub r: u8,
    /// The green channel.
    pub g: u8,
    /// The blue channel.
    pub b: u8,
    /// The alpha (opacity) channel.
    pub a: u8,
}

/// An HDR RGB color: 8-bit channels plus an intensity scale.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct HdrColor3 {
    /// The low-dynamic-range channels.
    pub color: Color3,
    /// The intensity multiplier applied to the channels.
    pub intensity: f32,
}

/// An HDR RGBA color: 8-bit channels plus an intensity scale.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct HdrColor4 {
    /// The low-dynamic-range channels.
    pub color: Color4,
    /// The intensity multiplier applied to the color channels.
    pub intensity: f32,
}

impl Color3 {
    /// Creates a new color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Color4 {
    /// Creates a new color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color4 {
    /// The default color is transparent black with full alpha.
    fn default() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl HdrColor3 {
    /// Creates a new HDR color from channels and intensity.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, intensity: f32) -> Self {
        Self {
            color: Color3::new(r, g, b),
            intensity,
        }
    }
}

impl Default for HdrColor3 {
    fn default() -> Self {
        Self::new(0, 0, 0, 1.0)
    }
}

impl HdrColor4 {
    /// Creates a new HDR color from channels and intensity.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8, intensity: f32) -> Self {
        Self {
            color: Color4::new(r, g, b, a),
            intensity,
        }
    }
}

impl Default for HdrColor4 {
    fn default() -> Self {
        Self::new(0, 0, 0, 255, 1.0)
    }
}
