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

//! Provides 2D, 3D, and 4D vector types with `f32` components.

use std::ops::{Add, Mul, Neg, Sub};

/// A 2-dimensional vector with `f32` components.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Vector2 {
    /// The x component of the vector.
    pub x: f32,
    /// The y component of the vector.
    pub y: f32,
}

/// A 3-dimensional vector with `f32` components.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Vector3 {
    /// The x component of the vector.
    pub x: f32,
    /// The y component of the vector.
    pub y: f32,
    /// The z component of the vector.
    pub z: f32,
}

/// A 4-dimensional vector with `f32` components.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Vector4 {
    /// The x component of the vector.
    pub x: f32,
    /// The y component of the vector.
    pub y: f32,
    /// The z component of the vector.
    pub z: f32,
    /// The w component of the vector.
    pub w: f32,
}

macro_rules! impl_vector_common {
    ($name:ident, $($component:ident),+) => {
        impl $name {
            /// A vector with all components set to `0.0`.
            pub const ZERO: Self = Self { $($component: 0.0),+ };
            /// A vector with all components set to `1.0`.
            pub const ONE: Self = Self { $($component: 1.0),+ };

            /// Creates a new vector with the specified components.
            #[inline]
            pub const fn new($($component: f32),+) -> Self {
                Self { $($component),+ }
            }

            /// Calculates the dot product of this vector and another.
            #[inline]
            pub fn dot(&self, rhs: Self) -> f32 {
                0.0 $(+ self.$component * rhs.$component)+
            }

            /// Calculates the squared length (magnitude) of the vector.
            #[inline]
            pub fn length_squared(&self) -> f32 {
                self.dot(*self)
            }

            /// Calculates the length (magnitude) of the vector.
            #[inline]
            pub fn length(&self) -> f32 {
                self.length_squared().sqrt()
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self::Output {
                Self { $($component: self.$component + rhs.$component),+ }
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self::Output {
                Self { $($component: self.$component - rhs.$component),+ }
            }
        }

        impl Mul<f32> for $name {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f32) -> Self::Output {
                Self { $($component: self.$component * rhs),+ }
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self::Output {
                Self { $($component: -self.$component),+ }
            }
        }
    };
}

impl_vector_common!(Vector2, x, y);
impl_vector_common!(Vector3, x, y, z);
impl_vector_common!(Vector4, x, y, z, w);

impl Vector3 {
    /// Calculates the cross product of this vector and another.
    #[inline]
    pub fn cross(&self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_arithmetic() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vector3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn dot_and_cross() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(a.cross(b), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn length_of_unit_axes() {
        assert_eq!(Vector2::new(3.0, 4.0).length(), 5.0);
        assert_eq!(Vector4::ONE.length_squared(), 4.0);
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Vector2::default(), Vector2::ZERO);
        assert_eq!(Vector3::default(), Vector3::ZERO);
        assert_eq!(Vector4::default(), Vector4::ZERO);
    }
}
