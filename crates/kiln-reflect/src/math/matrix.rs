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

//! Defines the `Matrix3` and `Matrix4` types.
//!
//! Both are row-major; element `(r, c)` serializes at index `r * N + c`.

use std::ops::{Index, IndexMut};

/// A 3x3 row-major matrix with `f32` elements.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Matrix3 {
    /// The elements of the matrix in row-major order.
    pub elements: [f32; 9],
}

/// A 4x4 row-major matrix with `f32` elements.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Matrix4 {
    /// The elements of the matrix in row-major order.
    pub elements: [f32; 16],
}

macro_rules! impl_matrix_common {
    ($name:ident, $dim:expr, $count:expr) => {
        impl $name {
            /// A matrix with all elements set to 0.
            pub const ZERO: Self = Self {
                elements: [0.0; $count],
            };

            /// Creates a matrix from its elements in row-major order.
            #[inline]
            pub const fn from_elements(elements: [f32; $count]) -> Self {
                Self { elements }
            }

            /// Creates a uniform scaling matrix.
            #[inline]
            pub fn from_scale(scale: f32) -> Self {
                let mut m = Self::ZERO;
                for i in 0..$dim {
                    m[(i, i)] = scale;
                }
                m
            }

            /// The identity matrix.
            #[inline]
            pub fn identity() -> Self {
                Self::from_scale(1.0)
            }
        }

        impl Default for $name {
            /// The default matrix is the identity.
            fn default() -> Self {
                Self::identity()
            }
        }

        impl Index<(usize, usize)> for $name {
            type Output = f32;
            #[inline]
            fn index(&self, (row, col): (usize, usize)) -> &f32 {
                &self.elements[row * $dim + col]
            }
        }

        impl IndexMut<(usize, usize)> for $name {
            #[inline]
            fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
                &mut self.elements[row * $dim + col]
            }
        }
    };
}

impl_matrix_common!(Matrix3, 3, 9);
impl_matrix_common!(Matrix4, 4, 16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_has_unit_diagonal() {
        let m = Matrix3::identity();
        for r in 0..3 {
            for c in 0..3 {
                assert_eq!(m[(r, c)], if r == c { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Matrix3::default(), Matrix3::identity());
        assert_eq!(Matrix4::default(), Matrix4::identity());
    }

    #[test]
    fn indexing_is_row_major() {
        let mut m = Matrix4::ZERO;
        m[(1, 2)] = 5.0;
        assert_eq!(m.elements[1 * 4 + 2], 5.0);
    }
}
