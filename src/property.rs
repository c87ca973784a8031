// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/property.rs - Per-cell value arrays produced by grid queries.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use crate::error::{GridError, Result};
use crate::layout::Dimensions;

/// A named per-cell array in C order (`I` slowest, `K` fastest), with a mask
/// marking missing values.
///
/// Properties own their values and hold no reference to the grid that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct GridProperty<T> {
    pub name: String,
    pub dimensions: Dimensions,
    pub values: Vec<T>,
    /// `true` where the value is missing.
    pub mask: Vec<bool>,
}

/// Floating point cell values (sizes, volumes, angles, coordinates).
pub type ContinuousProperty = GridProperty<f64>;

/// Integer cell values (flags, indices, zone codes).
pub type DiscreteProperty = GridProperty<i32>;

impl<T: Copy> GridProperty<T> {
    pub fn new(
        name: impl Into<String>,
        dimensions: Dimensions,
        values: Vec<T>,
        mask: Vec<bool>,
    ) -> Result<Self> {
        let n = dimensions.ntotal();
        if values.len() != n || mask.len() != n {
            return Err(GridError::invalid(format!(
                "property needs {n} values and mask entries, got {} and {}",
                values.len(),
                mask.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            dimensions,
            values,
            mask,
        })
    }

    /// A property with no missing values.
    pub fn unmasked(name: impl Into<String>, dimensions: Dimensions, values: Vec<T>) -> Result<Self> {
        let mask = vec![false; values.len()];
        Self::new(name, dimensions, values, mask)
    }

    /// Value at 0-based cell `(i, j, k)`, or `None` if masked or outside.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<T> {
        if !self.dimensions.contains(i, j, k) {
            return None;
        }
        let n = self.dimensions.cell_index(i, j, k);
        (!self.mask[n]).then(|| self.values[n])
    }

    pub fn is_masked(&self, i: usize, j: usize, k: usize) -> bool {
        self.dimensions.contains(i, j, k) && self.mask[self.dimensions.cell_index(i, j, k)]
    }

    /// Logical `(ncol, nrow, nlay)` shape.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.dimensions.as_tuple()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unmasked values in cell order.
    pub fn unmasked_values(&self) -> impl Iterator<Item = T> + '_ {
        self.values
            .iter()
            .zip(&self.mask)
            .filter(|(_, masked)| !**masked)
            .map(|(v, _)| *v)
    }

    /// Every value as an option, `None` where masked.
    pub fn values1d(&self) -> Vec<Option<T>> {
        self.values
            .iter()
            .zip(&self.mask)
            .map(|(v, m)| (!m).then_some(*v))
            .collect()
    }
}

impl GridProperty<f64> {
    pub fn sum(&self) -> f64 {
        self.unmasked_values().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        let (n, s) = self
            .unmasked_values()
            .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
        (n > 0).then(|| s / n as f64)
    }

    /// Population standard deviation of the unmasked values.
    pub fn std(&self) -> Option<f64> {
        let mean = self.mean()?;
        let (n, ss) = self
            .unmasked_values()
            .fold((0usize, 0.0), |(n, ss), v| (n + 1, ss + (v - mean).powi(2)));
        Some((ss / n as f64).sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        self.unmasked_values().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.unmasked_values().reduce(f64::max)
    }
}

/// An ordered collection of properties, looked up by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    props: Vec<ContinuousProperty>,
}

impl PropertySet {
    pub fn new(props: Vec<ContinuousProperty>) -> Self {
        Self { props }
    }

    pub fn get_prop_by_name(&self, name: &str) -> Option<&ContinuousProperty> {
        self.props.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.props.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContinuousProperty> {
        self.props.iter()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl IntoIterator for PropertySet {
    type Item = ContinuousProperty;
    type IntoIter = std::vec::IntoIter<ContinuousProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.props.into_iter()
    }
}
