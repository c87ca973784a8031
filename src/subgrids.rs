// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/subgrids.rs - Named layer partitions of a grid.
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

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// One named group of layers. Layers are 1-based and strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgrid {
    pub name: String,
    pub layers: Vec<usize>,
}

impl Subgrid {
    pub fn first_layer(&self) -> usize {
        self.layers[0]
    }

    pub fn last_layer(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }
}

/// An ordered mapping from subgrid name to its layers.
///
/// Names are unique, every subgrid has at least one layer, and no layer is
/// claimed twice. The union need not cover every layer of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Subgrid>", into = "Vec<Subgrid>")]
pub struct Subgrids {
    entries: Vec<Subgrid>,
}

impl Subgrids {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, Vec<usize>)>) -> Result<Self> {
        let entries = entries
            .into_iter()
            .map(|(name, layers)| Subgrid {
                name: name.into(),
                layers,
            })
            .collect::<Vec<_>>();
        Self::try_from(entries)
    }

    /// Contiguous subgrids stacked from layer 1 downwards, `counts[n]` layers
    /// each.
    pub fn from_counts<S: AsRef<str>>(counts: &[(S, usize)]) -> Result<Self> {
        let mut next = 1;
        let mut entries = Vec::with_capacity(counts.len());
        for (name, count) in counts {
            entries.push((name.as_ref().to_string(), (next..next + count).collect()));
            next += count;
        }
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Subgrid> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.name.as_str()).collect()
    }

    /// Subgrid by 0-based position.
    pub fn get_index(&self, index: usize) -> Option<&Subgrid> {
        self.entries.get(index)
    }

    pub fn get(&self, name: &str) -> Option<&Subgrid> {
        self.entries.iter().find(|s| s.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|s| s.name == name)
    }

    /// The deepest layer referenced by any subgrid.
    pub fn max_layer(&self) -> usize {
        self.entries.iter().map(Subgrid::last_layer).max().unwrap_or(0)
    }

    /// Renames the subgrids in order, keeping their layers.
    pub fn rename<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if names.len() != self.entries.len() {
            return Err(GridError::invalid(format!(
                "got {} names for {} subgrids",
                names.len(),
                self.entries.len()
            )));
        }
        let mut renamed = self.entries.clone();
        for (entry, name) in renamed.iter_mut().zip(names) {
            entry.name = name.as_ref().to_string();
        }
        *self = Self::try_from(renamed)?;
        Ok(())
    }

    /// Layer counts when the subgrids stack contiguously from layer 1 to
    /// `nlay`, the only shape count-based formats can express.
    pub fn counts(&self, nlay: usize) -> Option<Vec<usize>> {
        let mut next = 1;
        for entry in &self.entries {
            if entry.first_layer() != next || entry.last_layer() - entry.first_layer() + 1 != entry.layers.len() {
                return None;
            }
            next = entry.last_layer() + 1;
        }
        (next == nlay + 1).then(|| self.entries.iter().map(|s| s.layers.len()).collect())
    }
}

impl TryFrom<Vec<Subgrid>> for Subgrids {
    type Error = GridError;

    fn try_from(entries: Vec<Subgrid>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut claimed = HashSet::new();
        for entry in &entries {
            if !names.insert(entry.name.as_str()) {
                return Err(GridError::invalid(format!(
                    "duplicate subgrid name {:?}",
                    entry.name
                )));
            }
            if entry.layers.is_empty() {
                return Err(GridError::invalid(format!(
                    "subgrid {:?} has no layers",
                    entry.name
                )));
            }
            if entry.layers[0] == 0 || entry.layers.windows(2).any(|w| w[0] >= w[1]) {
                return Err(GridError::invalid(format!(
                    "layers of subgrid {:?} must be 1-based and strictly increasing",
                    entry.name
                )));
            }
            for &layer in &entry.layers {
                if !claimed.insert(layer) {
                    return Err(GridError::invalid(format!(
                        "layer {layer} belongs to more than one subgrid"
                    )));
                }
            }
        }
        Ok(Self { entries })
    }
}

impl From<Subgrids> for Vec<Subgrid> {
    fn from(subgrids: Subgrids) -> Self {
        subgrids.entries
    }
}

impl<'a> IntoIterator for &'a Subgrids {
    type Item = &'a Subgrid;
    type IntoIter = std::slice::Iter<'a, Subgrid>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Subgrids {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, entry) in self.entries.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}: {}..={}",
                entry.name,
                entry.first_layer(),
                entry.last_layer()
            )?;
        }
        Ok(())
    }
}
