// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use glam::f64::{DMat3, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("bond endpoint {index} is out of range for a molecule with {atom_count} atoms")]
    AtomIndexOutOfRange { index: usize, atom_count: usize },
}

/// A single atom: element code plus its position in the molecule-local frame.
///
/// The z coordinate doubles as the atom's draw depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Short case-sensitive element code, 1-3 characters (`"H"`, `"Na"`).
    pub element: String,
    pub pos: DVec3,
}

impl Atom {
    pub fn new(element: impl Into<String>, pos: DVec3) -> Self {
        Self {
            element: element.into(),
            pos,
        }
    }

    pub fn depth(&self) -> f64 {
        self.pos.z
    }
}

/// A bond between two atoms of the same molecule, referenced by their
/// zero-based append indices.
///
/// Besides the stored triple (`a1`, `a2`, `epairs`), a bond carries geometry
/// derived from its endpoints at append time: its own depth scalar `z` (the
/// mean of the endpoint depths), the projected xy endpoints, and the unit
/// direction `(dx, dy)` of the bond in the xy plane. The renderer offsets
/// perpendicular to `(dx, dy)` to draw the bond as a ribbon with width.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub a1: usize,
    pub a2: usize,
    /// Electron-pair count. Persisted round-trip but not yet consulted by
    /// rendering; a double bond draws the same ribbon as a single one.
    pub epairs: u8,
    pub z: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub len: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Bond {
    pub fn depth(&self) -> f64 {
        self.z
    }

    /// Recompute the derived geometry from the current endpoint positions.
    ///
    /// Both indices must be in range; `Molecule` guarantees this for every
    /// bond it stores.
    fn compute_coords(&mut self, atoms: &[Atom]) {
        let p1 = atoms[self.a1].pos;
        let p2 = atoms[self.a2].pos;

        self.z = (p1.z + p2.z) / 2.0;
        self.x1 = p1.x;
        self.y1 = p1.y;
        self.x2 = p2.x;
        self.y2 = p2.y;
        self.len = (self.x2 - self.x1).hypot(self.y2 - self.y1);
        if self.len > 0.0 {
            self.dx = (self.x2 - self.x1) / self.len;
            self.dy = (self.y2 - self.y1) / self.len;
        } else {
            // Endpoints coincide in projection; the ribbon degenerates and
            // any direction would do.
            self.dx = 0.0;
            self.dy = 0.0;
        }
    }
}

/// An ordered collection of atoms and bonds.
///
/// Append order is identity: `add_atom` hands out sequential indices and the
/// backing storage is never reordered, so bond indices stay valid for the
/// lifetime of the graph. [`Molecule::sort_by_depth`] sorts separate
/// permutation vectors instead (the pointer-array trick), which is what the
/// `*_by_depth` iterators walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    atom_order: Vec<usize>,
    bond_order: Vec<usize>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an atom and return its index.
    pub fn add_atom(&mut self, element: impl Into<String>, pos: DVec3) -> usize {
        let index = self.atoms.len();
        self.atoms.push(Atom::new(element, pos));
        self.atom_order.push(index);
        index
    }

    /// Append a bond between the atoms at `a1` and `a2` and return its index.
    ///
    /// Both indices are checked against the current atom count; a dangling
    /// reference is rejected instead of silently stored.
    pub fn add_bond(&mut self, a1: usize, a2: usize, epairs: u8) -> Result<usize, MoleculeError> {
        let atom_count = self.atoms.len();
        for index in [a1, a2] {
            if index >= atom_count {
                return Err(MoleculeError::AtomIndexOutOfRange { index, atom_count });
            }
        }

        let mut bond = Bond {
            a1,
            a2,
            epairs,
            ..Bond::default()
        };
        bond.compute_coords(&self.atoms);

        let index = self.bonds.len();
        self.bonds.push(bond);
        self.bond_order.push(index);
        Ok(index)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Atoms in append order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Bonds in append order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn bond(&self, index: usize) -> Option<&Bond> {
        self.bonds.get(index)
    }

    /// Stable-sort the atom and bond draw orders by ascending depth.
    ///
    /// The two sequences are sorted independently; the renderer merges them.
    /// Atom and bond indices are unaffected.
    pub fn sort_by_depth(&mut self) {
        let atoms = &self.atoms;
        self.atom_order
            .sort_by(|&a, &b| atoms[a].pos.z.total_cmp(&atoms[b].pos.z));
        let bonds = &self.bonds;
        self.bond_order.sort_by(|&a, &b| bonds[a].z.total_cmp(&bonds[b].z));
    }

    /// Atoms in draw order: append order until [`Molecule::sort_by_depth`]
    /// runs, ascending depth afterwards.
    pub fn atoms_by_depth(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.atom_order.iter().map(|&i| &self.atoms[i])
    }

    /// Bonds in draw order; see [`Molecule::atoms_by_depth`].
    pub fn bonds_by_depth(&self) -> impl Iterator<Item = &Bond> + '_ {
        self.bond_order.iter().map(|&i| &self.bonds[i])
    }

    /// Apply an affine transform to every atom position and recompute the
    /// derived geometry of every bond.
    pub fn apply_transform(&mut self, matrix: &DMat3) {
        for atom in &mut self.atoms {
            atom.pos = *matrix * atom.pos;
        }
        for bond in &mut self.bonds {
            bond.compute_coords(&self.atoms);
        }
    }
}

/// Rotation about the x axis, in degrees.
pub fn rotation_x(degrees: f64) -> DMat3 {
    DMat3::from_rotation_x(degrees.to_radians())
}

/// Rotation about the y axis, in degrees.
pub fn rotation_y(degrees: f64) -> DMat3 {
    DMat3::from_rotation_y(degrees.to_radians())
}

/// Rotation about the z axis, in degrees.
pub fn rotation_z(degrees: f64) -> DMat3 {
    DMat3::from_rotation_z(degrees.to_radians())
}
