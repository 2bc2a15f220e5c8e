// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! In-memory molecule graph and the structure-file parser that builds it.
//!
//! A [`Molecule`] is an ordered sequence of atoms and an ordered sequence of
//! bonds; bonds refer to atoms by their zero-based append index. The graph
//! owns its draw-order bookkeeping ([`Molecule::sort_by_depth`]) but knows
//! nothing about SVG or SQL; those live in the `render` and `store` crates.

pub use crate::molecule::{
    rotation_x, rotation_y, rotation_z, Atom, Bond, Molecule, MoleculeError,
};
pub use crate::molfile::{parse_molfile, ParseError};

mod molecule;
pub mod molfile;
