// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # molsvg
//!
//! Conversion pipeline between three representations of a small molecular
//! structure: a line-oriented ingestion format, a normalized SQLite schema,
//! and a depth-sorted SVG rendering.
//!
//! ```text
//! text --parse_molfile--> Molecule --MoleculeStore--> rows --load_molecule--> Molecule
//!                                                                 |
//!                                          sort_by_depth + render_svg --> SVG document
//! ```
//!
//! This crate is the embedding surface: it re-exports the member crates'
//! types so a transport layer (HTTP handlers, CLI, ...) only needs one
//! dependency. The core is synchronous and single-threaded; wrap the store
//! in your own serialization if requests arrive concurrently.
//!
//! ```no_run
//! use molsvg::{parse_molfile, render_svg, MoleculeStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sdf = std::fs::File::open("water.sdf")?;
//! let mol = parse_molfile(std::io::BufReader::new(sdf))?;
//!
//! let mut store = MoleculeStore::open("molecules.sqlite3")?;
//! store.insert_molecule("Water", &mol)?;
//!
//! let mut mol = store.load_molecule("Water")?;
//! mol.sort_by_depth();
//! let svg = render_svg(&mol, &store.element_styles()?);
//! # Ok(())
//! # }
//! ```

pub use elements::{ElementStyle, ElementStyles, Fill, DEFAULT_STYLES};
pub use molecule::{
    parse_molfile, rotation_x, rotation_y, rotation_z, Atom, Bond, Molecule, MoleculeError,
    ParseError,
};
pub use render::render_svg;
pub use store::{ElementRow, MoleculeStore, StoreError};
