// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parser for the fixed line-oriented structure ingestion format.
//!
//! The layout is a simplified molfile:
//!
//! ```text
//! line 0: title              (ignored)
//! line 1: program/metadata   (ignored)
//! line 2: comment            (ignored)
//! line 3: "<atom_count> <bond_count> ..."
//! next <atom_count> lines: "<x> <y> <z> <element> ..."
//! next <bond_count> lines: "<a1> <a2> <epairs> ..."   (1-based atom numbers)
//! ```
//!
//! Tokens past the documented fields are ignored on every record, which is
//! what lets real generator output (counts lines padded with version tags,
//! atom lines with charge columns) pass through. No chemical validation is
//! performed; bond atom numbers are only checked to reference appended atoms.

use std::io::{self, BufRead};

use glam::f64::DVec3;
use thiserror::Error;

use crate::molecule::{Molecule, MoleculeError};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("structure header requires 4 lines, found {found}")]
    TruncatedHeader { found: usize },
    #[error("counts line {0:?} does not start with two non-negative integers")]
    InvalidCounts(String),
    #[error("expected {expected} {kind} records, found {found}")]
    TruncatedRecords {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid atom record on line {line}: {text:?}")]
    InvalidAtomRecord { line: usize, text: String },
    #[error("invalid bond record on line {line}: {text:?}")]
    InvalidBondRecord { line: usize, text: String },
    #[error(transparent)]
    Molecule(#[from] MoleculeError),
}

/// Parse one atom record: `x y z element`, extra tokens ignored.
fn parse_atom_record(line: &str) -> Option<(DVec3, &str)> {
    let mut tokens = line.split_whitespace();
    let x: f64 = tokens.next()?.parse().ok()?;
    let y: f64 = tokens.next()?.parse().ok()?;
    let z: f64 = tokens.next()?.parse().ok()?;
    let element = tokens.next()?;
    Some((DVec3::new(x, y, z), element))
}

/// Parse one bond record: `a1 a2 epairs` with 1-based atom numbers, extra
/// tokens ignored.
fn parse_bond_record(line: &str) -> Option<(usize, usize, u8)> {
    let mut tokens = line.split_whitespace();
    let a1: usize = tokens.next()?.parse().ok()?;
    let a2: usize = tokens.next()?.parse().ok()?;
    let epairs: u8 = tokens.next()?.parse().ok()?;
    // 0 is not a valid 1-based atom number.
    if a1 == 0 || a2 == 0 {
        return None;
    }
    Some((a1 - 1, a2 - 1, epairs))
}

/// Read a structure file into a [`Molecule`].
///
/// On any error the stream is abandoned and no partial graph is returned.
pub fn parse_molfile(reader: impl BufRead) -> Result<Molecule, ParseError> {
    let lines = reader.lines().collect::<Result<Vec<String>, _>>()?;
    if lines.len() < 4 {
        return Err(ParseError::TruncatedHeader { found: lines.len() });
    }

    // Lines 0-2 are title/program/comment; line 3 carries the counts.
    let counts_line = &lines[3];
    let mut counts = counts_line.split_whitespace();
    let parse_count = |token: Option<&str>| -> Option<usize> { token?.parse().ok() };
    let atom_count = parse_count(counts.next())
        .ok_or_else(|| ParseError::InvalidCounts(counts_line.clone()))?;
    let bond_count = parse_count(counts.next())
        .ok_or_else(|| ParseError::InvalidCounts(counts_line.clone()))?;

    let mut molecule = Molecule::new();

    let atom_records = lines.iter().enumerate().skip(4).take(atom_count);
    let mut found = 0;
    for (line_no, line) in atom_records {
        let (pos, element) = parse_atom_record(line).ok_or_else(|| ParseError::InvalidAtomRecord {
            line: line_no,
            text: line.clone(),
        })?;
        molecule.add_atom(element, pos);
        found += 1;
    }
    if found < atom_count {
        return Err(ParseError::TruncatedRecords {
            kind: "atom",
            expected: atom_count,
            found,
        });
    }

    let bond_records = lines.iter().enumerate().skip(4 + atom_count).take(bond_count);
    let mut found = 0;
    for (line_no, line) in bond_records {
        let (a1, a2, epairs) =
            parse_bond_record(line).ok_or_else(|| ParseError::InvalidBondRecord {
                line: line_no,
                text: line.clone(),
            })?;
        molecule.add_bond(a1, a2, epairs)?;
        found += 1;
    }
    if found < bond_count {
        return Err(ParseError::TruncatedRecords {
            kind: "bond",
            expected: bond_count,
            found,
        });
    }

    Ok(molecule)
}
