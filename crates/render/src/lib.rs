// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Depth-sorted SVG rendering of molecule graphs.
//!
//! The pipeline is a painter's algorithm over two pre-sorted sequences: the
//! caller runs [`Molecule::sort_by_depth`] first, then [`render_svg`] merges
//! atoms and bonds in ascending depth and emits one primitive per entry.
//! Rendering never fails; unknown element codes fall back to the registry's
//! default radius and color, and an unsorted molecule simply paints in
//! append order.

use std::fmt::Write;

use elements::ElementStyles;
use molecule::{Atom, Bond, Molecule};

const HEADER: &str =
    r#"<svg version="1.1" width="1000" height="1000" xmlns="http://www.w3.org/2000/svg">"#;
const FOOTER: &str = "</svg>";

/// Molecule-local coordinates are scaled by 100 and centered on the canvas.
const SCALE: f64 = 100.0;
const OFFSET_X: f64 = 500.0;
const OFFSET_Y: f64 = 500.0;

/// Half the on-canvas width of a bond ribbon.
const BOND_HALF_WIDTH: f64 = 10.0;
const BOND_FILL: &str = "green";

fn atom_svg(out: &mut String, atom: &Atom, styles: &ElementStyles) {
    let cx = atom.pos.x * SCALE + OFFSET_X;
    let cy = atom.pos.y * SCALE + OFFSET_Y;
    let fill = styles.fill_for(&atom.element);
    writeln!(
        out,
        "  <circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{}\" fill=\"#{}\"/>",
        fill.radius, fill.color
    )
    .unwrap();
}

fn bond_svg(out: &mut String, bond: &Bond) {
    let x1 = bond.x1 * SCALE + OFFSET_X;
    let y1 = bond.y1 * SCALE + OFFSET_Y;
    let x2 = bond.x2 * SCALE + OFFSET_X;
    let y2 = bond.y2 * SCALE + OFFSET_Y;

    // Each projected endpoint splits perpendicular to the bond axis,
    // turning the line segment into a quadrilateral ribbon.
    let (ox, oy) = (bond.dy * BOND_HALF_WIDTH, bond.dx * BOND_HALF_WIDTH);
    writeln!(
        out,
        "  <polygon points=\"{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" fill=\"{}\"/>",
        x1 - ox,
        y1 + oy,
        x1 + ox,
        y1 - oy,
        x2 + ox,
        y2 - oy,
        x2 - ox,
        y2 + oy,
        BOND_FILL
    )
    .unwrap();
}

/// Render a molecule as a complete SVG document.
///
/// Primitives are emitted by merging the atom and bond draw orders: while
/// both sequences have entries left, the strictly shallower atom goes first,
/// and a tie goes to the bond. The registry's radial gradient definitions
/// are spliced into the document header.
pub fn render_svg(mol: &Molecule, styles: &ElementStyles) -> String {
    let atoms: Vec<&Atom> = mol.atoms_by_depth().collect();
    let bonds: Vec<&Bond> = mol.bonds_by_depth().collect();

    let mut out = String::from(HEADER);
    out.push_str(&styles.radial_gradients());
    out.push('\n');

    let (mut a, mut b) = (0, 0);
    while a < atoms.len() && b < bonds.len() {
        if atoms[a].depth() < bonds[b].depth() {
            atom_svg(&mut out, atoms[a], styles);
            a += 1;
        } else {
            bond_svg(&mut out, bonds[b]);
            b += 1;
        }
    }
    for atom in &atoms[a..] {
        atom_svg(&mut out, atom, styles);
    }
    for bond in &bonds[b..] {
        bond_svg(&mut out, bond);
    }

    out.push_str(FOOTER);
    out
}
