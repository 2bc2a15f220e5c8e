// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end pipeline tests: parse -> persist -> reload -> render.

use molsvg::{parse_molfile, render_svg, ElementRow, MoleculeStore, StoreError};

const WATER: &str = "\
Water
generator
comment
  3  2  0  0  0  0  0  0  0  0999 V2000
0.0000 0.0000 0.0000 O
0.7572 0.5868 0.0000 H
-0.7572 0.5868 0.0000 H
1 2 1
1 3 1
";

fn element(code: &str, name: &str, color: &str, radius: u32) -> ElementRow {
    ElementRow {
        code: code.to_string(),
        name: name.to_string(),
        color1: color.to_string(),
        color2: "101010".to_string(),
        color3: "202020".to_string(),
        radius,
    }
}

#[test]
fn parse_persist_reload_render() {
    let mol = parse_molfile(WATER.as_bytes()).unwrap();
    assert_eq!(mol.atom_count(), 3);
    assert_eq!(mol.bond_count(), 2);

    let dir = tempfile::tempdir().unwrap();
    let mut store = MoleculeStore::open(dir.path().join("molecules.sqlite3")).unwrap();
    store.add_element(&element("H", "Hydrogen", "FFFFFF", 25)).unwrap();
    store.add_element(&element("O", "Oxygen", "FF0000", 40)).unwrap();
    store.insert_molecule("Water", &mol).unwrap();

    let mut reloaded = store.load_molecule("Water").unwrap();
    assert_eq!(reloaded.atoms(), mol.atoms());
    assert_eq!(reloaded.bonds(), mol.bonds());

    reloaded.sort_by_depth();
    let svg = render_svg(&reloaded, &store.element_styles().unwrap());

    assert!(svg.starts_with("<svg version=\"1.1\" width=\"1000\" height=\"1000\""));
    assert!(svg.ends_with("</svg>"));
    assert_eq!(svg.matches("<circle").count(), 3);
    assert_eq!(svg.matches("<polygon").count(), 2);
    assert_eq!(svg.matches("<radialGradient").count(), 2);

    // Everything in water sits at z = 0, so the tie-breaking rule paints
    // both bond ribbons before any atom.
    assert!(svg.rfind("<polygon").unwrap() < svg.find("<circle").unwrap());

    // The oxygen circle uses its registered style; hydrogens theirs.
    assert!(svg.contains(r##"r="40" fill="#FF0000""##));
    assert!(svg.contains(r##"r="25" fill="#FFFFFF""##));
}

#[test]
fn duplicate_name_across_the_pipeline() {
    let mol = parse_molfile(WATER.as_bytes()).unwrap();
    let mut store = MoleculeStore::open_in_memory().unwrap();

    store.insert_molecule("Water", &mol).unwrap();
    let err = store.insert_molecule("Water", &mol).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateName(_)));

    assert_eq!(store.molecule_names().unwrap(), vec!["Water"]);
    assert_eq!(store.atom_count("Water").unwrap(), 3);
    assert_eq!(store.bond_count("Water").unwrap(), 2);
}

#[test]
fn malformed_upload_writes_nothing() {
    // Parsing fails before any store interaction, which is what keeps a bad
    // upload from leaving partial rows behind.
    assert!(parse_molfile("Water\ngenerator\ncomment\n".as_bytes()).is_err());

    let store = MoleculeStore::open_in_memory().unwrap();
    assert!(store.molecule_names().unwrap().is_empty());
}

#[test]
fn unknown_codes_render_with_fallback_style() {
    let mol = parse_molfile(WATER.as_bytes()).unwrap();
    let mut store = MoleculeStore::open_in_memory().unwrap();
    store.insert_molecule("Water", &mol).unwrap();

    // No Elements rows at all: every atom falls back to r=25 / #000000.
    let mut reloaded = store.load_molecule("Water").unwrap();
    reloaded.sort_by_depth();
    let svg = render_svg(&reloaded, &store.element_styles().unwrap());

    assert_eq!(svg.matches(r##"r="25" fill="#000000""##).count(), 3);
    assert_eq!(svg.matches("<radialGradient").count(), 0);
}
