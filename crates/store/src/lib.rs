// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SQLite persistence for molecule graphs and element styling.
//!
//! The schema keeps atoms and bonds in globally auto-numbered tables and
//! associates them with their molecule through junction tables. Bond rows
//! store the *molecule-local* 0-based atom indices from ingestion time, not
//! `Atoms` row ids; reconstruction therefore re-appends atoms in their
//! original order so the local indices line up again. That order is carried
//! by an explicit `SEQ` column on the junction tables rather than being an
//! accident of row id ordering.

use std::path::Path;

use glam::f64::DVec3;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use elements::{ElementStyle, ElementStyles};
use molecule::{Molecule, MoleculeError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a molecule named {0:?} already exists")]
    DuplicateName(String),
    #[error("no molecule named {0:?}")]
    NotFound(String),
    #[error("element {code:?} is still referenced by {atoms} stored atom(s)")]
    ElementInUse { code: String, atoms: u64 },
    #[error(transparent)]
    Molecule(#[from] MoleculeError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// One row of the `Elements` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRow {
    /// Short case-sensitive element code, the primary key.
    pub code: String,
    pub name: String,
    pub color1: String,
    pub color2: String,
    pub color3: String,
    pub radius: u32,
}

const SCHEMA: &str = "\
-- The bundled SQLite is compiled with SQLITE_DEFAULT_FOREIGN_KEYS=1; pin the
-- stock default back, since element referential integrity is enforced in
-- application code (remove_element) and atoms may cite codes that have no
-- Elements row yet (they render with the fallback style).
PRAGMA foreign_keys = OFF;
CREATE TABLE IF NOT EXISTS Elements (
    ELEMENT_CODE  VARCHAR(3)  NOT NULL,
    ELEMENT_NAME  VARCHAR(32) NOT NULL,
    COLOUR1       CHAR(6)     NOT NULL,
    COLOUR2       CHAR(6)     NOT NULL,
    COLOUR3       CHAR(6)     NOT NULL,
    RADIUS        DECIMAL(3)  NOT NULL,
    PRIMARY KEY (ELEMENT_CODE)
);
CREATE TABLE IF NOT EXISTS Atoms (
    ATOM_ID       INTEGER     NOT NULL,
    ELEMENT_CODE  VARCHAR(3)  NOT NULL,
    X             DECIMAL(7,4) NOT NULL,
    Y             DECIMAL(7,4) NOT NULL,
    Z             DECIMAL(7,4) NOT NULL,
    PRIMARY KEY (ATOM_ID),
    FOREIGN KEY (ELEMENT_CODE) REFERENCES Elements
);
CREATE TABLE IF NOT EXISTS Bonds (
    BOND_ID  INTEGER NOT NULL,
    A1       INTEGER NOT NULL,
    A2       INTEGER NOT NULL,
    EPAIRS   INTEGER NOT NULL,
    PRIMARY KEY (BOND_ID)
);
CREATE TABLE IF NOT EXISTS Molecules (
    MOLECULE_ID  INTEGER NOT NULL,
    NAME         TEXT    NOT NULL UNIQUE,
    PRIMARY KEY (MOLECULE_ID)
);
CREATE TABLE IF NOT EXISTS MoleculeAtom (
    MOLECULE_ID  INTEGER NOT NULL,
    ATOM_ID      INTEGER NOT NULL,
    SEQ          INTEGER NOT NULL,
    PRIMARY KEY (MOLECULE_ID, ATOM_ID),
    FOREIGN KEY (MOLECULE_ID) REFERENCES Molecules,
    FOREIGN KEY (ATOM_ID) REFERENCES Atoms
);
CREATE TABLE IF NOT EXISTS MoleculeBond (
    MOLECULE_ID  INTEGER NOT NULL,
    BOND_ID      INTEGER NOT NULL,
    SEQ          INTEGER NOT NULL,
    PRIMARY KEY (MOLECULE_ID, BOND_ID),
    FOREIGN KEY (MOLECULE_ID) REFERENCES Molecules,
    FOREIGN KEY (BOND_ID) REFERENCES Bonds
);
";

/// A molecule database. Single writer assumed; embedding layers serialize
/// access per molecule name.
pub struct MoleculeStore {
    conn: Connection,
}

impl MoleculeStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// In-memory database, mainly for tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn molecule_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT MOLECULE_ID FROM Molecules WHERE NAME = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Persist a molecule under a globally unique name.
    ///
    /// The molecule row, every atom and bond row, and every junction row are
    /// written inside one transaction; any failure leaves the store exactly
    /// as it was.
    pub fn insert_molecule(&mut self, name: &str, mol: &Molecule) -> Result<i64, StoreError> {
        if self.molecule_id(name)?.is_some() {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let tx = self.conn.transaction()?;
        tx.execute("INSERT INTO Molecules (NAME) VALUES (?1)", params![name])?;
        let mol_id = tx.last_insert_rowid();

        for (seq, atom) in mol.atoms().iter().enumerate() {
            tx.execute(
                "INSERT INTO Atoms (ELEMENT_CODE, X, Y, Z) VALUES (?1, ?2, ?3, ?4)",
                params![atom.element, atom.pos.x, atom.pos.y, atom.pos.z],
            )?;
            let atom_id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO MoleculeAtom (MOLECULE_ID, ATOM_ID, SEQ) VALUES (?1, ?2, ?3)",
                params![mol_id, atom_id, seq],
            )?;
        }

        for (seq, bond) in mol.bonds().iter().enumerate() {
            // A1/A2 stay molecule-local indices, exactly as parsed.
            tx.execute(
                "INSERT INTO Bonds (A1, A2, EPAIRS) VALUES (?1, ?2, ?3)",
                params![bond.a1, bond.a2, bond.epairs],
            )?;
            let bond_id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO MoleculeBond (MOLECULE_ID, BOND_ID, SEQ) VALUES (?1, ?2, ?3)",
                params![mol_id, bond_id, seq],
            )?;
        }

        tx.commit()?;
        debug!(
            "persisted molecule {:?} ({} atoms, {} bonds)",
            name,
            mol.atom_count(),
            mol.bond_count()
        );
        Ok(mol_id)
    }

    /// Reconstruct a molecule by name.
    ///
    /// Atoms are re-appended in `SEQ` order, so the fresh local indices
    /// coincide with the ingestion-time indices the stored bonds refer to.
    /// A corrupt bond row with an out-of-range index is reported instead of
    /// producing a broken graph.
    pub fn load_molecule(&self, name: &str) -> Result<Molecule, StoreError> {
        let mol_id = self
            .molecule_id(name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let mut mol = Molecule::new();

        let mut stmt = self.conn.prepare(
            "SELECT Atoms.ELEMENT_CODE, Atoms.X, Atoms.Y, Atoms.Z
             FROM Atoms
             JOIN MoleculeAtom ON MoleculeAtom.ATOM_ID = Atoms.ATOM_ID
             WHERE MoleculeAtom.MOLECULE_ID = ?1
             ORDER BY MoleculeAtom.SEQ",
        )?;
        let atoms = stmt.query_map(params![mol_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;
        for atom in atoms {
            let (element, x, y, z) = atom?;
            mol.add_atom(element, DVec3::new(x, y, z));
        }

        let mut stmt = self.conn.prepare(
            "SELECT Bonds.A1, Bonds.A2, Bonds.EPAIRS
             FROM Bonds
             JOIN MoleculeBond ON MoleculeBond.BOND_ID = Bonds.BOND_ID
             WHERE MoleculeBond.MOLECULE_ID = ?1
             ORDER BY MoleculeBond.SEQ",
        )?;
        let bonds = stmt.query_map(params![mol_id], |row| {
            Ok((
                row.get::<_, usize>(0)?,
                row.get::<_, usize>(1)?,
                row.get::<_, u8>(2)?,
            ))
        })?;
        for bond in bonds {
            let (a1, a2, epairs) = bond?;
            mol.add_bond(a1, a2, epairs)?;
        }

        debug!(
            "loaded molecule {:?} ({} atoms, {} bonds)",
            name,
            mol.atom_count(),
            mol.bond_count()
        );
        Ok(mol)
    }

    /// Insert or replace an element style row.
    pub fn add_element(&self, element: &ElementRow) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO Elements
             (ELEMENT_CODE, ELEMENT_NAME, COLOUR1, COLOUR2, COLOUR3, RADIUS)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                element.code,
                element.name,
                element.color1,
                element.color2,
                element.color3,
                element.radius,
            ],
        )?;
        Ok(())
    }

    /// Delete an element style row.
    ///
    /// Refused while any stored atom still uses the code; removing it would
    /// orphan those atoms' styling. Removing an absent code is a no-op.
    pub fn remove_element(&self, code: &str) -> Result<(), StoreError> {
        let atoms: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM Atoms WHERE ELEMENT_CODE = ?1",
            params![code],
            |row| row.get(0),
        )?;
        if atoms > 0 {
            return Err(StoreError::ElementInUse {
                code: code.to_string(),
                atoms,
            });
        }

        self.conn
            .execute("DELETE FROM Elements WHERE ELEMENT_CODE = ?1", params![code])?;
        Ok(())
    }

    /// Names of all stored molecules, in insertion order.
    pub fn molecule_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT NAME FROM Molecules ORDER BY MOLECULE_ID")?;
        let names = stmt.query_map([], |row| row.get(0))?;
        Ok(names.collect::<Result<_, _>>()?)
    }

    pub fn atom_count(&self, name: &str) -> Result<u64, StoreError> {
        self.junction_count(name, "MoleculeAtom")
    }

    pub fn bond_count(&self, name: &str) -> Result<u64, StoreError> {
        self.junction_count(name, "MoleculeBond")
    }

    fn junction_count(&self, name: &str, table: &str) -> Result<u64, StoreError> {
        let mol_id = self
            .molecule_id(name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE MOLECULE_ID = ?1"),
            params![mol_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Build the style registry from the `Elements` table.
    pub fn element_styles(&self) -> Result<ElementStyles, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ELEMENT_CODE, ELEMENT_NAME, COLOUR1, COLOUR2, COLOUR3, RADIUS
             FROM Elements",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ElementStyle {
                    name: row.get(1)?,
                    color1: row.get(2)?,
                    color2: row.get(3)?,
                    color3: row.get(4)?,
                    radius: row.get(5)?,
                },
            ))
        })?;
        Ok(rows.collect::<Result<ElementStyles, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom("O", DVec3::new(0.0, 0.0, 0.0));
        mol.add_atom("H", DVec3::new(0.7572, 0.5868, 0.0));
        mol.add_atom("H", DVec3::new(-0.7572, 0.5868, 0.0));
        mol.add_bond(0, 1, 1).unwrap();
        mol.add_bond(0, 2, 1).unwrap();
        mol
    }

    fn oxygen_row() -> ElementRow {
        ElementRow {
            code: "O".to_string(),
            name: "Oxygen".to_string(),
            color1: "FF0000".to_string(),
            color2: "AA0000".to_string(),
            color3: "550000".to_string(),
            radius: 40,
        }
    }

    fn table_count(store: &MoleculeStore, table: &str) -> u64 {
        store
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn round_trip_preserves_atoms_and_bonds() {
        let mut store = MoleculeStore::open_in_memory().unwrap();
        let mol = water();
        store.insert_molecule("Water", &mol).unwrap();

        let loaded = store.load_molecule("Water").unwrap();
        assert_eq!(loaded.atoms(), mol.atoms());
        assert_eq!(loaded.bonds(), mol.bonds());
    }

    #[test]
    fn duplicate_name_is_rejected_without_writing_rows() {
        let mut store = MoleculeStore::open_in_memory().unwrap();
        store.insert_molecule("Water", &water()).unwrap();

        let err = store.insert_molecule("Water", &water()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(name) if name == "Water"));

        assert_eq!(table_count(&store, "Molecules"), 1);
        assert_eq!(table_count(&store, "Atoms"), 3);
        assert_eq!(table_count(&store, "Bonds"), 2);
        assert_eq!(table_count(&store, "MoleculeAtom"), 3);
    }

    #[test]
    fn load_unknown_name_is_not_found() {
        let store = MoleculeStore::open_in_memory().unwrap();
        let err = store.load_molecule("Nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(name) if name == "Nope"));
    }

    #[test]
    fn molecules_reload_independently() {
        let mut store = MoleculeStore::open_in_memory().unwrap();
        store.insert_molecule("Water", &water()).unwrap();

        // A second molecule whose rows interleave with the first in the
        // global Atoms/Bonds tables.
        let mut other = Molecule::new();
        other.add_atom("C", DVec3::new(0.0, 0.0, 1.0));
        other.add_atom("N", DVec3::new(1.0, 0.0, 1.0));
        other.add_bond(0, 1, 3).unwrap();
        store.insert_molecule("HCN-ish", &other).unwrap();

        let first = store.load_molecule("Water").unwrap();
        let second = store.load_molecule("HCN-ish").unwrap();
        assert_eq!(first.atom_count(), 3);
        assert_eq!(first.bond_count(), 2);
        assert_eq!(second.atom_count(), 2);
        assert_eq!(second.bonds()[0].epairs, 3);
        assert_eq!(second.atoms()[1].element, "N");

        assert_eq!(store.molecule_names().unwrap(), vec!["Water", "HCN-ish"]);
        assert_eq!(store.atom_count("Water").unwrap(), 3);
        assert_eq!(store.bond_count("HCN-ish").unwrap(), 1);
    }

    #[test]
    fn counts_for_unknown_name_are_not_found() {
        let store = MoleculeStore::open_in_memory().unwrap();
        assert!(matches!(
            store.atom_count("Nope").unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn add_element_upserts() {
        let store = MoleculeStore::open_in_memory().unwrap();
        store.add_element(&oxygen_row()).unwrap();

        let mut updated = oxygen_row();
        updated.radius = 50;
        store.add_element(&updated).unwrap();

        let styles = store.element_styles().unwrap();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles.fill_for("O").radius, 50);
        assert_eq!(styles.fill_for("O").color, "FF0000");
    }

    #[test]
    fn remove_element_refused_while_referenced() {
        let mut store = MoleculeStore::open_in_memory().unwrap();
        store.add_element(&oxygen_row()).unwrap();
        store.insert_molecule("Water", &water()).unwrap();

        let err = store.remove_element("O").unwrap_err();
        assert!(matches!(
            err,
            StoreError::ElementInUse { ref code, atoms: 1 } if code == "O"
        ));
        assert_eq!(store.element_styles().unwrap().len(), 1);

        // Unreferenced codes (and absent ones) remove cleanly.
        store.add_element(&ElementRow {
            code: "Xe".to_string(),
            name: "Xenon".to_string(),
            color1: "429EB0".to_string(),
            color2: "000000".to_string(),
            color3: "000000".to_string(),
            radius: 55,
        }).unwrap();
        store.remove_element("Xe").unwrap();
        store.remove_element("Kr").unwrap();
        assert_eq!(store.element_styles().unwrap().len(), 1);
    }

    #[test]
    fn element_styles_feed_gradients() {
        let store = MoleculeStore::open_in_memory().unwrap();
        store.add_element(&oxygen_row()).unwrap();

        let styles = store.element_styles().unwrap();
        let defs = styles.radial_gradients();
        assert!(defs.contains("id=\"Oxygen\""));
        assert!(defs.contains("stop-color=\"#550000\""));
    }

    #[test]
    fn database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("molecules.sqlite3");

        {
            let mut store = MoleculeStore::open(&path).unwrap();
            store.insert_molecule("Water", &water()).unwrap();
        }

        let store = MoleculeStore::open(&path).unwrap();
        let mol = store.load_molecule("Water").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
    }
}
