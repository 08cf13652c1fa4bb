//! Voter roll loading
//!
//! Loads the official voter roll from a delimited file into memory for the
//! duration of a session. Derived comparison strings (full name, full
//! address, combined key) are computed once at load; records are read-only
//! afterwards.

use crate::error::{BallotError, Result};
use crate::normalize::{join_components, normalize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Columns a voter roll file must carry. All fields are treated as text;
/// absent values default to empty string.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "First_Name",
    "Last_Name",
    "Street_Number",
    "Street_Name",
    "Street_Type",
    "Street_Dir_Suffix",
    "WARD",
];

/// One immutable voter roll row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterRecord {
    pub id: usize,
    pub first_name: String,
    pub last_name: String,
    pub street_number: String,
    pub street_name: String,
    pub street_type: String,
    pub street_dir_suffix: String,
    pub ward: String,

    // derived at construction, never edited afterwards
    pub full_name: String,
    pub full_address: String,
}

impl VoterRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        first_name: String,
        last_name: String,
        street_number: String,
        street_name: String,
        street_type: String,
        street_dir_suffix: String,
        ward: String,
    ) -> Self {
        let full_name = join_components([first_name.as_str(), last_name.as_str()]);
        let full_address = join_components([
            street_number.as_str(),
            street_name.as_str(),
            street_type.as_str(),
            street_dir_suffix.as_str(),
        ]);
        Self {
            id,
            first_name,
            last_name,
            street_number,
            street_name,
            street_type,
            street_dir_suffix,
            ward: ward.trim().to_string(),
            full_name,
            full_address,
        }
    }

    /// Full name and full address joined into one comparison string.
    pub fn combined_key(&self) -> String {
        join_components([self.full_name.as_str(), self.full_address.as_str()])
    }
}

/// The in-memory voter roll: records plus the precomputed normalized
/// corpora the matcher searches, and a ward index for Tier-1 scoping.
#[derive(Debug, Clone, Default)]
pub struct VoterRoll {
    records: Vec<VoterRecord>,
    combined_keys: Vec<String>,
    full_names: Vec<String>,
    ward_index: HashMap<String, Vec<usize>>,
}

impl VoterRoll {
    pub fn from_records(mut records: Vec<VoterRecord>) -> Self {
        // ids are positional inside a roll; caller-supplied ids are
        // overwritten so the corpora and ward index stay aligned
        for (idx, record) in records.iter_mut().enumerate() {
            record.id = idx;
        }

        let combined_keys = records
            .iter()
            .map(|r| normalize(&r.combined_key()))
            .collect();
        let full_names = records.iter().map(|r| normalize(&r.full_name)).collect();

        let mut ward_index: HashMap<String, Vec<usize>> = HashMap::new();
        for record in &records {
            if !record.ward.is_empty() {
                ward_index
                    .entry(record.ward.clone())
                    .or_default()
                    .push(record.id);
            }
        }

        Self {
            records,
            combined_keys,
            full_names,
            ward_index,
        }
    }

    /// Load a voter roll from a delimited file. Fails with a schema error
    /// if any required column is absent; no partial load.
    pub fn load_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BallotError::FileNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut column_positions = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            column_positions.insert(header.trim().to_string(), idx);
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !column_positions.contains_key(**col))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(BallotError::Schema(missing.join(", ")));
        }

        let field = |record: &csv::StringRecord, col: &str| -> String {
            column_positions
                .get(col)
                .and_then(|&idx| record.get(idx))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        let mut records = Vec::new();
        for (row_idx, row) in csv_reader.records().enumerate() {
            let row = row?;
            records.push(VoterRecord::new(
                row_idx,
                field(&row, "First_Name"),
                field(&row, "Last_Name"),
                field(&row, "Street_Number"),
                field(&row, "Street_Name"),
                field(&row, "Street_Type"),
                field(&row, "Street_Dir_Suffix"),
                field(&row, "WARD"),
            ));
        }

        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&VoterRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> &[VoterRecord] {
        &self.records
    }

    /// Normalized combined key for a record id.
    pub fn combined_key(&self, id: usize) -> &str {
        &self.combined_keys[id]
    }

    /// Normalized full name for a record id.
    pub fn full_name(&self, id: usize) -> &str {
        &self.full_names[id]
    }

    /// Record ids registered in the given ward, in roll order. Empty when
    /// the ward is unknown or blank.
    pub fn ward_ids(&self, ward: &str) -> &[usize] {
        self.ward_index
            .get(ward.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All record ids paired with their normalized combined keys.
    pub fn combined_corpus(&self) -> impl Iterator<Item = (usize, &str)> {
        self.combined_keys.iter().enumerate().map(|(i, k)| (i, k.as_str()))
    }

    /// All record ids paired with their normalized full names.
    pub fn name_corpus(&self) -> impl Iterator<Item = (usize, &str)> {
        self.full_names.iter().enumerate().map(|(i, n)| (i, n.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLL_CSV: &str = "\
First_Name,Last_Name,Street_Number,Street_Name,Street_Type,Street_Dir_Suffix,WARD
Jane,Doe,123,Main,St,NE,2
John,Smith,45,Oak,Ave,,3
,Jones,,,,,2
";

    #[test]
    fn test_load_roll() {
        let roll = VoterRoll::from_reader(ROLL_CSV.as_bytes()).unwrap();
        assert_eq!(roll.len(), 3);

        let jane = roll.get(0).unwrap();
        assert_eq!(jane.full_name, "Jane Doe");
        assert_eq!(jane.full_address, "123 Main St NE");
        assert_eq!(jane.combined_key(), "Jane Doe 123 Main St NE");
        assert_eq!(jane.ward, "2");
    }

    #[test]
    fn test_missing_components_fill_empty() {
        let roll = VoterRoll::from_reader(ROLL_CSV.as_bytes()).unwrap();

        // no dir suffix: address still well-formed, no trailing space
        let john = roll.get(1).unwrap();
        assert_eq!(john.full_address, "45 Oak Ave");

        // missing first name and address components
        let jones = roll.get(2).unwrap();
        assert_eq!(jones.full_name, "Jones");
        assert_eq!(jones.full_address, "");
        assert_eq!(jones.combined_key(), "Jones");
    }

    #[test]
    fn test_schema_error_on_missing_columns() {
        let csv = "First_Name,Last_Name\nJane,Doe\n";
        let err = VoterRoll::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            BallotError::Schema(cols) => {
                assert!(cols.contains("Street_Number"));
                assert!(cols.contains("WARD"));
                assert!(!cols.contains("First_Name"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_ward_index() {
        let roll = VoterRoll::from_reader(ROLL_CSV.as_bytes()).unwrap();
        assert_eq!(roll.ward_ids("2"), &[0, 2]);
        assert_eq!(roll.ward_ids("3"), &[1]);
        assert!(roll.ward_ids("9").is_empty());
        assert!(roll.ward_ids("").is_empty());
    }

    #[test]
    fn test_normalized_corpora() {
        let roll = VoterRoll::from_reader(ROLL_CSV.as_bytes()).unwrap();
        assert_eq!(roll.combined_key(0), "jane doe 123 main st ne");
        assert_eq!(roll.full_name(1), "john smith");
    }

    #[test]
    fn test_from_records_reassigns_ids() {
        // a record carried over from a larger load keeps no stale id
        let record = VoterRecord::new(
            5,
            "Jane".into(),
            "Doe".into(),
            "123".into(),
            "Main".into(),
            "St".into(),
            "NE".into(),
            "2".into(),
        );
        let roll = VoterRoll::from_records(vec![record]);

        assert_eq!(roll.get(0).unwrap().id, 0);
        assert_eq!(roll.ward_ids("2"), &[0]);
        assert_eq!(roll.combined_key(0), "jane doe 123 main st ne");
    }

    #[test]
    fn test_ids_stable_and_unique() {
        let roll = VoterRoll::from_reader(ROLL_CSV.as_bytes()).unwrap();
        for (idx, record) in roll.records().iter().enumerate() {
            assert_eq!(record.id, idx);
        }
    }
}
