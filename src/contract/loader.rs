//! Load named contract structures from CSV

use std::collections::BTreeMap;
use std::path::Path;

use csv::Reader;

use super::{ContractStructure, NamedStructure};
use crate::error::{Result, ValuationError};

/// Raw CSV row matching the structures file columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    player_id: String,
    structure_name: String,
    total_value: f64,
    years: u32,
    #[serde(default)]
    aav: f64,
    #[serde(default)]
    deferred_pct: f64,
    #[serde(default)]
    deferral_years: u32,
    /// `;`-separated list, e.g. "2;5"
    #[serde(default)]
    opt_outs: String,
    #[serde(default)]
    incentives_total: f64,
}

impl CsvRow {
    fn into_record(self, row: usize) -> Result<StructureRecord> {
        let opt_outs = parse_opt_outs(&self.opt_outs)
            .map_err(|reason| ValuationError::Parse { row, reason })?;

        let contract = ContractStructure::builder(self.total_value, self.years)
            .aav(self.aav)
            .deferral(self.deferred_pct, self.deferral_years)
            .opt_outs(opt_outs)
            .incentives_total(self.incentives_total)
            .build()?;

        Ok(StructureRecord {
            player_id: self.player_id,
            structure: NamedStructure::new(self.structure_name, contract),
        })
    }
}

fn parse_opt_outs(raw: &str) -> std::result::Result<Vec<u32>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().map_err(|e| format!("bad opt-out year {:?}: {}", s, e)))
        .collect()
}

/// One loaded structure and the player it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    pub player_id: String,
    pub structure: NamedStructure,
}

/// Load all structures from a CSV file
pub fn load_structures<P: AsRef<Path>>(path: P) -> Result<Vec<StructureRecord>> {
    let reader = Reader::from_path(path)?;
    read_all(reader)
}

/// Load structures from any reader (e.g., string buffer)
pub fn load_structures_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<StructureRecord>> {
    read_all(Reader::from_reader(reader))
}

fn read_all<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<StructureRecord>> {
    let mut records = Vec::new();

    for (i, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Header is line 1
        records.push(row.into_record(i + 2)?);
    }

    Ok(records)
}

/// Group loaded structures by player, preserving file order within a player
pub fn group_by_player(records: Vec<StructureRecord>) -> BTreeMap<String, Vec<NamedStructure>> {
    let mut grouped: BTreeMap<String, Vec<NamedStructure>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.player_id).or_default().push(record.structure);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
player_id,structure_name,total_value,years,aav,deferred_pct,deferral_years,opt_outs,incentives_total
ohtani,deferred,700,10,0,0.97,10,,0
ohtani,straight,700,10,0,0,0,,0
soto,opt_out,300,10,0,0,0,3;5,5
";

    #[test]
    fn test_load_from_reader() {
        let records = load_structures_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].structure.name, "deferred");
        assert_eq!(records[0].structure.contract.deferral_years(), 10);
        assert_eq!(records[2].structure.contract.opt_outs(), &[3, 5]);
        assert_eq!(records[2].structure.contract.incentives_total(), 5.0);
    }

    #[test]
    fn test_group_by_player() {
        let records = load_structures_from_reader(SAMPLE.as_bytes()).unwrap();
        let grouped = group_by_player(records);
        assert_eq!(grouped["ohtani"].len(), 2);
        assert_eq!(grouped["soto"].len(), 1);
    }

    #[test]
    fn test_invalid_row_is_rejected() {
        let bad = "\
player_id,structure_name,total_value,years,aav,deferred_pct,deferral_years,opt_outs,incentives_total
x,bad,100,5,0,0,0,7,0
";
        let err = load_structures_from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidContract { field: "opt_outs", .. }));
    }

    #[test]
    fn test_unparseable_opt_out() {
        let bad = "\
player_id,structure_name,total_value,years,aav,deferred_pct,deferral_years,opt_outs,incentives_total
x,bad,100,5,0,0,0,two,0
";
        let err = load_structures_from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, ValuationError::Parse { row: 2, .. }));
    }
}
