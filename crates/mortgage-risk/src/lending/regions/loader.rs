use super::RegionRiskEntry;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RegionRow {
    region_id: String,
    overheat_index: u8,
    #[serde(default)]
    yoy_change_percent: f64,
}

pub(super) fn parse_entries<R: Read>(reader: R) -> Result<Vec<RegionRiskEntry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for record in csv_reader.deserialize::<RegionRow>() {
        let row = record?;
        entries.push(RegionRiskEntry {
            region_id: row.region_id,
            overheat_index: row.overheat_index,
            yoy_change_percent: row.yoy_change_percent,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::super::{RegionRiskTable, RegionTableError};
    use std::io::Cursor;

    #[test]
    fn loads_snapshot_with_padded_cells() {
        let csv = "region_id,overheat_index,yoy_change_percent\n新竹市 , 88 , 18.2\n台北市,28,2.8\n";
        let table = RegionRiskTable::from_reader(Cursor::new(csv)).expect("snapshot loads");
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("新竹市").map(|e| e.overheat_index), Some(88));
    }

    #[test]
    fn rejects_non_numeric_index() {
        let csv = "region_id,overheat_index,yoy_change_percent\n台中市,hot,12.1\n";
        assert!(matches!(
            RegionRiskTable::from_reader(Cursor::new(csv)),
            Err(RegionTableError::Csv(_))
        ));
    }

    #[test]
    fn rejects_header_only_snapshot() {
        let csv = "region_id,overheat_index,yoy_change_percent\n";
        assert!(matches!(
            RegionRiskTable::from_reader(Cursor::new(csv)),
            Err(RegionTableError::Empty)
        ));
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        assert!(matches!(
            RegionRiskTable::from_path("does/not/exist/regions.csv"),
            Err(RegionTableError::Io(_))
        ));
    }
}
