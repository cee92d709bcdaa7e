use std::collections::BTreeMap;

use super::{check_column_order, Materializer, RegionFrame};
use crate::data::model::FieldValue;
use crate::data::schema::Column;
use crate::error::Result;

/// A materialized table held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<FieldValue>>,
}

impl MemoryTable {
    /// All cells of one column, top to bottom.
    pub fn column(&self, column: Column) -> Option<Vec<&FieldValue>> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

/// Keeps every materialized region in memory, keyed by region code.
/// Re-materializing a region replaces its table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, MemoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, code: &str) -> Option<&MemoryTable> {
        self.tables.get(code)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Materializer for MemoryStore {
    fn materialize(&mut self, frame: &RegionFrame<'_>, column_order: &[Column]) -> Result<()> {
        check_column_order(column_order)?;
        let rows = frame
            .records
            .iter()
            .map(|rec| {
                let std_time = frame.std_time(rec);
                column_order
                    .iter()
                    .map(|c| rec.value(*c, std_time))
                    .collect()
            })
            .collect();

        self.tables.insert(
            frame.region.code.clone(),
            MemoryTable {
                columns: column_order.to_vec(),
                rows,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SurveyRecord;
    use crate::region::RegionTable;

    #[test]
    fn stores_rows_in_requested_order() {
        let table = RegionTable::default();
        let records = vec![
            SurveyRecord {
                species: "Acesta sphoni".into(),
                year: 2010,
                ..Default::default()
            },
            SurveyRecord {
                species: "Gadus chalcogrammus".into(),
                year: 2011,
                ..Default::default()
            },
        ];
        let mut store = MemoryStore::new();
        store
            .materialize(
                &RegionFrame::new(table.get("AI").unwrap(), &records),
                &[Column::Year, Column::Species],
            )
            .unwrap();

        let t = store.table("AI").unwrap();
        assert_eq!(t.columns, [Column::Year, Column::Species]);
        assert_eq!(
            t.rows[1],
            [
                FieldValue::UInt(2011),
                FieldValue::Text("Gadus chalcogrammus".into())
            ]
        );
        assert!(t.column(Column::Depth).is_none());
    }
}
