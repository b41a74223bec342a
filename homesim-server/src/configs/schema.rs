use crate::models::{DeviceTable, PresetTable, Table};

/// Owns the table declarations and orders them so that every table is
/// created after the tables it depends on.
pub struct SchemaManager {
    tables: Vec<Box<dyn Table>>,
}

impl SchemaManager {
    pub fn new(tables: Vec<Box<dyn Table>>) -> Self {
        Self {
            tables: Self::sort_tables(tables),
        }
    }

    fn sort_tables(mut pending: Vec<Box<dyn Table>>) -> Vec<Box<dyn Table>> {
        let mut sorted: Vec<Box<dyn Table>> = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let ready = pending.iter().position(|table| {
                table
                    .dependencies()
                    .iter()
                    .all(|dependency| sorted.iter().any(|done| done.name() == *dependency))
            });

            let index = ready.expect("Circular dependency detected or unresolved dependencies exist.");
            sorted.push(pending.remove(index));
        }

        sorted
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![Box::new(DeviceTable), Box::new(PresetTable)])
    }
}
