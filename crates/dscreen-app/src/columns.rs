//! Tabular projection of the registry
//!
//! The device table has five fixed columns. Each one is described by a
//! [`ColumnDescriptor`] in [`COLUMNS`], indexed by [`Column::index`].

use std::fmt;

use dscreen_core::prelude::*;
use serde::Serialize;

use crate::record::DeviceRecord;

/// The columns of the device table, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Name,
    Type,
    SerialNo,
    State,
    Visible,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Name,
        Column::Type,
        Column::SerialNo,
        Column::State,
        Column::Visible,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::ColumnOutOfRange { column: index })
    }

    pub fn descriptor(self) -> &'static ColumnDescriptor {
        &COLUMNS[self.index()]
    }

    /// Label key used to resolve the header text
    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    pub fn kind(self) -> ColumnKind {
        self.descriptor().kind
    }

    pub fn is_editable(self) -> bool {
        self.descriptor().editable
    }

    pub fn value(self, record: &DeviceRecord) -> CellValue {
        (self.descriptor().accessor)(record)
    }
}

/// Semantic type of a column's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Flag,
}

/// A single cell of the device table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Flag(bool),
}

impl CellValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            CellValue::Text(_) => ColumnKind::Text,
            CellValue::Flag(_) => ColumnKind::Flag,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CellValue::Flag(flag) => Some(*flag),
            CellValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            CellValue::Flag(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Flag(true) => f.write_str("[x]"),
            CellValue::Flag(false) => f.write_str("[ ]"),
        }
    }
}

/// Static description of one column
#[derive(Debug)]
pub struct ColumnDescriptor {
    pub column: Column,
    pub key: &'static str,
    pub kind: ColumnKind,
    pub editable: bool,
    pub accessor: fn(&DeviceRecord) -> CellValue,
}

/// Descriptor table, indexed by [`Column::index`]
pub static COLUMNS: [ColumnDescriptor; Column::COUNT] = [
    ColumnDescriptor {
        column: Column::Name,
        key: "name",
        kind: ColumnKind::Text,
        editable: false,
        accessor: name_cell,
    },
    ColumnDescriptor {
        column: Column::Type,
        key: "type",
        kind: ColumnKind::Text,
        editable: false,
        accessor: type_cell,
    },
    ColumnDescriptor {
        column: Column::SerialNo,
        key: "serial_no",
        kind: ColumnKind::Text,
        editable: false,
        accessor: serial_cell,
    },
    ColumnDescriptor {
        column: Column::State,
        key: "state",
        kind: ColumnKind::Text,
        editable: false,
        accessor: state_cell,
    },
    ColumnDescriptor {
        column: Column::Visible,
        key: "visible",
        kind: ColumnKind::Flag,
        editable: true,
        accessor: visible_cell,
    },
];

fn name_cell(record: &DeviceRecord) -> CellValue {
    CellValue::Text(record.name().to_string())
}

fn type_cell(record: &DeviceRecord) -> CellValue {
    CellValue::Text(record.kind().code().to_string())
}

fn serial_cell(record: &DeviceRecord) -> CellValue {
    CellValue::Text(record.serial_number().to_string())
}

fn state_cell(record: &DeviceRecord) -> CellValue {
    CellValue::Text(record.connection_state())
}

fn visible_cell(record: &DeviceRecord) -> CellValue {
    CellValue::Flag(record.is_visible())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_table_matches_enum_order() {
        for (index, column) in Column::ALL.iter().enumerate() {
            assert_eq!(COLUMNS[index].column, *column);
            assert_eq!(column.index(), index);
        }
    }

    #[test]
    fn test_column_keys() {
        let keys: Vec<_> = Column::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys, ["name", "type", "serial_no", "state", "visible"]);
    }

    #[test]
    fn test_only_visible_is_editable() {
        for column in Column::ALL {
            assert_eq!(column.is_editable(), column == Column::Visible);
        }
    }

    #[test]
    fn test_from_index_out_of_range() {
        assert_eq!(Column::from_index(4).unwrap(), Column::Visible);
        assert!(matches!(
            Column::from_index(5),
            Err(Error::ColumnOutOfRange { column: 5 })
        ));
    }

    #[test]
    fn test_accessors() {
        let record = DeviceRecord::new("Emu1", "emulator-5554", "device");

        assert_eq!(Column::Name.value(&record), CellValue::Text("Emu1".into()));
        assert_eq!(Column::Type.value(&record), CellValue::Text("EMU".into()));
        assert_eq!(
            Column::SerialNo.value(&record),
            CellValue::Text("emulator-5554".into())
        );
        assert_eq!(Column::State.value(&record), CellValue::Text("device".into()));
        assert_eq!(Column::Visible.value(&record), CellValue::Flag(false));
    }

    #[test]
    fn test_cell_kind_matches_column_kind() {
        let record = DeviceRecord::new("Pixel", "SN1", "device");
        for column in Column::ALL {
            assert_eq!(column.value(&record).kind(), column.kind());
        }
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Text("DEV".into()).to_string(), "DEV");
        assert_eq!(CellValue::Flag(true).to_string(), "[x]");
        assert_eq!(CellValue::Flag(false).to_string(), "[ ]");
    }
}
