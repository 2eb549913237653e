//! Table model for displaying records: fixed columns, one row per record.

use event_monitor_core::{text_summary, EventRecord};

/// Display columns, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Space,
    Time,
    Type,
    Size,
    Information,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Space,
        Column::Time,
        Column::Type,
        Column::Size,
        Column::Information,
    ];

    /// 1-based column id, stable across releases.
    pub fn id(self) -> u32 {
        match self {
            Column::Space => 1,
            Column::Time => 2,
            Column::Type => 3,
            Column::Size => 4,
            Column::Information => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::Space => "Space",
            Column::Time => "Time",
            Column::Type => "Type",
            Column::Size => "Size",
            Column::Information => "Information",
        }
    }

    /// Default width in pixels.
    pub fn default_width(self) -> u32 {
        match self {
            Column::Information => 600,
            _ => 40,
        }
    }
}

/// One displayed row. `index` counts from the newest record (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRow {
    pub index: usize,
    pub record: EventRecord,
}

impl EventRow {
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Space => self.record.space_id().to_string(),
            Column::Time => self.record.time().to_string(),
            Column::Type => self.record.event_type().to_string(),
            Column::Size => self.record.size().to_string(),
            Column::Information => text_summary(&self.record),
        }
    }

    pub fn cells(&self) -> [String; 5] {
        Column::ALL.map(|column| self.cell(column))
    }

    /// Every other row gets a shaded background, starting with the first.
    #[inline]
    pub fn is_shaded(&self) -> bool {
        self.index % 2 == 0
    }
}
