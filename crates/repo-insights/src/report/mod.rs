//! Report rendering over precomputed repository summary tables.
//!
//! Every section is built independently: its table is loaded, turned into a
//! [`ChartSpec`] and handed back as a [`ReportSection`] value. The
//! [`ReportAssembler`] collects those values in blueprint order.

mod assembler;
pub mod blueprint;
pub mod chart;
mod error;
pub mod narrative;
pub mod render;
pub mod section;
pub mod table;

pub use assembler::{DirectoryTables, ReportAssembler, TableProvider};
pub use blueprint::{ReportBlueprint, SectionChart, SectionTemplate, TableSource};
pub use chart::{ChartBuilder, ChartConfig, ChartSpec};
pub use error::ReportError;
pub use narrative::{Block, Bullet, Link};
pub use section::{Report, ReportSection};
pub use table::{CellValue, Column, ColumnType, SummaryTable, TableLoader, TableSchema};
