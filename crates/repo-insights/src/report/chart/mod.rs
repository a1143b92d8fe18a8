mod builder;
mod reshape;
mod spec;

pub use builder::{AxisConfig, ChartBuilder, ChartConfig, RowFilter, SortConfig, SortDirection};
pub use reshape::{melt, MeltConfig};
pub use spec::{
    AxisOrder, AxisStyle, ChartData, ChartSpec, Encoding, FieldType, Interpolation, MarkKind,
    MarkStyle, Overlay, Scale, Tooltip, VEGA_LITE_SCHEMA,
};
