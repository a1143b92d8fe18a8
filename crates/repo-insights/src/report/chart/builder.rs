use super::reshape::{melt, MeltConfig};
use super::spec::{
    AxisOrder, AxisStyle, ChartData, ChartSpec, Encoding, FieldType, MarkKind, MarkStyle, Overlay,
    Scale, Tooltip,
};
use crate::report::error::ReportError;
use crate::report::table::{CellValue, SummaryTable};
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    pub field: String,
    pub title: Option<String>,
    pub field_type: FieldType,
    pub label_padding: Option<u32>,
}

impl AxisConfig {
    pub fn nominal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Nominal)
    }

    pub fn quantitative(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Quantitative)
    }

    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            title: None,
            field_type,
            label_padding: None,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_label_padding(mut self, padding: u32) -> Self {
        self.label_padding = Some(padding);
        self
    }

    fn encoding(&self, order: AxisOrder, scale: Scale) -> Encoding {
        Encoding {
            field: self.field.clone(),
            title: self.title.clone(),
            field_type: self.field_type,
            order,
            scale,
            label_padding: self.label_padding,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub field: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }
}

/// Explicit row filters. Rows are never dropped unless a section asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Drop rows where any of the fields is missing.
    DropMissing(Vec<String>),
    /// Drop rows whose field equals the literal.
    Exclude { field: String, value: String },
}

impl RowFilter {
    pub fn drop_missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::DropMissing(fields.into_iter().map(Into::into).collect())
    }

    pub fn exclude(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Exclude {
            field: field.into(),
            value: value.into(),
        }
    }

    fn fields(&self) -> Vec<&str> {
        match self {
            Self::DropMissing(fields) => fields.iter().map(String::as_str).collect(),
            Self::Exclude { field, .. } => vec![field.as_str()],
        }
    }
}

/// Fixed per-section chart configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub title: Option<String>,
    pub mark: MarkKind,
    pub style: MarkStyle,
    pub x: AxisConfig,
    pub y: AxisConfig,
    pub color: Option<AxisConfig>,
    pub tooltip: Vec<String>,
    pub sort: Option<SortConfig>,
    pub y_scale: Scale,
    pub overlay: Option<Overlay>,
    pub melt: Option<MeltConfig>,
    pub filters: Vec<RowFilter>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub show_legend: bool,
    pub axis_style: AxisStyle,
}

impl ChartConfig {
    pub fn new(mark: MarkKind, x: AxisConfig, y: AxisConfig) -> Self {
        Self {
            title: None,
            mark,
            style: MarkStyle::default(),
            x,
            y,
            color: None,
            tooltip: Vec::new(),
            sort: None,
            y_scale: Scale::Linear,
            overlay: None,
            melt: None,
            filters: Vec::new(),
            width: None,
            height: None,
            show_legend: true,
            axis_style: AxisStyle::default(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn styled(mut self, style: MarkStyle) -> Self {
        self.style = style;
        self
    }

    pub fn colored_by(mut self, color: AxisConfig) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_tooltip<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tooltip = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn sorted_by(mut self, sort: SortConfig) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_y_scale(mut self, scale: Scale) -> Self {
        self.y_scale = scale;
        self
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn melted(mut self, melt: MeltConfig) -> Self {
        self.melt = Some(melt);
        self
    }

    pub fn filtered(mut self, filter: RowFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sized(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn without_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    pub fn with_axis_style(mut self, axis_style: AxisStyle) -> Self {
        self.axis_style = axis_style;
        self
    }

    /// Every column the chart reads, in the order they are validated.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.x.field.as_str(), self.y.field.as_str()];
        if let Some(color) = &self.color {
            fields.push(color.field.as_str());
        }
        fields.extend(self.tooltip.iter().map(String::as_str));
        if let Some(sort) = &self.sort {
            fields.push(sort.field.as_str());
        }
        for filter in &self.filters {
            fields.extend(filter.fields());
        }
        fields
    }
}

/// Derives [`ChartSpec`]s from summary tables.
pub struct ChartBuilder;

impl ChartBuilder {
    pub fn build(table: &SummaryTable, config: &ChartConfig) -> Result<ChartSpec, ReportError> {
        let reshaped;
        let table = match &config.melt {
            Some(melt_config) => {
                reshaped = melt(table, melt_config)?;
                &reshaped
            }
            None => table,
        };

        for field in config.referenced_fields() {
            table.require_column(field)?;
        }

        let mut rows: Vec<&Vec<CellValue>> = table.rows().iter().collect();
        for filter in &config.filters {
            let before = rows.len();
            rows = apply_filter(table, rows, filter)?;
            if rows.len() != before {
                debug!(
                    table = table.name(),
                    filter = ?filter,
                    dropped = before - rows.len(),
                    "rows filtered from chart"
                );
            }
        }

        let sorted = match &config.sort {
            Some(sort) => {
                let index = table.require_column(&sort.field)?;
                rows.sort_by(|a, b| compare_for_sort(&a[index], &b[index], sort.direction));
                true
            }
            None => false,
        };

        let order_for = |axis: &AxisConfig| {
            if sorted && axis.field_type.is_categorical() {
                AxisOrder::DataOrder
            } else {
                AxisOrder::Default
            }
        };

        let tooltip = config
            .tooltip
            .iter()
            .map(|field| Tooltip {
                field: field.clone(),
                field_type: tooltip_type(table, config, field),
            })
            .collect();

        Ok(ChartSpec {
            title: config.title.clone(),
            mark: config.mark,
            style: config.style.clone(),
            x: config.x.encoding(order_for(&config.x), Scale::Linear),
            y: config.y.encoding(order_for(&config.y), config.y_scale),
            color: config
                .color
                .as_ref()
                .map(|color| color.encoding(AxisOrder::Default, Scale::Linear)),
            tooltip,
            overlay: config.overlay.clone(),
            width: config.width,
            height: config.height,
            show_legend: config.show_legend,
            axis_style: config.axis_style,
            data: ChartData {
                columns: table.column_names().map(str::to_string).collect(),
                rows: rows.into_iter().cloned().collect(),
            },
        })
    }
}

fn apply_filter<'a>(
    table: &SummaryTable,
    rows: Vec<&'a Vec<CellValue>>,
    filter: &RowFilter,
) -> Result<Vec<&'a Vec<CellValue>>, ReportError> {
    match filter {
        RowFilter::DropMissing(fields) => {
            let indices = fields
                .iter()
                .map(|field| table.require_column(field))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows
                .into_iter()
                .filter(|row| indices.iter().all(|index| !row[*index].is_missing()))
                .collect())
        }
        RowFilter::Exclude { field, value } => {
            let index = table.require_column(field)?;
            Ok(rows
                .into_iter()
                .filter(|row| !row[index].matches_literal(value))
                .collect())
        }
    }
}

// Missing values sort last in either direction.
fn compare_for_sort(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        },
    }
}

fn tooltip_type(table: &SummaryTable, config: &ChartConfig, field: &str) -> FieldType {
    [Some(&config.x), Some(&config.y), config.color.as_ref()]
        .into_iter()
        .flatten()
        .find(|axis| axis.field == field)
        .map(|axis| axis.field_type)
        .unwrap_or_else(|| match table.column(field) {
            Some(column) if column.kind.is_numeric() => FieldType::Quantitative,
            _ => FieldType::Nominal,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::table::{Column, ColumnType};

    fn popularity_table() -> SummaryTable {
        SummaryTable::new(
            "names_most_pop.csv",
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("overall_popularity", ColumnType::Integer),
            ],
            vec![
                vec![CellValue::Text("A".into()), CellValue::Integer(100)],
                vec![CellValue::Text("B".into()), CellValue::Integer(500)],
                vec![CellValue::Text("C".into()), CellValue::Integer(500)],
            ],
        )
        .expect("table")
    }

    fn bar_config() -> ChartConfig {
        ChartConfig::new(
            MarkKind::Bar,
            AxisConfig::quantitative("overall_popularity"),
            AxisConfig::nominal("name"),
        )
    }

    fn names(spec: &ChartSpec) -> Vec<String> {
        spec.column_values("name")
            .expect("name column")
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn descending_sort_is_stable_for_ties() {
        let spec = ChartBuilder::build(
            &popularity_table(),
            &bar_config().sorted_by(SortConfig::descending("overall_popularity")),
        )
        .expect("chart builds");

        assert_eq!(names(&spec), vec!["B", "C", "A"]);
        assert_eq!(spec.y.order, AxisOrder::DataOrder);
        assert_eq!(spec.x.order, AxisOrder::Default);
    }

    #[test]
    fn ascending_sort_keeps_tie_order() {
        let spec = ChartBuilder::build(
            &popularity_table(),
            &bar_config().sorted_by(SortConfig::ascending("overall_popularity")),
        )
        .expect("chart builds");

        assert_eq!(names(&spec), vec!["A", "B", "C"]);
    }

    #[test]
    fn unsorted_chart_preserves_every_source_row() {
        let table = popularity_table();
        let spec = ChartBuilder::build(&table, &bar_config()).expect("chart builds");

        assert_eq!(spec.data.rows, table.rows());
        assert_eq!(spec.y.order, AxisOrder::Default);
    }

    #[test]
    fn missing_sort_keys_go_last() {
        let table = SummaryTable::new(
            "langs",
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("overall_popularity", ColumnType::Float),
            ],
            vec![
                vec![CellValue::Text("A".into()), CellValue::Missing],
                vec![CellValue::Text("B".into()), CellValue::Float(1.0)],
                vec![CellValue::Text("C".into()), CellValue::Float(2.0)],
            ],
        )
        .expect("table");

        let spec = ChartBuilder::build(
            &table,
            &bar_config().sorted_by(SortConfig::descending("overall_popularity")),
        )
        .expect("chart builds");
        assert_eq!(names(&spec), vec!["C", "B", "A"]);
    }

    #[test]
    fn unknown_encoding_field_fails() {
        let config = ChartConfig::new(
            MarkKind::Bar,
            AxisConfig::nominal("Month"),
            AxisConfig::quantitative("overall_popularity"),
        );

        match ChartBuilder::build(&popularity_table(), &config) {
            Err(ReportError::UnknownField { table, field }) => {
                assert_eq!(table, "names_most_pop.csv");
                assert_eq!(field, "Month");
            }
            other => panic!("expected unknown field, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tooltip_field_fails() {
        let config = bar_config().with_tooltip(["name", "stars"]);
        let error = ChartBuilder::build(&popularity_table(), &config).expect_err("tooltip checked");
        assert!(matches!(error, ReportError::UnknownField { field, .. } if field == "stars"));
    }

    #[test]
    fn filters_drop_only_configured_rows() {
        let table = SummaryTable::new(
            "repositories_by_year.csv",
            vec![
                Column::new("created_year", ColumnType::Integer),
                Column::new("0", ColumnType::Integer),
            ],
            vec![
                vec![CellValue::Integer(2021), CellValue::Integer(40)],
                vec![CellValue::Integer(2022), CellValue::Missing],
                vec![CellValue::Integer(2023), CellValue::Integer(2)],
            ],
        )
        .expect("table");

        let exclude_only = ChartConfig::new(
            MarkKind::Area,
            AxisConfig::nominal("created_year"),
            AxisConfig::quantitative("0"),
        )
        .filtered(RowFilter::exclude("created_year", "2023"));
        let spec = ChartBuilder::build(&table, &exclude_only).expect("chart builds");
        assert_eq!(spec.row_count(), 2);

        let both = exclude_only.filtered(RowFilter::drop_missing(["0"]));
        let spec = ChartBuilder::build(&table, &both).expect("chart builds");
        assert_eq!(spec.data.rows, vec![table.rows()[0].clone()]);
    }

    #[test]
    fn log_scale_leaves_values_and_tooltips_untouched() {
        let table = SummaryTable::new(
            "average_repositories_by_season.csv",
            vec![
                Column::new("Season", ColumnType::Categorical),
                Column::new("Average Repositories", ColumnType::Float),
            ],
            vec![
                vec![CellValue::Text("Fall".into()), CellValue::Float(61234.25)],
                vec![CellValue::Text("Spring".into()), CellValue::Float(70311.5)],
            ],
        )
        .expect("table");

        let config = ChartConfig::new(
            MarkKind::Bar,
            AxisConfig::nominal("Season"),
            AxisConfig::quantitative("Average Repositories"),
        )
        .with_y_scale(Scale::Log { base: 2 })
        .with_tooltip(["Season", "Average Repositories"])
        .with_overlay(Overlay {
            mark: MarkKind::Line,
            color: Some("blue".into()),
        });

        let spec = ChartBuilder::build(&table, &config).expect("chart builds");

        assert_eq!(spec.y.scale, Scale::Log { base: 2 });
        assert_eq!(spec.x.scale, Scale::Linear);
        assert_eq!(spec.data.rows, table.rows());
        assert_eq!(spec.tooltip[1].field, "Average Repositories");
        assert_eq!(spec.tooltip[1].field_type, FieldType::Quantitative);

        let vega = spec.to_vega_lite();
        let layers = vega["layer"].as_array().expect("layered chart");
        assert_eq!(layers[0]["encoding"]["x"], layers[1]["encoding"]["x"]);
        assert_eq!(vega["data"]["values"][0]["Average Repositories"], 61234.25);
    }

    #[test]
    fn melted_chart_encodes_long_columns() {
        let wide = SummaryTable::new(
            "top_lang_pop_over_time.csv",
            vec![
                Column::new("created_year", ColumnType::Integer),
                Column::new("Python", ColumnType::Float),
                Column::new("Ruby", ColumnType::Float),
            ],
            vec![vec![
                CellValue::Integer(2020),
                CellValue::Float(10.0),
                CellValue::Float(2.0),
            ]],
        )
        .expect("table");

        let config = ChartConfig::new(
            MarkKind::Line,
            AxisConfig::nominal("created_year"),
            AxisConfig::quantitative("Value"),
        )
        .colored_by(AxisConfig::nominal("Programming Language"))
        .melted(MeltConfig::new(
            "created_year",
            "Programming Language",
            "Value",
        ));

        let spec = ChartBuilder::build(&wide, &config).expect("chart builds");
        assert_eq!(
            spec.data.columns,
            vec!["created_year", "Programming Language", "Value"]
        );
        assert_eq!(spec.row_count(), 2);
    }
}
