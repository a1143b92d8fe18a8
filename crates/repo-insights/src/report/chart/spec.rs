use crate::report::table::CellValue;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Bar,
    Line,
    Area,
}

impl MarkKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bar => "Bar chart",
            Self::Line => "Line chart",
            Self::Area => "Area chart",
        }
    }

    const fn vega_name(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Area => "area",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Linear,
}

impl Interpolation {
    const fn vega_name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolate: Option<Interpolation>,
    /// Draws a line along the top edge of an area mark.
    #[serde(default)]
    pub outline: bool,
}

/// Measurement type of an encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Nominal,
    Quantitative,
}

impl FieldType {
    pub const fn is_categorical(self) -> bool {
        !matches!(self, Self::Quantitative)
    }

    const fn vega_name(self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::Quantitative => "quantitative",
        }
    }
}

/// How a categorical axis orders its values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrder {
    /// Renderer default (ascending by value).
    #[default]
    Default,
    /// Keep the order of the chart rows.
    DataOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Linear,
    Log {
        base: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encoding {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub field_type: FieldType,
    pub order: AxisOrder,
    pub scale: Scale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_padding: Option<u32>,
}

impl Encoding {
    fn to_vega(&self) -> Value {
        let mut encoding = Map::new();
        encoding.insert("field".into(), Value::from(vega_field(&self.field)));
        encoding.insert("type".into(), Value::from(self.field_type.vega_name()));
        if let Some(title) = &self.title {
            encoding.insert("title".into(), Value::from(title.as_str()));
        }
        if self.order == AxisOrder::DataOrder {
            encoding.insert("sort".into(), Value::Null);
        }
        if let Scale::Log { base } = self.scale {
            encoding.insert("scale".into(), json!({ "type": "log", "base": base }));
        }
        if let Some(padding) = self.label_padding {
            encoding.insert("axis".into(), json!({ "labelPadding": padding }));
        }
        Value::Object(encoding)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub field: String,
    pub field_type: FieldType,
}

/// A second mark drawn over the same x/y encodings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub mark: MarkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AxisStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_font_size: Option<u32>,
}

impl AxisStyle {
    fn is_default(&self) -> bool {
        self.title_font_size.is_none() && self.label_font_size.is_none()
    }
}

/// Rows handed to the renderer, in final display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ChartData {
    fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.clone(), cell_json(cell)))
                    .collect();
                Value::Object(record)
            })
            .collect()
    }
}

/// Declarative description of one chart, independent of the rendering target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub mark: MarkKind,
    pub style: MarkStyle,
    pub x: Encoding,
    pub y: Encoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Encoding>,
    pub tooltip: Vec<Tooltip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub show_legend: bool,
    pub axis_style: AxisStyle,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn row_count(&self) -> usize {
        self.data.rows.len()
    }

    pub fn column_values(&self, field: &str) -> Option<Vec<&CellValue>> {
        let index = self.data.columns.iter().position(|column| column == field)?;
        Some(self.data.rows.iter().map(|row| &row[index]).collect())
    }

    /// Vega-Lite v5 document for this chart.
    pub fn to_vega_lite(&self) -> Value {
        let mut spec = Map::new();
        spec.insert("$schema".into(), Value::from(VEGA_LITE_SCHEMA));
        if let Some(title) = &self.title {
            spec.insert("title".into(), Value::from(title.as_str()));
        }
        if let Some(width) = self.width {
            spec.insert("width".into(), Value::from(width));
        }
        if let Some(height) = self.height {
            spec.insert("height".into(), Value::from(height));
        }
        spec.insert("data".into(), json!({ "values": self.data.records() }));

        let primary = self.primary_layer();
        match &self.overlay {
            Some(overlay) => {
                let mut mark = Map::new();
                mark.insert("type".into(), Value::from(overlay.mark.vega_name()));
                if let Some(color) = &overlay.color {
                    mark.insert("color".into(), Value::from(color.as_str()));
                }
                let overlay_layer = json!({
                    "mark": Value::Object(mark),
                    "encoding": {
                        "x": self.x.to_vega(),
                        "y": self.y.to_vega(),
                    },
                });
                spec.insert("layer".into(), json!([primary, overlay_layer]));
            }
            None => {
                if let Value::Object(layer) = primary {
                    spec.extend(layer);
                }
            }
        }

        let mut config = Map::new();
        if !self.axis_style.is_default() {
            let mut axis = Map::new();
            if let Some(size) = self.axis_style.title_font_size {
                axis.insert("titleFontSize".into(), Value::from(size));
            }
            if let Some(size) = self.axis_style.label_font_size {
                axis.insert("labelFontSize".into(), Value::from(size));
            }
            config.insert("axis".into(), Value::Object(axis));
        }
        if !self.show_legend {
            config.insert("legend".into(), json!({ "disable": true }));
        }
        if !config.is_empty() {
            spec.insert("config".into(), Value::Object(config));
        }

        Value::Object(spec)
    }

    fn primary_layer(&self) -> Value {
        let mut mark = Map::new();
        mark.insert("type".into(), Value::from(self.mark.vega_name()));
        if let Some(size) = self.style.size {
            mark.insert("size".into(), Value::from(size));
        }
        if let Some(color) = &self.style.color {
            mark.insert("color".into(), Value::from(color.as_str()));
        }
        if let Some(opacity) = self.style.opacity {
            mark.insert("opacity".into(), Value::from(opacity));
        }
        if let Some(interpolate) = self.style.interpolate {
            mark.insert("interpolate".into(), Value::from(interpolate.vega_name()));
        }
        if self.style.outline {
            mark.insert("line".into(), Value::Bool(true));
        }

        let mut encoding = Map::new();
        encoding.insert("x".into(), self.x.to_vega());
        encoding.insert("y".into(), self.y.to_vega());
        if let Some(color) = &self.color {
            encoding.insert("color".into(), color.to_vega());
        }
        if !self.tooltip.is_empty() {
            let tooltip = self
                .tooltip
                .iter()
                .map(|tooltip| {
                    json!({
                        "field": vega_field(&tooltip.field),
                        "type": tooltip.field_type.vega_name(),
                    })
                })
                .collect::<Vec<_>>();
            encoding.insert("tooltip".into(), Value::Array(tooltip));
        }

        json!({ "mark": Value::Object(mark), "encoding": Value::Object(encoding) })
    }
}

fn cell_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Integer(value) => Value::from(*value),
        CellValue::Float(value) => Value::from(*value),
        CellValue::Text(value) => Value::from(value.as_str()),
        CellValue::Missing => Value::Null,
    }
}

// Vega-Lite treats `.` and brackets in field names as nested access.
fn vega_field(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '.' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
