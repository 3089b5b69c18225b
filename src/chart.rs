//! Chart View Support
//!
//! Charts arrive as Vega-Lite specifications. The web client hands them to
//! vega-embed after [`themed_spec`] merges in the dark theme. The terminal
//! client cannot draw Vega, so [`TextChart`] pulls inline data out of simple
//! specs for a bar rendering.

use serde_json::{json, Map, Value};

/// Dark theme merged into every chart's `config`
pub fn dark_theme() -> Value {
    json!({
        "background": "#2d2d2d",
        "title": { "color": "#e0e0e0" },
        "style": {
            "guide-label": { "fill": "#a0a0a0" },
            "guide-title": { "fill": "#e0e0e0" }
        },
        "axis": {
            "domainColor": "#a0a0a0",
            "gridColor": "rgba(255, 255, 255, 0.1)",
            "tickColor": "#a0a0a0"
        },
        "legend": {
            "labelColor": "#e0e0e0",
            "titleColor": "#e0e0e0"
        }
    })
}

/// Copy of `spec` with the dark theme applied.
///
/// Theme keys replace same-named keys of an existing `config`; other config keys
/// survive. Non-object specs are returned untouched for the charting library to
/// reject.
pub fn themed_spec(spec: &Value) -> Value {
    let Value::Object(fields) = spec else {
        return spec.clone();
    };

    let mut themed = fields.clone();
    let mut config = match themed.remove("config") {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };

    if let Value::Object(theme) = dark_theme() {
        for (key, value) in theme {
            config.insert(key, value);
        }
    }

    themed.insert("config".to_string(), Value::Object(config));
    Value::Object(themed)
}

// ============ Text Rendering ============

/// Inline data of a simple x/y chart
#[derive(Debug, Clone, PartialEq)]
pub struct TextChart {
    pub mark: String,
    pub title: Option<String>,
    pub x_field: String,
    pub y_field: String,
    pub points: Vec<(String, f64)>,
}

impl TextChart {
    /// Extract `data.values` using `encoding.x.field` / `encoding.y.field`.
    ///
    /// Rows missing either field, or with a non-numeric y, are skipped. Returns
    /// `None` when nothing plottable remains.
    pub fn from_spec(spec: &Value) -> Option<Self> {
        let encoding = spec.get("encoding")?;
        let x_field = encoding.get("x")?.get("field")?.as_str()?.to_string();
        let y_field = encoding.get("y")?.get("field")?.as_str()?.to_string();
        let values = spec.get("data")?.get("values")?.as_array()?;

        let points: Vec<(String, f64)> = values
            .iter()
            .filter_map(|row| {
                let label = match row.get(&x_field)? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let value = match row.get(&y_field)? {
                    Value::Number(n) => n.as_f64()?,
                    Value::String(s) => s.parse().ok()?,
                    _ => return None,
                };
                Some((label, value))
            })
            .collect();

        if points.is_empty() {
            return None;
        }

        Some(Self {
            mark: mark_type(spec).unwrap_or_else(|| "chart".to_string()),
            title: title(spec),
            x_field,
            y_field,
            points,
        })
    }

    /// Horizontal bars scaled to `width` columns, one line per point
    pub fn render(&self, width: usize) -> String {
        let label_width = self
            .points
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        let min = self.points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max = self.points.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        // Lines and points show variation, bars show magnitude from zero
        let floor = if self.mark == "bar" {
            0.0_f64.min(min)
        } else {
            min
        };
        let span = (max - floor).max(f64::EPSILON);

        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push('\n');
        }
        out.push_str(&format!("{} by {} ({})\n", self.y_field, self.x_field, self.mark));

        for (label, value) in &self.points {
            let filled = (((value - floor) / span) * width as f64).round() as usize;
            out.push_str(&format!(
                "{:<label_width$} | {}{} {:.2}\n",
                label,
                "█".repeat(filled.max(1)),
                " ".repeat(width.saturating_sub(filled.max(1))),
                value,
                label_width = label_width
            ));
        }

        out
    }
}

/// One-line description for specs [`TextChart`] cannot summarise
pub fn describe(spec: &Value) -> String {
    let mark = mark_type(spec).unwrap_or_else(|| "chart".to_string());
    match title(spec) {
        Some(title) => format!("[{} chart: {}]", mark, title),
        None => format!("[{} chart]", mark),
    }
}

/// `mark` may be a string or `{ "type": ... }`
fn mark_type(spec: &Value) -> Option<String> {
    match spec.get("mark")? {
        Value::String(mark) => Some(mark.clone()),
        Value::Object(mark) => mark.get("type")?.as_str().map(str::to_string),
        _ => None,
    }
}

fn title(spec: &Value) -> Option<String> {
    match spec.get("title") {
        Some(Value::String(title)) => Some(title.clone()),
        Some(Value::Object(title)) => title.get("text")?.as_str().map(str::to_string),
        _ => spec.get("description")?.as_str().map(str::to_string),
    }
}
