use serde::Serialize;

use crate::color::ColorMap;
use crate::data::error::FilterError;
use crate::data::model::{Column, ColumnData, RowId, Table, VariableId};

// ---------------------------------------------------------------------------
// Plot hand-off values
// ---------------------------------------------------------------------------
//
// These describe *what* to draw from a (filtered) table. Drawing itself is
// left to whichever charting front end consumes them.

/// Category axis labels for a text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticks {
    pub text: Vec<String>,
    pub values: Vec<f64>,
}

/// One parallel-coordinates axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub variable: VariableId,
    pub label: String,
    /// Numeric values, or category indices into `ticks` for text columns.
    pub values: Vec<Option<f64>>,
    pub ticks: Option<Ticks>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelCoordinates {
    pub rows: Vec<RowId>,
    pub dimensions: Vec<Dimension>,
}

/// Build one axis per variable; `None` means every column in table order.
pub fn parallel_coordinates(
    table: &Table,
    variables: Option<&[VariableId]>,
) -> Result<ParallelCoordinates, FilterError> {
    let columns: Vec<&Column> = match variables {
        None => table.columns().iter().collect(),
        Some(vars) => vars
            .iter()
            .map(|v| lookup(table, v))
            .collect::<Result<_, _>>()?,
    };

    let dimensions = columns.into_iter().map(dimension).collect();
    Ok(ParallelCoordinates {
        rows: table.row_ids().to_vec(),
        dimensions,
    })
}

fn dimension(column: &Column) -> Dimension {
    let (values, ticks) = match &column.data {
        ColumnData::Number(v) => (v.clone(), None),
        ColumnData::Text(v) => {
            // Categories numbered by first appearance.
            let mut categories: Vec<String> = Vec::new();
            let values: Vec<Option<f64>> = v
                .iter()
                .map(|cell| {
                    let cell = cell.as_ref()?;
                    let idx = match categories.iter().position(|c| c == cell) {
                        Some(i) => i,
                        None => {
                            categories.push(cell.clone());
                            categories.len() - 1
                        }
                    };
                    Some(idx as f64)
                })
                .collect();
            let tick_values = (0..categories.len()).map(|i| i as f64).collect();
            (
                values,
                Some(Ticks {
                    text: categories,
                    values: tick_values,
                }),
            )
        }
    };
    Dimension {
        variable: column.id.clone(),
        label: column.id.to_string(),
        values,
        ticks,
    }
}

/// One coloured group of scatter points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    /// `"<z variable> = <value>"`; `None` when no colouring variable is set.
    pub name: Option<String>,
    pub color: Option<String>,
    pub rows: Vec<RowId>,
    pub x: ColumnData,
    pub y: ColumnData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterView {
    pub x_label: String,
    pub y_label: String,
    pub z_label: Option<String>,
    pub series: Vec<ScatterSeries>,
}

/// Scatter of `y` against `x`, split into one series per distinct value of
/// `z` (first-appearance order) when given.
pub fn scatter(
    table: &Table,
    x: &VariableId,
    y: &VariableId,
    z: Option<&VariableId>,
) -> Result<ScatterView, FilterError> {
    let x_col = lookup(table, x)?;
    let y_col = lookup(table, y)?;

    let Some(z) = z else {
        let all: Vec<usize> = (0..table.len()).collect();
        return Ok(ScatterView {
            x_label: x.to_string(),
            y_label: y.to_string(),
            z_label: None,
            series: vec![build_series(table, x_col, y_col, &all, None, None)],
        });
    };

    let z_col = lookup(table, z)?;
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, label) in z_col.data.to_text().into_iter().enumerate() {
        let label = label.unwrap_or_default();
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, idx)) => idx.push(i),
            None => groups.push((label, vec![i])),
        }
    }

    let labels: Vec<String> = groups.iter().map(|(l, _)| l.clone()).collect();
    let colors = ColorMap::new(&labels);
    let series = groups
        .iter()
        .map(|(label, idx)| {
            build_series(
                table,
                x_col,
                y_col,
                idx,
                Some(format!("{z} = {label}")),
                Some(colors.color_for(label).to_string()),
            )
        })
        .collect();

    Ok(ScatterView {
        x_label: x.to_string(),
        y_label: y.to_string(),
        z_label: Some(z.to_string()),
        series,
    })
}

fn build_series(
    table: &Table,
    x: &Column,
    y: &Column,
    indices: &[usize],
    name: Option<String>,
    color: Option<String>,
) -> ScatterSeries {
    ScatterSeries {
        name,
        color,
        rows: indices.iter().map(|&i| table.row_ids()[i].clone()).collect(),
        x: x.data.take(indices),
        y: y.data.take(indices),
    }
}

fn lookup<'a>(table: &'a Table, variable: &VariableId) -> Result<&'a Column, FilterError> {
    table
        .column(variable)
        .ok_or_else(|| FilterError::UnknownVariable(variable.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            (1..=4).map(|p| RowId::new("S", p)).collect(),
            vec![
                Column {
                    id: VariableId::new("col1", "m"),
                    data: ColumnData::Number(vec![Some(1.0), Some(2.0), Some(3.0), Some(1.0)]),
                },
                Column {
                    id: VariableId::new("col2", "-"),
                    data: ColumnData::Number(vec![Some(4.1), Some(5.2), Some(6.1), Some(6.1)]),
                },
                Column {
                    id: VariableId::new("col3", "-"),
                    data: ColumnData::Text(vec![
                        Some("bla1".into()),
                        Some("bla2".into()),
                        Some("bla1".into()),
                        None,
                    ]),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn text_axis_gets_category_ticks() {
        let pc = parallel_coordinates(&table(), None).unwrap();
        assert_eq!(pc.dimensions.len(), 3);
        assert_eq!(pc.dimensions[0].label, "col1 (m)");
        assert!(pc.dimensions[0].ticks.is_none());

        let cat = &pc.dimensions[2];
        let ticks = cat.ticks.as_ref().unwrap();
        assert_eq!(ticks.text, ["bla1", "bla2"]);
        assert_eq!(ticks.values, [0.0, 1.0]);
        assert_eq!(cat.values, [Some(0.0), Some(1.0), Some(0.0), None]);
    }

    #[test]
    fn explicit_variable_list_sets_axis_order() {
        let vars = [VariableId::new("col3", "-"), VariableId::new("col1", "m")];
        let pc = parallel_coordinates(&table(), Some(&vars)).unwrap();
        let labels: Vec<&str> = pc.dimensions.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["col3 (-)", "col1 (m)"]);

        let missing = [VariableId::new("nope", "")];
        assert!(parallel_coordinates(&table(), Some(&missing)).is_err());
    }

    #[test]
    fn scatter_groups_by_colour_variable() {
        let x = VariableId::new("col1", "m");
        let y = VariableId::new("col2", "-");
        let z = VariableId::new("col3", "-");
        let view = scatter(&table(), &x, &y, Some(&z)).unwrap();

        assert_eq!(view.series.len(), 3);
        assert_eq!(view.series[0].name.as_deref(), Some("col3 (-) = bla1"));
        assert_eq!(view.series[0].rows, [RowId::new("S", 1), RowId::new("S", 3)]);
        assert_eq!(view.series[0].x, ColumnData::Number(vec![Some(1.0), Some(3.0)]));
        assert_ne!(view.series[0].color, view.series[1].color);
    }

    #[test]
    fn scatter_without_colour_is_one_series() {
        let x = VariableId::new("col1", "m");
        let y = VariableId::new("col2", "-");
        let view = scatter(&table(), &x, &y, None).unwrap();
        assert_eq!(view.series.len(), 1);
        assert_eq!(view.series[0].rows.len(), 4);
        assert!(view.series[0].name.is_none());
    }
}
