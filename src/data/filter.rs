use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::FilterError;
use super::model::{parse_number, ColumnData, Table, VariableId};
use super::sheet::format_number;

// ---------------------------------------------------------------------------
// Operator – the fixed comparison catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Operator {
    /// Catalog in display order.
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Ge => "ge",
            Operator::Le => "le",
        }
    }

    /// Whether the operator needs an ordering (anything but `==`/`!=`).
    pub fn is_ordering(self) -> bool {
        !matches!(self, Operator::Eq | Operator::Ne)
    }

    /// Outcome of the comparison `value <op> criterion`, given their order.
    /// Unordered pairs (empty cells, NaN) only satisfy `!=`.
    fn holds(self, ord: Option<Ordering>) -> bool {
        match (self, ord) {
            (Operator::Ne, None) => true,
            (_, None) => false,
            (Operator::Eq, Some(o)) => o == Ordering::Equal,
            (Operator::Ne, Some(o)) => o != Ordering::Equal,
            (Operator::Gt, Some(o)) => o == Ordering::Greater,
            (Operator::Lt, Some(o)) => o == Ordering::Less,
            (Operator::Ge, Some(o)) => o != Ordering::Less,
            (Operator::Le, Some(o)) => o != Ordering::Greater,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Accepts either the symbol (`>=`) or the name (`ge`).
impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s || op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown operator '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Criterion – the right-hand side, typed once when the subset is created
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Criterion {
    Number(f64),
    Text(String),
}

impl Criterion {
    /// Numeric when the text is lexically a number, text otherwise.
    pub fn parse(input: &str) -> Self {
        match parse_number(input) {
            Some(v) => Criterion::Number(v),
            None => Criterion::Text(input.to_string()),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Number(v) => f.write_str(&format_number(*v)),
            Criterion::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate / Mask
// ---------------------------------------------------------------------------

/// One `variable <op> criterion` test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub variable: VariableId,
    pub operator: Operator,
    pub criterion: Criterion,
}

impl Predicate {
    pub fn new(variable: VariableId, operator: Operator, criterion: Criterion) -> Self {
        Predicate {
            variable,
            operator,
            criterion,
        }
    }

    /// Evaluate against every row of `table`.
    pub fn evaluate(&self, table: &Table) -> Result<Vec<bool>, FilterError> {
        let column = table
            .column(&self.variable)
            .ok_or_else(|| FilterError::UnknownVariable(self.variable.clone()))?;
        let op = self.operator;

        match (&column.data, &self.criterion) {
            (ColumnData::Number(values), Criterion::Number(c)) => Ok(values
                .iter()
                .map(|v| op.holds(v.and_then(|v| v.partial_cmp(c))))
                .collect()),
            (ColumnData::Text(values), Criterion::Text(c)) => {
                if op.is_ordering() {
                    return Err(FilterError::IncomparableTypes {
                        variable: self.variable.clone(),
                        symbol: op.symbol(),
                    });
                }
                Ok(values
                    .iter()
                    .map(|v| op.holds(v.as_deref().map(|v| v.cmp(c.as_str()))))
                    .collect())
            }
            (data, criterion) => Err(FilterError::TypeMismatch {
                variable: self.variable.clone(),
                column_kind: data.kind_name(),
                criterion: criterion.to_string(),
            }),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.variable, self.operator, self.criterion)
    }
}

/// Row selection; one flag per table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mask(Vec<bool>);

impl Mask {
    /// Selects every row.
    pub fn all(len: usize) -> Self {
        Mask(vec![true; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of selected rows.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect()
    }
}

impl From<Vec<bool>> for Mask {
    fn from(v: Vec<bool>) -> Self {
        Mask(v)
    }
}

// ---------------------------------------------------------------------------
// Mask engine
// ---------------------------------------------------------------------------

/// AND of all predicates; an empty list selects every row.
pub fn compute_mask(table: &Table, predicates: &[Predicate]) -> Result<Mask, FilterError> {
    let mut mask = vec![true; table.len()];
    for predicate in predicates {
        let hits = predicate.evaluate(table)?;
        for (keep, hit) in mask.iter_mut().zip(hits) {
            *keep &= hit;
        }
    }
    Ok(Mask(mask))
}

/// New table with the selected rows only, row ids and columns unchanged.
pub fn apply_mask(table: &Table, mask: &Mask) -> Result<Table, FilterError> {
    if mask.len() != table.len() {
        return Err(FilterError::MaskLength {
            mask: mask.len(),
            rows: table.len(),
        });
    }
    Ok(table.take_rows(&mask.selected_indices()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, RowId};

    fn x() -> VariableId {
        VariableId::new("x", "m")
    }

    fn y() -> VariableId {
        VariableId::new("y", "-")
    }

    fn sample() -> Table {
        Table::new(
            (1..=3).map(|p| RowId::new("S1", p)).collect(),
            vec![
                Column {
                    id: x(),
                    data: ColumnData::Number(vec![Some(2.0), Some(0.0), Some(3.0)]),
                },
                Column {
                    id: y(),
                    data: ColumnData::Text(vec![
                        Some("bla1".into()),
                        Some("bla1".into()),
                        Some("bla2".into()),
                    ]),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn conjunction_of_predicates() {
        let table = sample();
        let preds = [
            Predicate::new(x(), Operator::Gt, Criterion::parse("1")),
            Predicate::new(y(), Operator::Eq, Criterion::parse("bla1")),
        ];
        let mask = compute_mask(&table, &preds).unwrap();
        assert_eq!(mask.as_slice(), &[true, false, false]);

        let filtered = apply_mask(&table, &mask).unwrap();
        assert_eq!(filtered.row_ids(), &[RowId::new("S1", 1)]);
        assert_eq!(filtered.columns().len(), 2);
        // source untouched
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn no_predicates_selects_everything() {
        let table = sample();
        let mask = compute_mask(&table, &[]).unwrap();
        assert_eq!(mask, Mask::all(3));
        assert_eq!(apply_mask(&table, &mask).unwrap(), table);
    }

    #[test]
    fn numeric_operators() {
        let table = sample();
        let hits = |op| {
            Predicate::new(x(), op, Criterion::Number(2.0))
                .evaluate(&table)
                .unwrap()
        };
        assert_eq!(hits(Operator::Eq), [true, false, false]);
        assert_eq!(hits(Operator::Ne), [false, true, true]);
        assert_eq!(hits(Operator::Gt), [false, false, true]);
        assert_eq!(hits(Operator::Lt), [false, true, false]);
        assert_eq!(hits(Operator::Ge), [true, false, true]);
        assert_eq!(hits(Operator::Le), [true, true, false]);
    }

    #[test]
    fn ordering_on_text_is_rejected() {
        let err = Predicate::new(y(), Operator::Gt, Criterion::parse("bla"))
            .evaluate(&sample())
            .unwrap_err();
        assert!(matches!(err, FilterError::IncomparableTypes { symbol: ">", .. }));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let table = sample();
        let err = Predicate::new(x(), Operator::Eq, Criterion::parse("abc"))
            .evaluate(&table)
            .unwrap_err();
        assert!(matches!(err, FilterError::TypeMismatch { column_kind: "numeric", .. }));

        let err = Predicate::new(y(), Operator::Ne, Criterion::parse("4"))
            .evaluate(&table)
            .unwrap_err();
        assert!(matches!(err, FilterError::TypeMismatch { column_kind: "text", .. }));
    }

    #[test]
    fn empty_cells_only_match_ne() {
        let table = Table::new(
            vec![RowId::new("s", 1), RowId::new("s", 2)],
            vec![Column {
                id: x(),
                data: ColumnData::Number(vec![None, Some(5.0)]),
            }],
        )
        .unwrap();
        let eq = Predicate::new(x(), Operator::Le, Criterion::Number(9.0)).evaluate(&table).unwrap();
        assert_eq!(eq, [false, true]);
        let ne = Predicate::new(x(), Operator::Ne, Criterion::Number(5.0)).evaluate(&table).unwrap();
        assert_eq!(ne, [true, false]);
    }

    #[test]
    fn unknown_variable() {
        let err = compute_mask(
            &sample(),
            &[Predicate::new(VariableId::new("z", "s"), Operator::Eq, Criterion::Number(1.0))],
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::UnknownVariable(_)));
    }

    #[test]
    fn mask_length_must_match() {
        let err = apply_mask(&sample(), &Mask::all(2)).unwrap_err();
        assert_eq!(err, FilterError::MaskLength { mask: 2, rows: 3 });
    }

    #[test]
    fn criterion_typing() {
        assert_eq!(Criterion::parse("3"), Criterion::Number(3.0));
        assert_eq!(Criterion::parse(" -1.5e2 "), Criterion::Number(-150.0));
        assert_eq!(Criterion::parse("bla1"), Criterion::Text("bla1".into()));
        assert_eq!(Criterion::parse("nan"), Criterion::Text("nan".into()));
    }

    #[test]
    fn operator_catalog() {
        let symbols: Vec<&str> = Operator::ALL.iter().map(|o| o.symbol()).collect();
        assert_eq!(symbols, ["==", "!=", ">", "<", ">=", "<="]);
        assert_eq!(">=".parse::<Operator>(), Ok(Operator::Ge));
        assert_eq!("NE".parse::<Operator>(), Ok(Operator::Ne));
        assert!("=>".parse::<Operator>().is_err());
    }
}
