use serde::Serialize;

use super::error::SubsetError;
use super::filter::{Criterion, Operator, Predicate};
use super::model::{Table, VariableId};

/// Caller-assigned subset identifier.
pub type SubsetId = u64;

// ---------------------------------------------------------------------------
// Subset – a named predicate with its display text
// ---------------------------------------------------------------------------

/// Immutable once created; changing it means remove + add.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subset {
    pub predicate: Predicate,
    /// `"<variable> <symbol> <criterion>"`.
    pub text: String,
}

impl Subset {
    pub fn new(predicate: Predicate) -> Self {
        let text = predicate.to_string();
        Subset { predicate, text }
    }
}

// ---------------------------------------------------------------------------
// SubsetRegistry
// ---------------------------------------------------------------------------

/// Subsets by id, kept in insertion order for presentation.
#[derive(Debug, Clone, Default)]
pub struct SubsetRegistry {
    entries: Vec<(SubsetId, Subset)>,
}

impl SubsetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, or replace the subset already stored under `id`.
    pub fn add(&mut self, id: SubsetId, subset: Subset) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = subset,
            None => self.entries.push((id, subset)),
        }
    }

    pub fn remove(&mut self, id: SubsetId) -> Result<Subset, SubsetError> {
        let pos = self
            .entries
            .iter()
            .position(|(existing, _)| *existing == id)
            .ok_or(SubsetError::NotFound(id))?;
        Ok(self.entries.remove(pos).1)
    }

    pub fn get(&self, id: SubsetId) -> Option<&Subset> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SubsetId, &Subset)> {
        self.entries.iter().map(|(id, s)| (*id, s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Build the predicate for `variable <operator> criterion` and check it
    /// can be applied to `table`. Never mutates the registry.
    ///
    /// Rejected when an identical (variable, operator, criterion) subset
    /// already exists, or when the operator cannot be evaluated on the
    /// column (unknown variable, text ordering, number/text mismatch).
    pub fn check(
        &self,
        table: &Table,
        variable: &VariableId,
        operator: Operator,
        criterion: &str,
    ) -> Result<Predicate, SubsetError> {
        let predicate = Predicate::new(variable.clone(), operator, Criterion::parse(criterion));

        if self.entries.iter().any(|(_, s)| s.predicate == predicate) {
            return Err(SubsetError::Duplicate(predicate.to_string()));
        }
        predicate.evaluate(table)?;
        Ok(predicate)
    }

    /// Boolean form of [`check`](Self::check) for interactive filter building.
    pub fn validate(&self, table: &Table, variable: &VariableId, operator: Operator, criterion: &str) -> bool {
        match self.check(table, variable, operator, criterion) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("subset {variable} {operator} {criterion} rejected: {e}");
                false
            }
        }
    }

    /// Predicates of the given subsets, in the order of `ids`.
    pub fn predicates(&self, ids: &[SubsetId]) -> Result<Vec<Predicate>, SubsetError> {
        ids.iter()
            .map(|&id| {
                self.get(id)
                    .map(|s| s.predicate.clone())
                    .ok_or(SubsetError::NotFound(id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::FilterError;
    use crate::data::model::{Column, ColumnData, RowId};

    fn x() -> VariableId {
        VariableId::new("x", "m")
    }

    fn y() -> VariableId {
        VariableId::new("y", "-")
    }

    fn table() -> Table {
        Table::new(
            vec![RowId::new("S1", 1), RowId::new("S1", 2)],
            vec![
                Column {
                    id: x(),
                    data: ColumnData::Number(vec![Some(1.0), Some(2.0)]),
                },
                Column {
                    id: y(),
                    data: ColumnData::Text(vec![Some("a".into()), Some("b".into())]),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_triple_is_rejected_after_add() {
        let t = table();
        let mut reg = SubsetRegistry::new();

        assert!(reg.validate(&t, &x(), Operator::Gt, "1"));
        let pred = reg.check(&t, &x(), Operator::Gt, "1").unwrap();
        reg.add(1, Subset::new(pred));

        assert!(!reg.validate(&t, &x(), Operator::Gt, "1"));
        assert!(matches!(
            reg.check(&t, &x(), Operator::Gt, "1.0"),
            Err(SubsetError::Duplicate(_))
        ));
        // a different operator is a different subset
        assert!(reg.validate(&t, &x(), Operator::Ge, "1"));
    }

    #[test]
    fn incompatible_operator_is_false_not_error() {
        let t = table();
        let reg = SubsetRegistry::new();
        assert!(!reg.validate(&t, &y(), Operator::Gt, "a"));
        assert!(matches!(
            reg.check(&t, &y(), Operator::Lt, "a"),
            Err(SubsetError::Invalid(FilterError::IncomparableTypes { .. }))
        ));
        assert!(reg.validate(&t, &y(), Operator::Eq, "a"));
        assert!(!reg.validate(&t, &VariableId::new("nope", ""), Operator::Eq, "a"));
    }

    #[test]
    fn validate_does_not_mutate() {
        let t = table();
        let reg = SubsetRegistry::new();
        assert!(reg.validate(&t, &x(), Operator::Eq, "2"));
        assert!(reg.is_empty());
    }

    #[test]
    fn add_upserts_in_place() {
        let t = table();
        let mut reg = SubsetRegistry::new();
        reg.add(7, Subset::new(reg.check(&t, &x(), Operator::Gt, "0").unwrap()));
        reg.add(3, Subset::new(reg.check(&t, &y(), Operator::Eq, "a").unwrap()));
        reg.add(7, Subset::new(reg.check(&t, &x(), Operator::Lt, "5").unwrap()));

        let listed: Vec<(SubsetId, &str)> = reg.iter().map(|(id, s)| (id, s.text.as_str())).collect();
        assert_eq!(listed, [(7, "x (m) < 5"), (3, "y (-) == a")]);
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let t = table();
        let mut reg = SubsetRegistry::new();
        reg.add(1, Subset::new(reg.check(&t, &x(), Operator::Gt, "0").unwrap()));
        assert_eq!(reg.remove(2), Err(SubsetError::NotFound(2)));
        assert!(reg.remove(1).is_ok());
        assert!(reg.is_empty());
    }

    #[test]
    fn predicates_follow_requested_order() {
        let t = table();
        let mut reg = SubsetRegistry::new();
        reg.add(1, Subset::new(reg.check(&t, &x(), Operator::Gt, "0").unwrap()));
        reg.add(2, Subset::new(reg.check(&t, &y(), Operator::Eq, "a").unwrap()));

        let preds = reg.predicates(&[2, 1]).unwrap();
        assert_eq!(preds[0].variable, y());
        assert_eq!(preds[1].variable, x());
        assert_eq!(reg.predicates(&[9]), Err(SubsetError::NotFound(9)));
    }
}
