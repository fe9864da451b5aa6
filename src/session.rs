use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::data::error::{FilterError, LoadError, SubsetError};
use crate::data::filter::{apply_mask, compute_mask, Criterion, Mask, Operator};
use crate::data::loader::{self, Workbook};
use crate::data::model::{Table, VariableId};
use crate::data::subset::{Subset, SubsetId, SubsetRegistry};
use crate::view::{self, ParallelCoordinates, ScatterView};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no workbook loaded")]
    NoData,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Subset(#[from] SubsetError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

// ---------------------------------------------------------------------------
// Catalog entries for variable / operator pickers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableEntry {
    pub id: VariableId,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatorEntry {
    pub operator: Operator,
    pub symbol: &'static str,
}

/// A filtered copy of the session table. The source table is never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub subsets: Vec<SubsetId>,
    pub mask: Mask,
    pub table: Table,
}

// ---------------------------------------------------------------------------
// Session – one user's workbook and subsets
// ---------------------------------------------------------------------------

/// Everything one user works with: the loaded workbook and the subsets
/// defined against it. Hosts serving several users keep one `Session`
/// each; a session itself is not synchronised.
#[derive(Debug, Default)]
pub struct Session {
    workbook: Option<Workbook>,
    subsets: SubsetRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a workbook from disk. On failure the session is left as it was.
    pub fn load_path(&mut self, path: &Path) -> Result<&Workbook, SessionError> {
        let workbook = loader::load_path(path)?;
        Ok(self.set_workbook(workbook))
    }

    /// Load a workbook from memory. On failure the session is left as it was.
    pub fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<&Workbook, SessionError> {
        let workbook = loader::load_bytes(bytes)?;
        Ok(self.set_workbook(workbook))
    }

    /// Install a workbook. Existing subsets refer to the previous table's
    /// columns and are dropped.
    pub fn set_workbook(&mut self, workbook: Workbook) -> &Workbook {
        if !self.subsets.is_empty() {
            log::info!("Dropping {} subsets defined on the previous workbook", self.subsets.len());
        }
        self.subsets.clear();
        self.workbook.insert(workbook)
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    pub fn table(&self) -> Result<&Table, SessionError> {
        self.workbook
            .as_ref()
            .map(|wb| &wb.table)
            .ok_or(SessionError::NoData)
    }

    pub fn subsets(&self) -> &SubsetRegistry {
        &self.subsets
    }

    /// Variables of the loaded table, in column order.
    pub fn variables(&self) -> Vec<VariableEntry> {
        self.workbook
            .iter()
            .flat_map(|wb| wb.table.variables())
            .map(|id| VariableEntry {
                label: id.to_string(),
                id: id.clone(),
            })
            .collect()
    }

    /// Resolve a picker label (`name (unit)`) back to its variable.
    pub fn find_variable(&self, label: &str) -> Option<VariableId> {
        let label = label.trim();
        self.workbook
            .as_ref()?
            .table
            .variables()
            .find(|id| id.to_string() == label)
            .cloned()
    }

    pub fn operators(&self) -> Vec<OperatorEntry> {
        Operator::ALL
            .into_iter()
            .map(|operator| OperatorEntry {
                operator,
                symbol: operator.symbol(),
            })
            .collect()
    }

    // -- subsets --

    /// Why `variable <operator> criterion` cannot be added, if it cannot.
    pub fn check_subset(
        &self,
        variable: &VariableId,
        operator: Operator,
        criterion: &str,
    ) -> Result<Criterion, SessionError> {
        let predicate = self.subsets.check(self.table()?, variable, operator, criterion)?;
        Ok(predicate.criterion)
    }

    pub fn validate_subset(&self, variable: &VariableId, operator: Operator, criterion: &str) -> bool {
        match self.table() {
            Ok(table) => self.subsets.validate(table, variable, operator, criterion),
            Err(_) => false,
        }
    }

    /// Validate, then store under `id` (replacing any subset with that id).
    pub fn create_subset(
        &mut self,
        id: SubsetId,
        variable: &VariableId,
        operator: Operator,
        criterion: &str,
    ) -> Result<Subset, SessionError> {
        let predicate = self.subsets.check(self.table()?, variable, operator, criterion)?;
        let subset = Subset::new(predicate);
        log::debug!("subset {id}: {}", subset.text);
        self.subsets.add(id, subset.clone());
        Ok(subset)
    }

    pub fn remove_subset(&mut self, id: SubsetId) -> Result<Subset, SessionError> {
        Ok(self.subsets.remove(id)?)
    }

    // -- filtered views --

    /// Table restricted to rows passing every listed subset.
    pub fn filtered(&self, ids: &[SubsetId]) -> Result<FilteredView, SessionError> {
        let table = self.table()?;
        let predicates = self.subsets.predicates(ids)?;
        let mask = compute_mask(table, &predicates)?;
        let filtered = apply_mask(table, &mask)?;
        log::debug!(
            "{} of {} rows pass {} subsets",
            filtered.len(),
            table.len(),
            ids.len()
        );
        Ok(FilteredView {
            subsets: ids.to_vec(),
            mask,
            table: filtered,
        })
    }

    /// Parallel-coordinates data over the filtered rows; `None` plots every
    /// variable.
    pub fn parallel_coordinates(
        &self,
        ids: &[SubsetId],
        variables: Option<&[VariableId]>,
    ) -> Result<ParallelCoordinates, SessionError> {
        let view = self.filtered(ids)?;
        Ok(view::parallel_coordinates(&view.table, variables)?)
    }

    pub fn scatter(
        &self,
        ids: &[SubsetId],
        x: &VariableId,
        y: &VariableId,
        z: Option<&VariableId>,
    ) -> Result<ScatterView, SessionError> {
        let view = self.filtered(ids)?;
        Ok(view::scatter(&view.table, x, y, z)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_sheets;
    use crate::data::sheet::{Cell, Sheet};

    fn session() -> Session {
        let sheet = Sheet::from_rows(
            "S1",
            vec![
                vec![Cell::from("x"), Cell::from("m"), Cell::from(2.0), Cell::from(0.0), Cell::from(3.0)],
                vec![Cell::from("y"), Cell::from("-"), Cell::from("bla1"), Cell::from("bla1"), Cell::from("bla2")],
            ],
        );
        let mut s = Session::new();
        s.set_workbook(load_sheets(&[sheet]).unwrap());
        s
    }

    #[test]
    fn operations_need_a_workbook() {
        let mut s = Session::new();
        assert!(matches!(s.table(), Err(SessionError::NoData)));
        assert!(!s.validate_subset(&VariableId::new("x", "m"), Operator::Eq, "1"));
        assert!(matches!(
            s.create_subset(1, &VariableId::new("x", "m"), Operator::Eq, "1"),
            Err(SessionError::NoData)
        ));
        assert_eq!(s.operators().len(), 6);
    }

    #[test]
    fn catalogs() {
        let s = session();
        let labels: Vec<String> = s.variables().into_iter().map(|v| v.label).collect();
        assert_eq!(labels, ["x (m)", "y (-)"]);
        assert_eq!(s.find_variable("y (-)"), Some(VariableId::new("y", "-")));
        assert_eq!(s.find_variable("y"), None);
        let symbols: Vec<&str> = s.operators().iter().map(|o| o.symbol).collect();
        assert_eq!(symbols, ["==", "!=", ">", "<", ">=", "<="]);
    }

    #[test]
    fn filtered_view_is_a_new_table() {
        let mut s = session();
        let x = VariableId::new("x", "m");
        let y = VariableId::new("y", "-");
        let sub = s.create_subset(1, &x, Operator::Gt, "1").unwrap();
        assert_eq!(sub.text, "x (m) > 1");
        s.create_subset(2, &y, Operator::Eq, "bla1").unwrap();

        let view = s.filtered(&[1, 2]).unwrap();
        assert_eq!(view.mask.as_slice(), &[true, false, false]);
        assert_eq!(view.table.len(), 1);
        assert_eq!(s.table().unwrap().len(), 3);

        let only_x = s.filtered(&[1]).unwrap();
        assert_eq!(only_x.mask.count(), 2);
        assert_eq!(s.filtered(&[]).unwrap().table.len(), 3);
    }

    #[test]
    fn unknown_subset_id_in_request() {
        let s = session();
        assert!(matches!(
            s.filtered(&[42]),
            Err(SessionError::Subset(SubsetError::NotFound(42)))
        ));
    }

    #[test]
    fn remove_then_readd() {
        let mut s = session();
        let x = VariableId::new("x", "m");
        s.create_subset(1, &x, Operator::Lt, "3").unwrap();
        assert!(matches!(
            s.create_subset(2, &x, Operator::Lt, "3"),
            Err(SessionError::Subset(SubsetError::Duplicate(_)))
        ));
        s.remove_subset(1).unwrap();
        assert!(s.create_subset(2, &x, Operator::Lt, "3").is_ok());
        assert!(matches!(
            s.remove_subset(1),
            Err(SessionError::Subset(SubsetError::NotFound(1)))
        ));
    }

    #[test]
    fn new_workbook_clears_subsets() {
        let mut s = session();
        s.create_subset(1, &VariableId::new("x", "m"), Operator::Ge, "0").unwrap();
        let wb = s.workbook().unwrap().clone();
        s.set_workbook(wb);
        assert!(s.subsets().is_empty());
    }

    #[test]
    fn plots_use_filtered_rows() {
        let mut s = session();
        let x = VariableId::new("x", "m");
        let y = VariableId::new("y", "-");
        s.create_subset(1, &y, Operator::Eq, "bla1").unwrap();

        let pc = s.parallel_coordinates(&[1], None).unwrap();
        assert_eq!(pc.rows.len(), 2);
        let sc = s.scatter(&[1], &x, &x, Some(&y)).unwrap();
        assert_eq!(sc.series.len(), 1);
    }
}
