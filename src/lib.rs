//! Ingest scientific workbooks laid out as name / unit / points blocks and
//! filter the resulting table with conjunctive subsets.

pub mod color;
pub mod data;
pub mod export;
pub mod session;
pub mod view;

pub use data::filter::{Criterion, Mask, Operator, Predicate};
pub use data::loader::{SheetSummary, Workbook};
pub use data::model::{ColumnData, RowId, Table, VariableId};
pub use data::subset::{Subset, SubsetId, SubsetRegistry};
pub use session::{FilteredView, Session, SessionError};
