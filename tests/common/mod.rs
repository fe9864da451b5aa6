use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use sheetsift::data::sheet::Cell;

pub fn s(text: &str) -> Cell {
    Cell::from(text)
}

pub fn n(v: f64) -> Cell {
    Cell::from(v)
}

fn build(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Workbook {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Empty => {}
                    Cell::Number(v) => {
                        ws.write_number(r as u32, c as u16, *v).unwrap();
                    }
                    Cell::Text(t) => {
                        ws.write_string(r as u32, c as u16, t.as_str()).unwrap();
                    }
                }
            }
        }
    }
    workbook
}

/// Write `sheets` (name, rows starting at A1) to `dir/file`.
pub fn write_workbook(dir: &Path, file: &str, sheets: &[(&str, Vec<Vec<Cell>>)]) -> PathBuf {
    let path = dir.join(file);
    build(sheets).save(&path).unwrap();
    path
}

/// Same as [`write_workbook`], kept in memory.
pub fn workbook_bytes(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    build(sheets).save_to_buffer().unwrap()
}

/// Two variables, three points: x = 2, 0, 3 and y = bla1, bla1, bla2.
pub fn xy_block() -> Vec<Vec<Cell>> {
    vec![
        vec![s("x"), s("m"), n(2.0), n(0.0), n(3.0)],
        vec![s("y"), s("-"), s("bla1"), s("bla1"), s("bla2")],
    ]
}
