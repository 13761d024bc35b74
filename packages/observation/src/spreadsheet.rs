//! Spreadsheet upload reader (first worksheet only).

use std::path::Path;

use calamine::{Data, Reader as _, open_workbook_auto};

use crate::table::RawTable;
use crate::{DataShapeError, LoadError};

/// Reads the first worksheet of a workbook into a [`RawTable`].
///
/// # Errors
///
/// Returns [`LoadError::Spreadsheet`] if the workbook cannot be opened and
/// [`DataShapeError::NoWorksheet`] if it has no sheets.
pub fn read_first_sheet(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DataShapeError::NoWorksheet)??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(RawTable::default());
    };

    let headers = header.iter().map(cell_text).collect();
    let rows: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();

    log::debug!("Read {} worksheet rows from {}", rows.len(), path.display());

    Ok(RawTable { headers, rows })
}

/// Renders a cell as text. Whole floats print without a fractional part so
/// numeric month cells read as `"1"` rather than `"1.0"`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        #[allow(clippy::cast_possible_truncation)]
        Data::Float(f) if f.fract().abs() < f64::EPSILON && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn renders_cells_as_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String(" Krian ".to_string())), "Krian");
        assert_eq!(cell_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
    }

    const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Data OPT" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    // Bulan is a numeric cell in row 2; Puso is left blank in row 3.
    const SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1">
<c r="A1" t="inlineStr"><is><t>Kecamatan</t></is></c>
<c r="B1" t="inlineStr"><is><t>Desa</t></is></c>
<c r="C1" t="inlineStr"><is><t>OPT</t></is></c>
<c r="D1" t="inlineStr"><is><t>Bulan</t></is></c>
<c r="E1" t="inlineStr"><is><t>Serangan</t></is></c>
<c r="F1" t="inlineStr"><is><t>Pengendalian</t></is></c>
<c r="G1" t="inlineStr"><is><t>Puso</t></is></c>
</row>
<row r="2">
<c r="A2" t="inlineStr"><is><t>Krian</t></is></c>
<c r="B2" t="inlineStr"><is><t>Sidorejo</t></is></c>
<c r="C2" t="inlineStr"><is><t>Wereng</t></is></c>
<c r="D2"><v>1</v></c>
<c r="E2"><v>2.5</v></c>
<c r="F2"><v>1</v></c>
<c r="G2"><v>0</v></c>
</row>
<row r="3">
<c r="A3" t="inlineStr"><is><t>Balongbendo</t></is></c>
<c r="B3" t="inlineStr"><is><t>Bakung</t></is></c>
<c r="C3" t="inlineStr"><is><t>Tikus</t></is></c>
<c r="D3" t="inlineStr"><is><t>Februari</t></is></c>
<c r="E3"><v>4</v></c>
<c r="F3"><v>3</v></c>
</row>
</sheetData>
</worksheet>"#;

    fn write_workbook(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip_writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for (name, contents) in [
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", SHEET_XML),
        ] {
            zip_writer.start_file(name, options).unwrap();
            zip_writer.write_all(contents.as_bytes()).unwrap();
        }
        zip_writer.finish().unwrap();
    }

    #[test]
    fn reads_first_worksheet_into_observations() {
        let tmp = std::env::temp_dir().join("opt_map_xlsx_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("opt.xlsx");
        write_workbook(&path);

        let table = read_first_sheet(&path).unwrap();
        assert_eq!(table.headers[0], "Kecamatan");
        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][3], "1");

        let observations = crate::load_observations(&path).unwrap();
        assert_eq!(observations.len(), 2);

        let first = &observations[0];
        assert_eq!(first.bulan.as_deref(), Some("1"));
        assert_eq!(first.serangan, Some(2.5));
        assert_eq!(first.pengendalian, Some(1.0));
        assert_eq!(first.puso, Some(0.0));
        assert_eq!(first.key.desa.as_deref(), Some("SIDOREJO"));
        assert_eq!(first.key.kecamatan.as_deref(), Some("KRIAN"));

        let second = &observations[1];
        assert_eq!(second.opt.as_deref(), Some("Tikus"));
        assert_eq!(second.bulan.as_deref(), Some("Februari"));
        assert_eq!(second.serangan, Some(4.0));
        assert_eq!(second.puso, None);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_workbook_is_a_spreadsheet_error() {
        let err = read_first_sheet(Path::new("does/not/exist.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet(_)));
    }
}
