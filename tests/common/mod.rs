//! Workbook fixtures shared by the integration tests.
//!
//! Builds real `.xlsx` files in memory so the tests go through the same
//! reader as production uploads.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// One worksheet of a fixture workbook.
pub struct SheetFixture {
    pub name: String,
    pub rows: Vec<Vec<String>>,
    pub merges: Vec<String>,
    pub raw_cells: Vec<(String, String)>,
}

impl SheetFixture {
    pub fn new(name: &str, rows: Vec<Vec<String>>) -> Self {
        SheetFixture {
            name: name.to_string(),
            rows,
            merges: Vec::new(),
            raw_cells: Vec::new(),
        }
    }

    pub fn with_merge(mut self, range: &str) -> Self {
        self.merges.push(range.to_string());
        self
    }

    /// Appends a number cell written verbatim at `reference`, in a row of
    /// its own after the regular rows.
    pub fn with_raw_cell(mut self, reference: &str, value: &str) -> Self {
        self.raw_cells.push((reference.to_string(), value.to_string()));
        self
    }
}

/// A 39-cell statement row. Column 38 carries a currency code so the row
/// keeps its full width when trailing blanks are dropped.
pub fn data_row(reference: &str, memo: &str, amount: &str) -> Vec<String> {
    let mut row = vec![String::new(); 39];
    row[0] = reference.to_string();
    row[24] = memo.to_string();
    row[37] = amount.to_string();
    row[38] = "EUR".to_string();
    row
}

/// 25 report-title rows, the table header, `data`, then 14 footer rows.
pub fn statement_rows(data: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for i in 0..25 {
        rows.push(vec![format!("Report line {}", i + 1)]);
    }
    rows.push(data_row("Reference", "Memo", "Amount"));
    rows.extend(data);
    for i in 0..14 {
        rows.push(vec![format!("Footnote {}", i + 1)]);
    }
    rows
}

fn column_name(mut col: usize) -> String {
    let mut letters = Vec::new();
    col += 1;
    while col > 0 {
        letters.push((b'A' + ((col - 1) % 26) as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders a worksheet. Numeric-looking values become number cells, the
/// literal "Amount" goes through the shared strings table (index 0) and
/// everything else is an inline string.
fn worksheet_xml(sheet: &SheetFixture) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in sheet.rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let at = format!("{}{}", column_name(c), r + 1);
            if value == "Amount" {
                xml.push_str(&format!(r#"<c r="{}" t="s"><v>0</v></c>"#, at));
            } else if !value.contains(',') && value.parse::<f64>().is_ok() {
                xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, at, value));
            } else {
                xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    at,
                    escape(value)
                ));
            }
        }
        xml.push_str("</row>");
    }
    for (reference, value) in &sheet.raw_cells {
        xml.push_str(&format!(r#"<row><c r="{}"><v>{}</v></c></row>"#, reference, value));
    }
    xml.push_str("</sheetData>");
    if !sheet.merges.is_empty() {
        xml.push_str(&format!(r#"<mergeCells count="{}">"#, sheet.merges.len()));
        for range in &sheet.merges {
            xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, range));
        }
        xml.push_str("</mergeCells>");
    }
    xml.push_str("</worksheet>");
    xml
}

/// Builds a complete `.xlsx` file.
pub fn build_xlsx(sheets: &[SheetFixture]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    for i in 0..sheets.len() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }
    content_types.push_str("</Types>");

    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(&sheet.name),
            i + 1,
            i + 1
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#,
        sheets.len() + 1
    ));

    let shared_strings = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1"><si><t>Amount</t></si></sst>"#;

    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types),
        ("_rels/.rels".to_string(), root_rels.to_string()),
        ("xl/workbook.xml".to_string(), workbook),
        ("xl/_rels/workbook.xml.rels".to_string(), rels),
        ("xl/sharedStrings.xml".to_string(), shared_strings.to_string()),
    ];
    for (i, sheet) in sheets.iter().enumerate() {
        parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), worksheet_xml(sheet)));
    }

    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Reads every member of a zip archive as `(name, text)` in archive order.
pub fn read_zip(bytes: &[u8]) -> Vec<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        entries.push((file.name().to_string(), content));
    }
    entries
}
