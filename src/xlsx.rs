//! Reader for Office Open XML workbooks (`.xlsx`).
//!
//! Only what the cleaner needs is decoded: sheet order and names, cell text
//! (shared strings, inline strings, booleans, raw numbers, formula results)
//! and merged ranges. Styles and number formats are not applied; numeric
//! cells yield the value stored in the file, rounded to 15 significant
//! digits the way spreadsheet applications show a General-format number.

use crate::error::{CleanerError, Result};
use crate::workbook::{CellRef, MergeRegion, Sheet, Workbook, MAX_ROWS};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Opens a workbook file from disk.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let file = File::open(path)?;
    read(BufReader::new(file))
}

/// Reads a workbook held in memory.
pub fn from_bytes(bytes: &[u8]) -> Result<Workbook> {
    read(Cursor::new(bytes))
}

/// Reads a workbook from any seekable source.
pub fn read<R: Read + Seek>(reader: R) -> Result<Workbook> {
    let mut archive = ZipArchive::new(reader)?;

    let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?.ok_or_else(|| {
        CleanerError::MissingPart {
            part: WORKBOOK_PART.to_string(),
            message: "not an xlsx workbook".to_string(),
        }
    })?;
    let entries = parse_sheet_entries(&workbook_xml)?;

    let targets = match read_part(&mut archive, WORKBOOK_RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let shared_strings = match read_part(&mut archive, SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let mut sheets = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let part = entry
            .rel_id
            .as_ref()
            .and_then(|id| targets.get(id))
            .map(|target| resolve_target(target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position + 1));

        let xml = read_part(&mut archive, &part)?.ok_or_else(|| CleanerError::MissingPart {
            part: part.clone(),
            message: format!("worksheet for sheet {:?} not found", entry.name),
        })?;
        let sheet = parse_worksheet(&entry.name, &xml, &shared_strings)?;
        debug!(
            "Loaded sheet {:?} from {} ({} rows, {} merged ranges)",
            entry.name,
            part,
            sheet.row_count(),
            sheet.merge_regions().len()
        );
        sheets.push(sheet);
    }

    Ok(Workbook::new(sheets))
}

/// Reads a zip member as UTF-8 text, or `None` if the member is absent.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Maps a relationship target to a zip member name.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if let Some(parent) = target.strip_prefix("../") {
        parent.to_string()
    } else {
        format!("xl/{}", target)
    }
}

#[derive(Debug)]
struct SheetEntry {
    name: String,
    rel_id: Option<String>,
}

fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_sheet_entries(xml: &str) -> Result<Vec<SheetEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sheet" => {
                let name = attribute(e, b"name")?.unwrap_or_default();
                // r:id is the only "id" attribute on <sheet>; sheetId has a
                // different local name.
                let rel_id = attribute(e, b"id")?;
                entries.push(SheetEntry { name, rel_id });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) =
                    (attribute(e, b"Id")?, attribute(e, b"Target")?)
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

/// Parses the shared strings table. Rich-text runs are concatenated;
/// phonetic hints are dropped.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Event::Text(ref t) if in_t && !in_phonetic => {
                current.push_str(&t.unescape()?);
            }
            Event::CData(ref c) if in_t && !in_phonetic => {
                current.push_str(&String::from_utf8_lossy(c));
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Cell under construction while its child elements are read.
#[derive(Debug, Default)]
struct PendingCell {
    at: Option<CellRef>,
    kind: Option<String>,
    value: String,
    inline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Inline,
}

fn parse_worksheet(name: &str, xml: &str, shared_strings: &[String]) -> Result<Sheet> {
    let mut reader = Reader::from_str(xml);
    let mut sheet = Sheet::new(name);

    let mut next_row = 0usize;
    let mut current_row = 0usize;
    let mut next_col = 0usize;
    let mut pending: Option<PendingCell> = None;
    let mut target = TextTarget::None;
    let mut in_phonetic = false;

    let invalid_ref = |reference: String| CleanerError::InvalidCellRef {
        sheet: name.to_string(),
        reference,
    };

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"row" => {
                        current_row = match attribute(e, b"r")? {
                            Some(r) => match r.trim().parse::<usize>() {
                                Ok(n) if n > 0 && n <= MAX_ROWS => n - 1,
                                _ => return Err(invalid_ref(r)),
                            },
                            None => next_row,
                        };
                        next_row = current_row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let at = match attribute(e, b"r")? {
                            Some(r) => CellRef::parse(&r).ok_or_else(|| invalid_ref(r))?,
                            None => CellRef::new(current_row, next_col).ok_or_else(|| {
                                invalid_ref(format!("R{}C{}", current_row + 1, next_col + 1))
                            })?,
                        };
                        next_col = at.col + 1;
                        let cell = PendingCell {
                            at: Some(at),
                            kind: attribute(e, b"t")?,
                            ..PendingCell::default()
                        };
                        if is_empty {
                            finish_cell(&mut sheet, cell, shared_strings)?;
                        } else {
                            pending = Some(cell);
                        }
                    }
                    b"v" if !is_empty && pending.is_some() => target = TextTarget::Value,
                    b"t" if !is_empty && pending.is_some() => target = TextTarget::Inline,
                    b"rPh" if !is_empty => in_phonetic = true,
                    b"mergeCell" => {
                        if let Some(range) = attribute(e, b"ref")? {
                            let region =
                                MergeRegion::parse(&range).ok_or_else(|| invalid_ref(range))?;
                            sheet.add_merge(region);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) if target != TextTarget::None && !in_phonetic => {
                let text = t.unescape()?;
                if let Some(cell) = pending.as_mut() {
                    match target {
                        TextTarget::Value => cell.value.push_str(&text),
                        TextTarget::Inline => cell.inline.push_str(&text),
                        TextTarget::None => {}
                    }
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => target = TextTarget::None,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        finish_cell(&mut sheet, cell, shared_strings)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheet)
}

/// Resolves a cell's stored value to display text and writes it to the sheet.
fn finish_cell(sheet: &mut Sheet, cell: PendingCell, shared_strings: &[String]) -> Result<()> {
    let Some(at) = cell.at else {
        return Ok(());
    };

    let text = match cell.kind.as_deref() {
        Some("s") => {
            if cell.value.is_empty() {
                String::new()
            } else {
                let index: usize =
                    cell.value
                        .trim()
                        .parse()
                        .map_err(|_| CleanerError::InvalidCellRef {
                            sheet: sheet.name().to_string(),
                            reference: at.to_string(),
                        })?;
                shared_strings
                    .get(index)
                    .cloned()
                    .ok_or_else(|| CleanerError::MissingPart {
                        part: SHARED_STRINGS_PART.to_string(),
                        message: format!("string index {} referenced by {} not found", index, at),
                    })?
            }
        }
        Some("inlineStr") => cell.inline,
        Some("b") => match cell.value.as_str() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        },
        None | Some("n") => general_number(cell.value),
        _ => cell.value,
    };

    sheet.set_cell(at, text);
    Ok(())
}

/// Digits shown for a General-format number.
const GENERAL_PRECISION: usize = 15;

/// Renders a stored number the way a General-format cell displays it.
///
/// Values with at most 15 significant digits are returned as stored. Longer
/// ones are rounded to 15 digits and printed like `%G`: trailing zeros
/// dropped, exponent form below `1E-04` and from `1E+15` up.
fn general_number(raw: String) -> String {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return raw;
    };
    if !value.is_finite() {
        return raw;
    }
    let plain = value.to_string();
    let digits = plain
        .trim_start_matches(['-', '0'])
        .chars()
        .filter(|c| *c != '.')
        .count();
    if digits <= GENERAL_PRECISION {
        return raw;
    }

    let scientific = format!("{:.*e}", GENERAL_PRECISION - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return raw;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return raw;
    };

    if exponent < -4 || exponent >= GENERAL_PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}E{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (GENERAL_PRECISION as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
