// Product catalog CSV
// One row per part; the indexer turns rows into stored records


pub mod sample;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::database::PartMetadata;
use crate::{PartsError, Result};

pub const DEFAULT_CATALOG_FILE: &str = "partselect_products.csv";

const HEADER: [&str; 5] = ["category", "part_number", "title", "description", "url"];

/// One catalog row, part number already normalized to upper case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub category: String,
    pub part_number: String,
    pub title: String,
    pub description: String,
    pub url: String,
}

impl CatalogEntry {
    #[inline]
    pub fn into_metadata(self, indexed_at: &str) -> PartMetadata {
        PartMetadata {
            part_number: self.part_number,
            category: self.category,
            title: self.title,
            description: self.description,
            url: self.url,
            indexed_at: indexed_at.to_string(),
        }
    }
}

struct Columns {
    category: usize,
    part_number: usize,
    title: usize,
    description: usize,
    url: Option<usize>,
}

impl Columns {
    fn from_header(fields: &[String]) -> Result<Self> {
        let names: Vec<String> = fields
            .iter()
            .map(|name| name.trim().to_lowercase())
            .collect();

        let find = |column: &str| names.iter().position(|name| name == column);
        let require = |column: &str| {
            find(column).ok_or_else(|| {
                PartsError::Catalog(format!("Missing required column '{}' in header", column))
            })
        };

        Ok(Self {
            category: require("category")?,
            part_number: require("part_number")?,
            title: require("title")?,
            description: require("description")?,
            url: find("url"),
        })
    }
}

/// Parse catalog text with a header row.
///
/// Line numbers in errors count the header as line 1 and name the first
/// physical line of the offending record.
#[inline]
pub fn parse_catalog(text: &str) -> Result<Vec<CatalogEntry>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = csv_records(text)?.into_iter();

    let Some(header) = records.next() else {
        return Err(PartsError::Catalog("Catalog is empty".to_string()));
    };
    let columns = Columns::from_header(&header.fields)?;

    let mut entries = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for CsvRecord { line: line_number, fields } in records {
        let field = |index: usize| -> Result<String> {
            fields
                .get(index)
                .map(|value| value.trim().to_string())
                .ok_or_else(|| {
                    PartsError::Catalog(format!(
                        "Line {}: expected at least {} fields, found {}",
                        line_number,
                        index + 1,
                        fields.len()
                    ))
                })
        };

        let part_number = field(columns.part_number)?.to_uppercase();
        if part_number.is_empty() {
            return Err(PartsError::Catalog(format!(
                "Line {}: empty part_number",
                line_number
            )));
        }

        let description = field(columns.description)?;
        if description.is_empty() {
            return Err(PartsError::Catalog(format!(
                "Line {}: empty description for {}",
                line_number, part_number
            )));
        }

        if let Some(first) = seen.insert(part_number.clone(), line_number) {
            return Err(PartsError::Catalog(format!(
                "Line {}: duplicate part_number {} (first seen on line {})",
                line_number, part_number, first
            )));
        }

        entries.push(CatalogEntry {
            category: field(columns.category)?,
            part_number,
            title: field(columns.title)?,
            description,
            url: match columns.url {
                Some(index) => fields
                    .get(index)
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default(),
                None => String::new(),
            },
        });
    }

    debug!("Parsed {} catalog entries", entries.len());
    Ok(entries)
}

#[inline]
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let entries = parse_catalog(&text)
        .map_err(|e| PartsError::Catalog(format!("{}: {}", path.display(), e)))?;
    info!("Loaded {} parts from {}", entries.len(), path.display());
    Ok(entries)
}

/// Render entries as CSV, quoting fields that need it
#[inline]
pub fn render_catalog(entries: &[CatalogEntry]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');

    for entry in entries {
        let row = [
            entry.category.as_str(),
            entry.part_number.as_str(),
            entry.title.as_str(),
            entry.description.as_str(),
            entry.url.as_str(),
        ]
        .iter()
        .map(|field| csv_quote(field))
        .collect::<Vec<_>>()
        .join(",");
        out.push_str(&row);
        out.push('\n');
    }

    out
}

#[inline]
pub fn write_catalog<P: AsRef<Path>>(path: P, entries: &[CatalogEntry]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_catalog(entries))?;
    info!("Wrote {} parts to {}", entries.len(), path.display());
    Ok(())
}

/// One logical CSV row and the physical line it starts on
struct CsvRecord {
    line: usize,
    fields: Vec<String>,
}

/// Split CSV text into records, honouring quoted commas, doubled quotes and
/// line breaks inside quotes. Blank lines produce no record.
fn csv_records(text: &str) -> Result<Vec<CsvRecord>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if in_quotes => {
                line += 1;
                current.push(ch);
            }
            '\n' => {
                line += 1;
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, record_line, std::mem::take(&mut fields), quoted);
                quoted = false;
                record_line = line;
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(PartsError::Catalog(format!(
            "Line {}: unterminated quoted field",
            record_line
        )));
    }
    if quoted || !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        push_record(&mut records, record_line, fields, quoted);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<CsvRecord>, line: usize, fields: Vec<String>, quoted: bool) {
    let blank = !quoted && fields.len() == 1 && fields.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(CsvRecord { line, fields });
    }
}

fn csv_quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
