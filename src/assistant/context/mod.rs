
use crate::assistant::retriever::RetrievedPart;
use crate::database::PartMetadata;

pub const EMPTY_CONTEXT: &str = "No relevant parts found.";

/// One line per part, in retrieval order
#[inline]
pub fn assemble_context(parts: &[RetrievedPart]) -> String {
    if parts.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    parts
        .iter()
        .map(|part| format_part(&part.part))
        .collect::<Vec<_>>()
        .join("\n")
}

#[inline]
pub fn format_part(part: &PartMetadata) -> String {
    format!(
        "{} ({}, part {}): {}",
        part.title, part.category, part.part_number, part.description
    )
}
