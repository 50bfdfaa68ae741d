use crate::core::Document;
use std::io::{self, Write};

/// Write `documents` as a JSON array, one compact document per line.
///
/// ```text
/// [
///   {"@rid":"#1:0","name":"a"},
///   {"@rid":"#1:1","name":"b"}
/// ]
/// ```
///
/// An empty result is written as `[]`.
pub fn write_documents(out: &mut dyn Write, documents: &[Document]) -> io::Result<()> {
    if documents.is_empty() {
        return writeln!(out, "[]");
    }

    writeln!(out, "[")?;
    let last = documents.len() - 1;
    for (i, document) in documents.iter().enumerate() {
        let separator = if i < last { "," } else { "" };
        writeln!(out, "  {}{}", document.to_json(), separator)?;
    }
    writeln!(out, "]")
}
