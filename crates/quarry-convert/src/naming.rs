//! Output artifact names derived from source keys.

use quarry_rdf::RdfFormat;
use quarry_storage::strip_gzip;

/// Extension of record-per-line sources.
pub const RECORD_PER_LINE_SUFFIX: &str = ".jsonl";

/// Appended to an output name to name its deletion list.
pub const DELETION_LIST_SUFFIX: &str = "_delete.txt.gz";

/// Whether `key` holds one record per line, ignoring compression.
#[must_use]
pub fn is_record_per_line(key: &str) -> bool {
    strip_gzip(key).ends_with(RECORD_PER_LINE_SUFFIX)
}

/// Name of the RDF document produced from `key`.
///
/// `pubs/part-1.jsonl.gz` with TriG and compression becomes
/// `pubs/part-1.trig.gz`.
#[must_use]
pub fn output_name(key: &str, format: RdfFormat, compressed: bool) -> String {
    let stem = strip_gzip(key);
    let stem = stem.strip_suffix(RECORD_PER_LINE_SUFFIX).unwrap_or(stem);
    let mut name = format!("{stem}.{}", format.file_extension());
    if compressed {
        name.push_str(quarry_storage::files::GZIP_SUFFIX);
    }
    name
}

#[must_use]
pub fn deletion_list_name(output_name: &str) -> String {
    format!("{output_name}{DELETION_LIST_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_files() {
        assert!(is_record_per_line("a/b.jsonl"));
        assert!(is_record_per_line("a/b.jsonl.gz"));
        assert!(!is_record_per_line("a/b.json"));
        assert!(!is_record_per_line("a/b.jsonl.bak"));
    }

    #[test]
    fn output_names() {
        assert_eq!(output_name("pubs/p-1.jsonl.gz", RdfFormat::TriG, true), "pubs/p-1.trig.gz");
        assert_eq!(output_name("pubs/p-1.jsonl", RdfFormat::NQuads, false), "pubs/p-1.nq");
        assert_eq!(output_name("doc.json", RdfFormat::NQuads, false), "doc.json.nq");
    }

    #[test]
    fn deletion_list_sits_beside_output() {
        assert_eq!(deletion_list_name("pubs/p-1.trig.gz"), "pubs/p-1.trig.gz_delete.txt.gz");
    }
}
