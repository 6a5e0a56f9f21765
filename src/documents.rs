//! Local filtering and sorting for the document-history sidebar. The list
//! itself comes from GET /documents; everything here is pure and in-memory.

use crate::types::DocumentSummary;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Timestamp,
    Filename,
    DocumentType,
    Confidence,
}

impl SortKey {
    /// Lenient parse of the UI's sort selector; unknown values fall back to
    /// newest-first.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "filename" | "name" => SortKey::Filename,
            "type" | "document_type" => SortKey::DocumentType,
            "confidence" => SortKey::Confidence,
            _ => SortKey::Timestamp,
        }
    }
}

/// Case-insensitive substring match over filename and document type. An empty
/// query keeps everything.
pub fn filter_documents(documents: &[DocumentSummary], query: &str) -> Vec<DocumentSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return documents.to_vec();
    }
    documents
        .iter()
        .filter(|doc| {
            doc.filename.to_lowercase().contains(&needle)
                || doc
                    .document_type
                    .as_deref()
                    .map(|t| t.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Sort in place: timestamp and confidence descending, filename and type
/// lexicographic. Documents missing the sort field go last.
pub fn sort_documents(documents: &mut [DocumentSummary], key: SortKey) {
    match key {
        SortKey::Timestamp => documents.sort_by(|a, b| desc_option(&a.timestamp, &b.timestamp)),
        SortKey::Confidence => documents.sort_by(|a, b| {
            match (a.confidence, b.confidence) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortKey::Filename => {
            documents.sort_by(|a, b| a.filename.to_lowercase().cmp(&b.filename.to_lowercase()))
        }
        SortKey::DocumentType => documents.sort_by(|a, b| {
            asc_option(&a.document_type, &b.document_type)
        }),
    }
}

fn desc_option(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn asc_option(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(
        id: &str,
        filename: &str,
        doc_type: Option<&str>,
        timestamp: Option<&str>,
        confidence: Option<f64>,
    ) -> DocumentSummary {
        DocumentSummary {
            id: id.to_string(),
            filename: filename.to_string(),
            document_type: doc_type.map(String::from),
            timestamp: timestamp.map(String::from),
            confidence,
            page_count: None,
        }
    }

    fn sample() -> Vec<DocumentSummary> {
        vec![
            doc(
                "1",
                "residence.pdf",
                Some("إفادة سكن"),
                Some("2024-03-01T09:00:00"),
                Some(72.0),
            ),
            doc(
                "2",
                "Contract.pdf",
                Some("وثيقة قانونية"),
                Some("2024-05-01T09:00:00"),
                Some(91.0),
            ),
            doc("3", "ownership.jpg", Some("شهادة ملكية"), None, None),
        ]
    }

    #[test]
    fn filter_matches_filename_and_type() {
        let docs = sample();
        assert_eq!(filter_documents(&docs, "contract").len(), 1);
        assert_eq!(filter_documents(&docs, "سكن").len(), 1);
        assert_eq!(filter_documents(&docs, "").len(), 3);
        assert!(filter_documents(&docs, "nothing").is_empty());
    }

    #[test]
    fn filtered_count_matches_filtered_set() {
        let docs = sample();
        let filtered = filter_documents(&docs, ".pdf");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn timestamp_sort_is_newest_first_with_missing_last() {
        let mut docs = sample();
        sort_documents(&mut docs, SortKey::Timestamp);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn confidence_sort_is_descending_with_missing_last() {
        let mut docs = sample();
        sort_documents(&mut docs, SortKey::Confidence);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn filename_sort_is_case_insensitive_lexicographic() {
        let mut docs = sample();
        sort_documents(&mut docs, SortKey::Filename);
        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["Contract.pdf", "ownership.jpg", "residence.pdf"]);
    }

    #[test]
    fn sort_key_parse_is_lenient() {
        assert_eq!(SortKey::parse("Filename"), SortKey::Filename);
        assert_eq!(SortKey::parse("type"), SortKey::DocumentType);
        assert_eq!(SortKey::parse("confidence"), SortKey::Confidence);
        assert_eq!(SortKey::parse("anything"), SortKey::Timestamp);
    }
}
