//! Document search: one search call, then per-document details in parallel.

use advising_core::grouping::group_sections_by_document;
use advising_core::types::{Document, DocumentSection};
use futures_util::future::join_all;
use tracing::warn;

use crate::error::FetchError;
use crate::service::AdvisingService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHits {
    pub document_id: i64,
    /// Missing when the details lookup failed.
    pub document: Option<Document>,
    pub sections: Vec<DocumentSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub query: String,
    pub documents: Vec<DocumentHits>,
}

impl SearchResults {
    pub fn section_count(&self) -> usize {
        self.documents.iter().map(|d| d.sections.len()).sum()
    }
}

pub async fn search_documents(
    service: &AdvisingService,
    query: &str,
) -> Result<SearchResults, FetchError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(SearchResults::default());
    }

    let sections = service.search(query).await?;
    let grouped = group_sections_by_document(&sections);

    let lookups = grouped.keys().map(|&id| async move {
        match service.get_document(id).await {
            Ok(details) => Some(details.document()),
            Err(err) => {
                warn!(document_id = id, error = %err, "document details unavailable");
                None
            }
        }
    });
    let documents = join_all(lookups).await;

    let documents = grouped
        .into_iter()
        .zip(documents)
        .map(|((document_id, sections), document)| DocumentHits {
            document_id,
            document,
            sections: sections.into_iter().cloned().collect(),
        })
        .collect();

    Ok(SearchResults {
        query: query.to_string(),
        documents,
    })
}
