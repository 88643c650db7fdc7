use axum::{
    extract::{Path, State},
    response::Html,
};

use crate::{ApiError, AppState, CertificationService, Document, escape_html};

/// Read-only page telling a third party whether `hash` is on the ledger.
#[tracing::instrument(skip(app_state))]
pub async fn verify_page(
    State(app_state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Html<String>, ApiError> {
    let on_chain = app_state.ledger.verify(&hash).await;
    let document = app_state.documents.get_document_by_hash(&hash).await?;

    Ok(Html(render(&hash, on_chain, document.as_ref())))
}

fn render(hash: &str, on_chain: bool, document: Option<&Document>) -> String {
    let (class, heading, summary) = if on_chain {
        (
            "valid",
            "Document Verified",
            "This document has been recorded on the ledger.",
        )
    } else {
        (
            "invalid",
            "Invalid Document",
            "This document could not be found on the ledger.",
        )
    };

    let details = document.map_or_else(String::new, |document| {
        let status = if document.verified {
            "verified by an administrator"
        } else {
            "awaiting administrator review"
        };
        format!(
            "<dl>\
             <dt>Type</dt><dd>{}</dd>\
             <dt>Status</dt><dd>{status}</dd>\
             <dt>Submitted</dt><dd>{}</dd>\
             </dl>",
            escape_html(&document.document_type),
            document.created_at.date(),
        )
    });

    format!(
        "<!DOCTYPE html>\
         <html lang=\"en\">\
         <head><meta charset=\"utf-8\"><title>Document Verification</title></head>\
         <body>\
         <main class=\"{class}\">\
         <h1>{heading}</h1>\
         <p>{summary}</p>\
         <p><code>{}</code></p>\
         {details}\
         </main>\
         </body>\
         </html>",
        escape_html(hash),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_hash_renders_invalid_and_escapes_input() {
        let page = render("<script>", false, None);
        assert!(page.contains("Invalid Document"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }
}
