//! Part document/attachment endpoints.
//!
//! Uploads are two-step: create the document record, then PUT the raw
//! content with a type inferred from the filename.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::{ApiClient, ApiRequest, RequestBody};
use crate::errors::ApiError;
use crate::model::{Document, DocumentKind};

#[derive(Debug, Clone, Serialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub kind: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// External URL; only meaningful for `DocumentKind::Link`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ApiClient {
    pub async fn list_documents(&self, part_id: Uuid) -> Result<Vec<Document>, ApiError> {
        self.request(ApiRequest::new(
            "GET",
            format!("/api/parts/{}/documents", part_id),
        ))
        .await
    }

    pub async fn create_document(
        &self,
        part_id: Uuid,
        req: &CreateDocumentRequest,
    ) -> Result<Document, ApiError> {
        self.request(ApiRequest::json(
            "POST",
            format!("/api/parts/{}/documents", part_id),
            json!(req),
        ))
        .await
    }

    /// Upload the binary content of a previously created document.
    pub async fn upload_document_content(
        &self,
        part_id: Uuid,
        document_id: Uuid,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<Document, ApiError> {
        let content_type = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        self.request(ApiRequest {
            method: "PUT",
            path: format!("/api/parts/{}/documents/{}/content", part_id, document_id),
            body: RequestBody::Bytes { content_type, data },
        })
        .await
    }

    pub async fn delete_document(&self, part_id: Uuid, document_id: Uuid) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new(
            "DELETE",
            format!("/api/parts/{}/documents/{}", part_id, document_id),
        ))
        .await
    }

    /// Make a document the part's cover image.
    pub async fn set_cover_document(
        &self,
        part_id: Uuid,
        document_id: Uuid,
    ) -> Result<(), ApiError> {
        self.request_empty(ApiRequest::new(
            "POST",
            format!("/api/parts/{}/documents/{}/cover", part_id, document_id),
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_is_guessed_from_filename() {
        let guess = mime_guess::from_path("datasheet.pdf").first_or_octet_stream();
        assert_eq!(guess.essence_str(), "application/pdf");
        let fallback = mime_guess::from_path("noext").first_or_octet_stream();
        assert_eq!(fallback.essence_str(), "application/octet-stream");
    }
}
