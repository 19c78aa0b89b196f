use crate::{
    error::{AppError, AppResult},
    models::{attachment, Attachment, AttachmentModel, CaseModel, UserModel},
    services::lifecycle::STATUS_RESOLVED,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
}

const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10 MB
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Who is attaching evidence to the case.
pub enum Uploader<'a> {
    Officer(&'a UserModel),
    Reporter,
}

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        "application/pdf" => data.len() >= 5 && &data[..5] == b"%PDF-",
        _ => false,
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}

/// Evidence files for a case. The binary is written to the upload volume
/// first; the metadata row only exists once the bytes are durably stored,
/// so a failed upload leaves no dangling record.
pub struct AttachmentService {
    db: DatabaseConnection,
}

impl AttachmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn store(
        &self,
        config: &UploadConfig,
        case: &CaseModel,
        data: &[u8],
        content_type: &str,
        original_name: &str,
        uploader: Uploader<'_>,
    ) -> AppResult<AttachmentModel> {
        if case.status == STATUS_RESOLVED {
            return Err(AppError::InvalidState(
                "Case is resolved; no further evidence can be attached".to_string(),
            ));
        }

        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge);
        }

        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}. Allowed: jpeg, png, gif, webp, pdf",
                content_type
            )));
        }

        if !validate_magic_bytes(data, content_type) {
            return Err(AppError::Validation(
                "File content does not match declared content type".to_string(),
            ));
        }

        let ext = extension_for(content_type)
            .ok_or_else(|| AppError::Validation("Unsupported file type".to_string()))?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
        let dir = Path::new(&config.upload_dir).join("cases");

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::ExternalService(format!("Failed to create upload directory: {}", e))
        })?;

        let file_path = dir.join(&stored_name);
        fs::write(&file_path, data)
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to store file: {}", e)))?;

        let (uploaded_by_id, uploaded_by_name) = match uploader {
            Uploader::Officer(user) => (Some(user.id), user.name.clone()),
            Uploader::Reporter => (None, "Reporter".to_string()),
        };

        let now = chrono::Utc::now().naive_utc();
        let model = attachment::ActiveModel {
            case_id: sea_orm::ActiveValue::Set(case.id),
            url: sea_orm::ActiveValue::Set(format!("/uploads/cases/{}", stored_name)),
            file_name: sea_orm::ActiveValue::Set(original_name.to_string()),
            file_type: sea_orm::ActiveValue::Set(content_type.to_string()),
            uploaded_by_id: sea_orm::ActiveValue::Set(uploaded_by_id),
            uploaded_by_name: sea_orm::ActiveValue::Set(uploaded_by_name),
            uploaded_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("store_attachment", e))?;
        Ok(saved)
    }

    pub async fn list(&self, case_id: i32) -> AppResult<Vec<AttachmentModel>> {
        let attachments = Attachment::find()
            .filter(attachment::Column::CaseId.eq(case_id))
            .order_by_asc(attachment::Column::UploadedAt)
            .all(&self.db)
            .await?;
        Ok(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic_bytes_valid() {
        assert!(validate_magic_bytes(b"%PDF-1.7 rest", "application/pdf"));
        assert!(!validate_magic_bytes(b"PDF-1.7", "application/pdf"));
    }

    #[test]
    fn jpeg_magic_bytes_valid() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1];
        assert!(validate_magic_bytes(&data, "image/jpeg"));
    }

    #[test]
    fn mismatched_type_rejected() {
        let png = [0x89, 0x50, 0x4E, 0x47];
        assert!(!validate_magic_bytes(&png, "image/jpeg"));
        assert!(!validate_magic_bytes(&png, "application/pdf"));
    }

    #[test]
    fn truncated_data_rejected() {
        assert!(!validate_magic_bytes(&[0xFF, 0xD8], "image/jpeg"));
        assert!(!validate_magic_bytes(b"%PDF", "application/pdf"));
        assert!(!validate_magic_bytes(&[], "image/png"));
    }

    #[test]
    fn unknown_content_type_has_no_extension() {
        assert_eq!(extension_for("application/zip"), None);
        assert_eq!(extension_for("application/pdf"), Some("pdf"));
    }
}
