// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const ALLOWED_DOCUMENT_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "png", "jpg", "jpeg"];
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Client-side form failures. These are reported before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("email must contain '@'")]
    InvalidEmail,
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("file not found: {}", .0.display())]
    FileMissing(PathBuf),
    #[error("file type .{0} is not allowed (use pdf, doc, docx, png, jpg or jpeg)")]
    UnsupportedExtension(String),
    #[error("file is {size} bytes; the limit is {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::Required("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasswordChangeForm {
    pub current: String,
    pub new_password: String,
    pub confirmation: String,
}

impl PasswordChangeForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.current.is_empty() {
            return Err(ValidationError::Required("current password"));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.new_password != self.confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

/// A file chosen for upload. `size` is `None` when the file could not be
/// found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub path: PathBuf,
    pub title: String,
    pub size: Option<u64>,
}

impl DocumentUpload {
    pub fn inspect(path: impl AsRef<Path>, title: impl Into<String>) -> Self {
        let path = path.as_ref().to_path_buf();
        let size = std::fs::metadata(&path)
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len());
        Self {
            path,
            title: title.into(),
            size,
        }
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn validate(&self, max_bytes: u64) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Required("title"));
        }
        let Some(size) = self.size else {
            return Err(ValidationError::FileMissing(self.path.clone()));
        };
        let extension = self.extension().unwrap_or_default();
        if !ALLOWED_DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ValidationError::UnsupportedExtension(extension));
        }
        if size > max_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: max_bytes,
            });
        }
        Ok(())
    }
}
