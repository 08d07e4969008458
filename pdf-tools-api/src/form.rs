//! Multipart form ingestion

use crate::error::AppError;
use axum::extract::Multipart;
use pdf_tools::UploadedFile;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// A fully read multipart form: file parts in arrival order plus text fields
#[derive(Debug, Default)]
pub struct Form {
    files: Vec<(String, UploadedFile)>,
    fields: HashMap<String, String>,
}

impl Form {
    /// Read every part of `multipart`. Parts sent with a filename are files;
    /// everything else is a text field.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Form::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    debug!(field = %name, %filename, size = data.len(), "Received file part");

                    let mut upload = UploadedFile::new(filename, data.to_vec());
                    upload.content_type = content_type;
                    form.files.push((name, upload));
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Remove and return every file sent under one of `names`, in order
    pub fn take_files(&mut self, names: &[&str]) -> Vec<UploadedFile> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(field, _)| names.contains(&field.as_str()));
        self.files = rest;
        taken.into_iter().map(|(_, upload)| upload).collect()
    }

    /// Remove and return the first file sent as `name`
    pub fn take_file(&mut self, name: &str) -> Result<UploadedFile, AppError> {
        let position = self
            .files
            .iter()
            .position(|(field, _)| field == name)
            .ok_or_else(|| AppError::missing_field(name))?;
        Ok(self.files.remove(position).1)
    }

    pub fn text(&self, name: &str) -> Result<&str, AppError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AppError::missing_field(name))
    }

    /// Parse text field `name`; any parse failure is reported as
    /// `Invalid <name> format`
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, AppError> {
        self.text(name)?
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_field(name))
    }
}
