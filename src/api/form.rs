// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

//! Multipart form collection. Every mutating endpoint takes multipart form
//! data; this buffers text fields and file parts so handlers can distinguish
//! absent fields from empty ones.

use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::ApiError;

#[derive(Debug)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::BadRequest("Malformed form data".to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name() {
                let file_name = file_name.to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Malformed form data".to_string()))?;
                form.files.push(UploadedFile {
                    field: name,
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Malformed form data".to_string()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Text field value; `None` when the field was never sent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// First uploaded file under the given field name.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|file| file.field == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "XFORMBOUNDARY";

    fn multipart_request(body: String) -> Request<Body> {
        Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn parse(body: String) -> FormData {
        let multipart = Multipart::from_request(multipart_request(body), &())
            .await
            .unwrap();
        FormData::from_multipart(multipart).await.unwrap()
    }

    #[test]
    fn collects_text_fields_and_files() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             content-disposition: form-data; name=\"product_name\"\r\n\r\n\
             Cola\r\n\
             --{BOUNDARY}\r\n\
             content-disposition: form-data; name=\"image\"; filename=\"cola.png\"\r\n\
             content-type: image/png\r\n\r\n\
             rawbytes\r\n\
             --{BOUNDARY}--\r\n"
        );

        tokio_test::block_on(async {
            let form = parse(body).await;
            assert_eq!(form.get("product_name"), Some("Cola"));
            let file = form.file("image").unwrap();
            assert_eq!(file.file_name, "cola.png");
            assert_eq!(file.bytes, b"rawbytes".to_vec());
        });
    }

    #[test]
    fn absent_and_empty_fields_are_distinguished() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             content-disposition: form-data; name=\"email\"\r\n\r\n\
             \r\n\
             --{BOUNDARY}--\r\n"
        );

        tokio_test::block_on(async {
            let form = parse(body).await;
            assert_eq!(form.get("email"), Some(""));
            assert_eq!(form.get("username"), None);
            assert!(form.file("image").is_none());
        });
    }
}
