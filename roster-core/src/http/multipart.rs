//! multipart/form-data upload parsing.

use crate::{Error, Result};
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    /// First part carrying a non-empty filename.
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

pub async fn parse_upload(content_type: Option<&str>, body: Bytes) -> Result<UploadForm> {
    let content_type = content_type.ok_or_else(|| Error::invalid("No file part in the request"))?;
    let boundary =
        multer::parse_boundary(content_type).map_err(|_| {
            Error::invalid("Request must be multipart/form-data")
        })?;

    let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let bytes = field.bytes().await.map_err(malformed)?;
                if form.file.is_none() && !filename.is_empty() {
                    form.file = Some(UploadedFile { filename, bytes });
                }
            }
            None => {
                let text = field.text().await.map_err(malformed)?;
                form.fields.insert(name, text);
            }
        }
    }
    Ok(form)
}

fn malformed(e: multer::Error) -> Error {
    Error::invalid(format!("Malformed multipart body: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-ROSTER-BOUNDARY";

    fn body(parts: &[(&str, Option<&str>, &str)]) -> Bytes {
        let mut out = String::new();
        for (name, filename, content) in parts {
            out.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(f) => out.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: text/csv\r\n\r\n",
                    name, f
                )),
                None => out.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            out.push_str(content);
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{}--\r\n", BOUNDARY));
        Bytes::from(out)
    }

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    #[tokio::test]
    async fn test_parses_file_and_fields() {
        let payload = body(&[
            ("mapping_uuid", None, "abc"),
            ("file", Some("roster.csv"), "Name\nAda\n"),
        ]);
        let form = parse_upload(Some(&content_type()), payload).await.unwrap();
        let file = form.file.unwrap();
        assert_eq!(file.filename, "roster.csv");
        assert_eq!(&file.bytes[..], b"Name\nAda\n");
        assert_eq!(form.fields["mapping_uuid"], "abc");
    }

    #[tokio::test]
    async fn test_empty_filename_is_no_file() {
        let payload = body(&[("file", Some(""), "")]);
        let form = parse_upload(Some(&content_type()), payload).await.unwrap();
        assert!(form.file.is_none());
    }

    #[tokio::test]
    async fn test_non_multipart_rejected() {
        let err = parse_upload(Some("application/json"), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
