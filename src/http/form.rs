//! Submitted form bodies.
//!
//! Both HTML form encodings are understood: `application/x-www-form-urlencoded`
//! and `multipart/form-data`. Multipart file parts are kept apart from the
//! plain fields.

use axum::{
    body::Bytes,
    http::{header, HeaderMap},
};
use thiserror::Error;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

#[derive(Debug, Error)]
pub enum FormError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),
}

/// Encoding of a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEncoding {
    UrlEncoded,
    Multipart,
}

/// A file part of a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field the file was submitted under.
    pub name: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Parsed form fields, in submission order, plus any uploaded files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// Parse a url-encoded body.
    pub fn parse(body: &[u8]) -> Self {
        Self {
            fields: url::form_urlencoded::parse(body).into_owned().collect(),
            files: Vec::new(),
        }
    }

    /// Parse a multipart body. `content_type` must carry the boundary.
    pub async fn parse_multipart(body: Bytes, content_type: &str) -> Result<Self, FormError> {
        let boundary = multer::parse_boundary(content_type)?;
        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());

            match filename {
                Some(filename) => {
                    let data = field.bytes().await?;
                    form.files.push(UploadedFile {
                        name,
                        filename,
                        content_type,
                        data,
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.push((name, value));
                }
            }
        }
        Ok(form)
    }

    /// Parse `body` according to the request's content type.
    ///
    /// `Ok(None)` when the request is not a form submission.
    pub async fn from_body(headers: &HeaderMap, body: Bytes) -> Result<Option<Self>, FormError> {
        match form_encoding(headers) {
            Some(FormEncoding::UrlEncoded) => Ok(Some(Self::parse(&body))),
            Some(FormEncoding::Multipart) => {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                Self::parse_multipart(body, content_type).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// First value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted for `name`.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First file uploaded under `name`.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|file| file.name == name)
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Number of plain fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

/// Form encoding declared by the request's `Content-Type`, if any.
pub fn form_encoding(headers: &HeaderMap) -> Option<FormEncoding> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())?
        .trim();

    if mime.eq_ignore_ascii_case(URLENCODED) {
        Some(FormEncoding::UrlEncoded)
    } else if mime.eq_ignore_ascii_case(MULTIPART) {
        Some(FormEncoding::Multipart)
    } else {
        None
    }
}

/// True when the request declares a form body in either encoding.
pub fn is_form_content(headers: &HeaderMap) -> bool {
    form_encoding(headers).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const UPLOAD: &str = "--XyZ\r\n\
        Content-Disposition: form-data; name=\"_method\"\r\n\r\n\
        PUT\r\n\
        --XyZ\r\n\
        Content-Disposition: form-data; name=\"title\"\r\n\r\n\
        hi\r\n\
        --XyZ\r\n\
        Content-Disposition: form-data; name=\"cover\"; filename=\"cover.txt\"\r\n\
        Content-Type: text/plain\r\n\r\n\
        front page\r\n\
        --XyZ--\r\n";

    #[test]
    fn test_parse_and_lookup() {
        let form = FormData::parse(b"_method=put&tag=a&tag=b&title=caf%C3%A9");
        assert_eq!(form.get("_method"), Some("put"));
        assert_eq!(form.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(form.get("title"), Some("café"));
        assert_eq!(form.get("missing"), None);
        assert_eq!(form.len(), 4);
    }

    #[test]
    fn test_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_form_content(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("Application/X-WWW-Form-Urlencoded; charset=utf-8"),
        );
        assert_eq!(form_encoding(&headers), Some(FormEncoding::UrlEncoded));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=XyZ"),
        );
        assert_eq!(form_encoding(&headers), Some(FormEncoding::Multipart));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_form_content(&headers));
    }

    #[tokio::test]
    async fn test_multipart_fields_and_files() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=XyZ"),
        );

        let form = FormData::from_body(&headers, Bytes::from_static(UPLOAD.as_bytes()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(form.get("_method"), Some("PUT"));
        assert_eq!(form.get("title"), Some("hi"));
        assert_eq!(form.len(), 2);

        let cover = form.file("cover").unwrap();
        assert_eq!(cover.filename, "cover.txt");
        assert_eq!(cover.content_type.as_deref(), Some("text/plain"));
        assert_eq!(cover.data, Bytes::from_static(b"front page"));
    }

    #[tokio::test]
    async fn test_multipart_without_boundary_fails() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"));
        let err = FormData::from_body(&headers, Bytes::new()).await.unwrap_err();
        assert!(matches!(err, FormError::Multipart(_)));
    }
}
