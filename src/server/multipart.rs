//! Minimal `multipart/form-data` parsing for buffered request bodies

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    #[error("content type is not multipart/form-data with a boundary")]
    MissingBoundary,

    #[error("malformed multipart body: {0}")]
    Malformed(&'static str),
}

/// One form field. `data` borrows from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: &'a [u8],
}

impl Part<'_> {
    /// Media type without parameters, lowercased.
    pub fn mime_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Extract the boundary from a `Content-Type` header value.
pub fn boundary(content_type: &str) -> Result<String, MultipartError> {
    let mut params = content_type.split(';');
    let media_type = params.next().unwrap_or_default().trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::MissingBoundary);
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| unquote(value.trim()).to_string())
        .filter(|value| !value.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Split `body` into its parts.
pub fn parse<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<Part<'a>>, MultipartError> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();
    let close = [&b"\r\n"[..], delimiter].concat();

    let start = find_pattern(body, delimiter).ok_or(MultipartError::Malformed("no boundary"))?;
    let mut rest = &body[start + delimiter.len()..];
    let mut parts = Vec::new();

    loop {
        if rest.starts_with(b"--") {
            return Ok(parts);
        }

        let line_end =
            find_pattern(rest, b"\r\n").ok_or(MultipartError::Malformed("unterminated boundary"))?;
        rest = &rest[line_end + 2..];

        let headers_end =
            find_pattern(rest, b"\r\n\r\n").ok_or(MultipartError::Malformed("unterminated headers"))?;
        let headers = std::str::from_utf8(&rest[..headers_end])
            .map_err(|_| MultipartError::Malformed("non-UTF-8 part headers"))?;
        rest = &rest[headers_end + 4..];

        let data_end = find_pattern(rest, &close).ok_or(MultipartError::Malformed("missing closing boundary"))?;
        parts.push(part_from_headers(headers, &rest[..data_end]));
        rest = &rest[data_end + close.len()..];
    }
}

/// First part with the given field name.
pub fn find_field<'p, 'a>(parts: &'p [Part<'a>], name: &str) -> Option<&'p Part<'a>> {
    parts.iter().find(|part| part.name.as_deref() == Some(name))
}

fn part_from_headers<'a>(headers: &str, data: &'a [u8]) -> Part<'a> {
    let mut part = Part {
        name: None,
        filename: None,
        content_type: None,
        data,
    };

    for line in headers.split("\r\n") {
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        if field.trim().eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                match param.split_once('=') {
                    Some((key, v)) if key.trim().eq_ignore_ascii_case("name") => {
                        part.name = Some(unquote(v.trim()).to_string());
                    }
                    Some((key, v)) if key.trim().eq_ignore_ascii_case("filename") => {
                        part.filename = Some(unquote(v.trim()).to_string());
                    }
                    _ => {}
                }
            }
        } else if field.trim().eq_ignore_ascii_case("content-type") {
            part.content_type = Some(value.to_string());
        }
    }

    part
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Find a byte pattern in a slice
fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
