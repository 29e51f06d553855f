use crate::glossary::Glossary;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("failed to fetch glossary from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("glossary endpoint {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read glossary file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed glossary document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("glossary contains no terms")]
    Empty,
}

/// Where a glossary document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Source::Url(input.to_string())
        } else {
            Source::File(PathBuf::from(input))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load a glossary. An empty term list is an error.
pub fn load(source: &Source, timeout: Duration) -> Result<Glossary, GlossaryError> {
    let body = match source {
        Source::Url(url) => fetch(url, timeout)?,
        Source::File(path) => read_file(path)?,
    };
    parse(&body)
}

/// Load a glossary, swallowing every failure. Callers treat `None` as
/// "annotate nothing".
pub fn load_or_none(source: &Source, timeout: Duration) -> Option<Glossary> {
    match load(source, timeout) {
        Ok(glossary) => {
            debug!(%source, terms = glossary.len(), "glossary loaded");
            Some(glossary)
        }
        Err(err) => {
            debug!(%source, error = %err, "glossary unavailable, skipping annotation");
            None
        }
    }
}

pub fn parse(body: &str) -> Result<Glossary, GlossaryError> {
    let glossary: Glossary = serde_json::from_str(body)?;
    if glossary.is_empty() {
        return Err(GlossaryError::Empty);
    }
    Ok(glossary)
}

/// GET the endpoint and return the raw body.
pub fn fetch(url: &str, timeout: Duration) -> Result<String, GlossaryError> {
    let wrap = |source: reqwest::Error| GlossaryError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(wrap)?;

    let response = client.get(url).send().map_err(wrap)?;
    if !response.status().is_success() {
        return Err(GlossaryError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response.text().map_err(wrap)
}

fn read_file(path: &Path) -> Result<String, GlossaryError> {
    fs::read_to_string(path).map_err(|source| GlossaryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_secs(1);

    /// Answer the next `requests` connections with a canned HTTP response.
    fn serve(status: &str, body: &str, requests: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/glossary.json", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 512];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        url
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.org/glossary.json"),
            Source::Url("https://example.org/glossary.json".to_string())
        );
        assert_eq!(
            Source::parse("terms.json"),
            Source::File(PathBuf::from("terms.json"))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glossary.json");
        fs::write(&path, r#"{"terms":[{"aliases":["hit"],"defn":"A"}]}"#).unwrap();

        let glossary = load(&Source::File(path), TIMEOUT).unwrap();
        assert_eq!(glossary.terms[0].definition, "A");
    }

    #[test]
    fn test_failures_are_silent() {
        let dir = tempdir().unwrap();

        let malformed = dir.path().join("bad.json");
        fs::write(&malformed, "{ not json").unwrap();
        assert!(load_or_none(&Source::File(malformed.clone()), TIMEOUT).is_none());
        assert!(matches!(
            load(&Source::File(malformed), TIMEOUT),
            Err(GlossaryError::Malformed(_))
        ));

        let empty = dir.path().join("empty.json");
        fs::write(&empty, r#"{"terms":[]}"#).unwrap();
        assert!(matches!(
            load(&Source::File(empty), TIMEOUT),
            Err(GlossaryError::Empty)
        ));

        let missing = dir.path().join("missing.json");
        assert!(load_or_none(&Source::File(missing), TIMEOUT).is_none());
    }

    #[test]
    fn test_fetch_from_endpoint() {
        let url = serve(
            "200 OK",
            r#"{"terms":[{"aliases":["on-hit","onhit"],"defn":"B","cs":null,"ww":true}]}"#,
            1,
        );

        let glossary = load(&Source::parse(&url), TIMEOUT).unwrap();
        assert_eq!(glossary.len(), 1);
        assert_eq!(glossary.terms[0].aliases, vec!["on-hit", "onhit"]);
        assert_eq!(glossary.terms[0].definition, "B");
        assert!(glossary.terms[0].whole_word);
    }

    #[test]
    fn test_error_status_is_silent() {
        let url = serve("404 Not Found", "{}", 2);
        let source = Source::parse(&url);

        assert!(matches!(
            load(&source, TIMEOUT),
            Err(GlossaryError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
        assert!(load_or_none(&source, TIMEOUT).is_none());
    }

    #[test]
    fn test_unreachable_endpoint_is_silent() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let source = Source::Url("http://127.0.0.1:9/glossary.json".to_string());
        assert!(load_or_none(&source, TIMEOUT).is_none());
    }
}
