//! A reference [`RequestHandler`] — ported from the static-file path of
//! `examples/original_source/web_server/request.c`
//! (`requestParseURI`/`requestGetFiletype`/`requestServeStatic`/
//! `requestError`). Exercises the handler trait; BRD's own correctness
//! never depends on this implementation.
//!
//! CGI dynamic dispatch (`requestServeDynamic`'s `fork`/`execve`) is not
//! ported — spawning arbitrary CGI binaries is exactly the external
//! collaborator behavior out of scope here, and `fork`-without-`exec`
//! semantics have no clean `std::process` equivalent. Any CGI-shaped URI
//! (containing `cgi`) always answers `501 Not Implemented`.

use crate::error::{HandleResult, StatusCode};
use crate::fd::Fd;
use crate::handler::RequestHandler;
use crate::stats::Stats;
use memchr::memchr;
use std::fmt::Write as _;
use std::io::{self, BufRead, BufReader, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

/// Serves files rooted at `document_root`, GET-only, HTTP/1.0.
pub struct StaticFileHandler {
    document_root: PathBuf,
}

impl StaticFileHandler {
    pub fn new(document_root: impl Into<PathBuf>) -> Self {
        Self {
            document_root: document_root.into(),
        }
    }

    fn trim_crlf(line: &mut String) {
        let cut = memchr(b'\r', line.as_bytes()).or_else(|| memchr(b'\n', line.as_bytes()));
        if let Some(pos) = cut {
            line.truncate(pos);
        }
    }

    fn parse_request_line(line: &str) -> Option<(&str, &str, &str)> {
        let mut parts = line.split_ascii_whitespace();
        Some((parts.next()?, parts.next()?, parts.next()?))
    }

    /// Returns `(is_static, path)`. Mirrors `requestParseURI` exactly,
    /// including its `..` handling: any URI containing `..` is answered
    /// with `home.html` rather than rejected — a quirk of the original
    /// worth preserving faithfully rather than silently "fixing".
    fn resolve_path(&self, uri: &str) -> (bool, PathBuf) {
        if uri.contains("..") {
            return (true, self.document_root.join("home.html"));
        }
        if !uri.contains("cgi") {
            let rel = uri.trim_start_matches('/');
            let mut path = self.document_root.join(rel);
            if uri.ends_with('/') {
                path.push("home.html");
            }
            (true, path)
        } else {
            let without_query = uri.split('?').next().unwrap_or(uri);
            (false, self.document_root.join(without_query.trim_start_matches('/')))
        }
    }

    fn filetype(path: &Path) -> &'static str {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("html") => "text/html",
            Some("gif") => "image/gif",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "text/plain",
        }
    }

    /// `buf_stats`: appends the six `Stat-*` headers. `is_static` is `None`
    /// for error responses (the `-1` sentinel in the original), `Some(true)`
    /// for a served static file.
    fn write_stats(out: &mut String, stats: &Stats, is_static: Option<bool>) {
        let _ = write!(
            out,
            "Stat-Req-Arrival:: {}.{:06}\r\n",
            stats.arrival_time.sec, stats.arrival_time.usec
        );
        let _ = write!(
            out,
            "Stat-Req-Dispatch:: {}.{:06}\r\n",
            stats.dispatch_interval.sec, stats.dispatch_interval.usec
        );
        let _ = write!(out, "Stat-Thread-Id:: {}\r\n", stats.thread_id);
        let _ = write!(
            out,
            "Stat-Thread-Count:: {}\r\n",
            stats.requests_count + 1
        );
        let static_bump = matches!(is_static, Some(true)) as u64;
        let dynamic_bump = matches!(is_static, Some(false)) as u64;
        let _ = write!(
            out,
            "Stat-Thread-Static:: {}\r\n",
            stats.static_requests_count + static_bump
        );
        let _ = write!(
            out,
            "Stat-Thread-Dynamic:: {}\r\n",
            stats.dynamic_requests_count + dynamic_bump
        );
    }

    fn send_error(fd: &mut Fd, cause: &str, code: StatusCode, stats: &Stats) -> io::Result<()> {
        let body = format!(
            "<html><title>brd Error</title><body bgcolor=\"ffffff\">\r\n\
             {}: {}\r\n<p>{}: {}\r\n<hr>brd\r\n",
            code.line(),
            code.reason(),
            code.reason(),
            cause
        );
        let mut head = format!(
            "HTTP/1.0 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n",
            code.line(),
            body.len()
        );
        Self::write_stats(&mut head, stats, None);
        head.push_str("\r\n");
        fd.write_all(head.as_bytes())?;
        fd.write_all(body.as_bytes())
    }

    fn serve_static(fd: &mut Fd, path: &Path, stats: &Stats) -> io::Result<()> {
        let contents = fs::read(path)?;
        let mut head = format!(
            "HTTP/1.0 200 OK\r\nServer: brd\r\nContent-Length: {}\r\nContent-Type: {}\r\n",
            contents.len(),
            Self::filetype(path)
        );
        Self::write_stats(&mut head, stats, Some(true));
        head.push_str("\r\n");
        fd.write_all(head.as_bytes())?;
        fd.write_all(&contents)
    }
}

impl RequestHandler for StaticFileHandler {
    fn handle(&self, fd: &mut Fd, stats: &Stats) -> HandleResult {
        let mut line = String::new();
        {
            let mut reader = BufReader::new(&fd.0);
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                return HandleResult::Error(StatusCode::NotFound);
            }
            Self::trim_crlf(&mut line);

            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) => break,
                    Ok(_) => {
                        Self::trim_crlf(&mut header);
                        if header.is_empty() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        }

        let Some((method, uri, _version)) = Self::parse_request_line(&line) else {
            let _ = Self::send_error(fd, &line, StatusCode::NotImplemented, stats);
            return HandleResult::Error(StatusCode::NotImplemented);
        };

        if !method.eq_ignore_ascii_case("GET") {
            let _ = Self::send_error(fd, method, StatusCode::NotImplemented, stats);
            return HandleResult::Error(StatusCode::NotImplemented);
        }

        if simdutf8::basic::from_utf8(uri.as_bytes()).is_err() {
            let _ = Self::send_error(fd, uri, StatusCode::NotFound, stats);
            return HandleResult::Error(StatusCode::NotFound);
        }

        let (is_static, path) = self.resolve_path(uri);

        if !is_static {
            let _ = Self::send_error(fd, uri, StatusCode::NotImplemented, stats);
            return HandleResult::Error(StatusCode::NotImplemented);
        }

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            _ => {
                let _ = Self::send_error(fd, uri, StatusCode::NotFound, stats);
                return HandleResult::Error(StatusCode::NotFound);
            }
        }

        match Self::serve_static(fd, &path, stats) {
            Ok(()) => HandleResult::Static,
            Err(_) => {
                let _ = Self::send_error(fd, uri, StatusCode::Forbidden, stats);
                HandleResult::Error(StatusCode::Forbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_joins_document_root() {
        let handler = StaticFileHandler::new("/srv/public");
        let (is_static, path) = handler.resolve_path("/index.html");
        assert!(is_static);
        assert_eq!(path, PathBuf::from("/srv/public/index.html"));
    }

    #[test]
    fn resolve_path_appends_home_html_for_directory_uri() {
        let handler = StaticFileHandler::new("/srv/public");
        let (is_static, path) = handler.resolve_path("/docs/");
        assert!(is_static);
        assert_eq!(path, PathBuf::from("/srv/public/docs/home.html"));
    }

    #[test]
    fn resolve_path_rejects_traversal_to_home_html() {
        let handler = StaticFileHandler::new("/srv/public");
        let (is_static, path) = handler.resolve_path("/../../etc/passwd");
        assert!(is_static);
        assert_eq!(path, PathBuf::from("/srv/public/home.html"));
    }

    #[test]
    fn resolve_path_flags_cgi_uri_as_dynamic() {
        let handler = StaticFileHandler::new("/srv/public");
        let (is_static, path) = handler.resolve_path("/cgi-bin/counter.cgi?a=1");
        assert!(!is_static);
        assert_eq!(path, PathBuf::from("/srv/public/cgi-bin/counter.cgi"));
    }

    #[test]
    fn filetype_matches_known_extensions() {
        assert_eq!(StaticFileHandler::filetype(Path::new("a.html")), "text/html");
        assert_eq!(StaticFileHandler::filetype(Path::new("a.gif")), "image/gif");
        assert_eq!(StaticFileHandler::filetype(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(StaticFileHandler::filetype(Path::new("a.bin")), "text/plain");
    }
}
