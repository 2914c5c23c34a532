//! HTTP client for the processing server

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::constants::UPLOAD_FIELD;
use crate::error::{ClientError, Result};
use crate::models::{ProgressUpdate, SelectedFile, ServerStatus};
use crate::network::service::ProcessingService;

/// `ProcessingService` over HTTP
#[derive(Clone)]
pub struct HttpProcessingService {
    client: reqwest::Client,
    base: Url,
    /// Applied to progress, play and status only
    timeout: Duration,
}

impl HttpProcessingService {
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.server_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.server_url, e)))?;
        Ok(HttpProcessingService {
            client: create_client(),
            base,
            timeout: config.request_timeout(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        endpoint_url(&self.base, segments)
    }
}

#[async_trait]
impl ProcessingService for HttpProcessingService {
    async fn submit(&self, file: &SelectedFile) -> Result<()> {
        let url = self.url(&["process"])?;

        let handle = tokio::fs::File::open(&file.path).await?;
        let length = handle.metadata().await?.len();
        let mut part = Part::stream_with_length(handle, length).file_name(file.name.clone());
        if let Some(media_type) = &file.media_type {
            part = part.mime_str(media_type)?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::info!(%url, file = %file.name, bytes = length, "Uploading");
        let resp = self.client.post(url).multipart(form).send().await?;
        check_status(&resp, "POST /process")?;
        Ok(())
    }

    async fn progress(&self) -> Result<ProgressUpdate> {
        let url = self.url(&["progress"])?;
        let resp = self.client.get(url).timeout(self.timeout).send().await?;
        check_status(&resp, "GET /progress")?;
        Ok(resp.json::<ProgressUpdate>().await?)
    }

    async fn play(&self, output: &str) -> Result<()> {
        let url = self.url(&["play", output])?;
        let resp = self.client.get(url).timeout(self.timeout).send().await?;
        check_status(&resp, "GET /play")?;
        Ok(())
    }

    async fn download(&self, output: &str, dest_dir: &Path) -> Result<PathBuf> {
        let name = output_file_name(output)?;
        let url = self.url(&["download", output])?;

        let resp = self.client.get(url).send().await?;
        check_status(&resp, "GET /download")?;

        // Stream into a fresh sibling file; existing files are never opened
        tokio::fs::create_dir_all(dest_dir).await?;
        let partial = unique_path(dest_dir, &partial_name(&name));
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&partial)
            .await?;
        let written = write_body(resp, &mut file).await;
        drop(file);
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        let target = unique_path(dest_dir, &name);
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tracing::info!(path = %target.display(), "Download saved");
        Ok(target)
    }

    async fn server_status(&self) -> Result<ServerStatus> {
        let url = self.url(&["status"])?;
        let resp = self.client.get(url).timeout(self.timeout).send().await?;
        check_status(&resp, "GET /status")?;
        Ok(resp.json::<ServerStatus>().await?)
    }
}

/// Append path segments to the base URL, percent-encoding each one
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Local file name for a downloaded output: its last path component
pub fn output_file_name(output: &str) -> Result<PathBuf> {
    Path::new(output)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| ClientError::InvalidOutputName(output.to_string()))
}

/// `dir/name`, or `dir/stem (N).ext` with the lowest free N
pub fn unique_path(dir: &Path, name: &Path) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());
    (1u32..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

fn partial_name(name: &Path) -> PathBuf {
    PathBuf::from(format!("{}.part", name.display()))
}

fn check_status(resp: &reqwest::Response, endpoint: &str) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        })
    }
}

/// Stream the response body to disk
async fn write_body(resp: reqwest::Response, file: &mut tokio::fs::File) -> Result<()> {
    let mut stream = resp.bytes_stream();
    let mut written = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        written += chunk.len();
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    tracing::debug!(bytes = written, "Response body written");
    Ok(())
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("objectify-tui/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncReadExt;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    #[test]
    fn test_endpoint_url_joins_segments() {
        let base = Url::parse("http://127.0.0.1:5000").unwrap();
        assert_eq!(
            endpoint_url(&base, &["progress"]).unwrap().as_str(),
            "http://127.0.0.1:5000/progress"
        );

        let nested = Url::parse("http://box/api/").unwrap();
        assert_eq!(
            endpoint_url(&nested, &["process"]).unwrap().as_str(),
            "http://box/api/process"
        );
    }

    #[test]
    fn test_endpoint_url_escapes_output_reference() {
        let base = Url::parse("http://127.0.0.1:5000/").unwrap();
        let url = endpoint_url(&base, &["download", "my clip/#1.mp4"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/download/my%20clip%2F%231.mp4"
        );
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("objectify_1a2b.mp4").unwrap(), PathBuf::from("objectify_1a2b.mp4"));
        assert_eq!(output_file_name("/tmp/x/out.mp4").unwrap(), PathBuf::from("out.mp4"));
        assert!(output_file_name("..").is_err());
        assert!(output_file_name("").is_err());
    }

    #[test]
    fn test_new_rejects_bad_base() {
        let config = Config {
            server_url: "::nope".into(),
            ..Config::default()
        };
        assert!(matches!(
            HttpProcessingService::new(&config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_missing_file_is_io_error() {
        let service = HttpProcessingService::new(&Config::default()).unwrap();
        let file = SelectedFile::from_path("/definitely/missing/clip.mp4");
        assert!(matches!(service.submit(&file).await, Err(ClientError::Io(_))));
    }

    #[test]
    fn test_unique_path_skips_taken_names() {
        let dir = tempdir().unwrap();
        let name = Path::new("out.mp4");
        assert_eq!(unique_path(dir.path(), name), dir.path().join("out.mp4"));

        std::fs::write(dir.path().join("out.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("out (1).mp4"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), name), dir.path().join("out (2).mp4"));

        std::fs::write(dir.path().join("README"), b"x").unwrap();
        assert_eq!(
            unique_path(dir.path(), Path::new("README")),
            dir.path().join("README (1)")
        );
    }

    // Local HTTP peer: accepts one connection, captures the request and
    // replies with a canned response before hanging up.
    async fn serve_once(response: Vec<u8>) -> (HttpProcessingService, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(&response).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });
        let config = Config {
            server_url: format!("http://{}", addr),
            ..Config::default()
        };
        (HttpProcessingService::new(&config).unwrap(), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_complete(&buf) {
                break;
            }
        }
        buf
    }

    fn request_complete(buf: &[u8]) -> bool {
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let body = &buf[end + 4..];
        if head.contains("transfer-encoding: chunked") {
            return body.ends_with(b"0\r\n\r\n");
        }
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            content_type,
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    /// Headers promise more than is sent, then the connection drops
    fn truncated_response() -> Vec<u8> {
        b"HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: 1000\r\n\r\nhello".to_vec()
    }

    #[tokio::test]
    async fn test_submit_sends_video_part() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"not really a video").unwrap();
        let file = SelectedFile::from_path(&path);

        let (service, server) = serve_once(response("200 OK", "application/json", b"{}")).await;
        service.submit(&file).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /process "));
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("multipart/form-data; boundary="));
        assert!(lower.contains("name=\"video\""));
        assert!(lower.contains("filename=\"clip.mp4\""));
        assert!(lower.contains("content-type: video/mp4"));
        assert!(request.contains("not really a video"));
    }

    #[tokio::test]
    async fn test_submit_rejected_by_server() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        std::fs::write(&path, b"frames").unwrap();

        let body = br#"{"error": "Invalid file type"}"#;
        let (service, _server) = serve_once(response("400 BAD REQUEST", "application/json", body)).await;
        let err = service.submit(&SelectedFile::from_path(&path)).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_progress_parses_server_payload() {
        let body = br#"{"progress": 42.5, "message": "Processing frame 85/200", "completed": false, "success": null, "error": null, "output_file": null, "current_frame": 85, "total_frames": 200}"#;
        let (service, server) = serve_once(response("200 OK", "application/json", body)).await;

        let update = service.progress().await.unwrap();
        assert_eq!(update.progress, 42.5);
        assert_eq!(update.message.as_deref(), Some("Processing frame 85/200"));
        assert!(!update.completed);
        assert_eq!(update.success, None);
        assert_eq!(update.output_file, None);
        assert_eq!(update.error, None);
        assert!(server.await.unwrap().starts_with("GET /progress "));
    }

    #[tokio::test]
    async fn test_progress_garbage_is_an_error() {
        let (service, _server) = serve_once(response("200 OK", "text/html", b"<html>")).await;
        assert!(matches!(service.progress().await, Err(ClientError::Http(_))));
    }

    #[tokio::test]
    async fn test_play_hits_escaped_output_and_maps_status() {
        let (service, server) = serve_once(response("200 OK", "application/json", b"{}")).await;
        service.play("my clip.mp4").await.unwrap();
        assert!(server.await.unwrap().starts_with("GET /play/my%20clip.mp4 "));

        let (service, _server) = serve_once(response("404 NOT FOUND", "application/json", b"{}")).await;
        let err = service.play("gone.mp4").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_download_writes_whole_body() {
        let dir = tempdir().unwrap();
        let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let (service, server) = serve_once(response("200 OK", "video/mp4", &body)).await;

        let saved = service.download("objectify_out.mp4", dir.path()).await.unwrap();
        assert_eq!(saved, dir.path().join("objectify_out.mp4"));
        assert_eq!(std::fs::read(&saved).unwrap(), body);
        assert!(server.await.unwrap().starts_with("GET /download/objectify_out.mp4 "));
        // only the finished file is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_download_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let earlier = dir.path().join("out.mp4");
        std::fs::write(&earlier, b"earlier download").unwrap();

        let (service, _server) = serve_once(response("200 OK", "video/mp4", b"fresh")).await;
        let saved = service.download("out.mp4", dir.path()).await.unwrap();

        assert_eq!(saved, dir.path().join("out (1).mp4"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"fresh");
        assert_eq!(std::fs::read(&earlier).unwrap(), b"earlier download");
    }

    #[tokio::test]
    async fn test_interrupted_download_leaves_no_trace() {
        let dir = tempdir().unwrap();
        let earlier = dir.path().join("out.mp4");
        std::fs::write(&earlier, b"earlier download").unwrap();

        let (service, _server) = serve_once(truncated_response()).await;
        let result = service.download("out.mp4", dir.path()).await;

        assert!(matches!(result, Err(ClientError::Http(_))));
        assert_eq!(std::fs::read(&earlier).unwrap(), b"earlier download");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.mp4")]);
    }

    #[tokio::test]
    async fn test_download_error_status_writes_nothing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("downloads");
        let (service, _server) = serve_once(response("500 INTERNAL SERVER ERROR", "application/json", b"{}")).await;

        let err = service.download("out.mp4", &dest).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 500, .. }));
        assert!(!dest.exists());
    }
}
