pub mod fixtures;

use idmef_connector::{Config, Connector};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A connector with the built-in template and default configuration.
pub fn default_connector() -> Connector {
    Connector::new(Config::default()).expect("default connector builds")
}

/// Asserts that `value` is a timestamp in `YYYY-MM-DDTHH:MM:SS.ffffffZ` form.
pub fn assert_idmef_datetime(value: &serde_json::Value) {
    let text = value.as_str().expect("timestamp is a string");
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.6fZ")
        .unwrap_or_else(|e| panic!("'{}' is not an IDMEF datetime: {}", text, e));
    assert_eq!(text.len(), 27, "unexpected precision in '{}'", text);
}

/// Serves exactly one HTTP request with `status` and `body`, then closes.
/// Returns the collector URL and a handle yielding the request body received.
pub async fn one_shot_collector(
    status: &'static str,
    body: &'static str,
) -> std::io::Result<(String, tokio::task::JoinHandle<std::io::Result<String>>)> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/alerts", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await?;
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if let Some(body_start) = find_body(&request) {
                let headers = String::from_utf8_lossy(&request[..body_start]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= body_start + length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;

        let body_start = find_body(&request).unwrap_or(request.len());
        Ok::<_, std::io::Error>(String::from_utf8_lossy(&request[body_start..]).into_owned())
    });

    Ok((url, handle))
}

fn find_body(request: &[u8]) -> Option<usize> {
    request
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| i + 4)
}
