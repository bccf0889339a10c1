use std::sync::{Arc, Mutex};

use reprocess::config::Config;
use reprocess::{CrashStatsApi, Error, HttpApi};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Recorded {
    head: String,
    body: String,
}

/// Serves the canned `(status, body)` responses in order, one per connection,
/// and records each request it receives.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&recorded);
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            log.lock().unwrap().push(request);

            let response = format!(
                "HTTP/1.1 {} Canned\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (format!("http://{}", addr), recorded)
}

async fn read_request(stream: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let head = text[..split].to_string();
            let content_length = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                .map(|(_, v)| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            let body = &text[split + 4..];
            if body.len() >= content_length || n == 0 {
                return Recorded {
                    head,
                    body: body.to_string(),
                };
            }
        }
        if n == 0 {
            return Recorded {
                head: text,
                body: String::new(),
            };
        }
    }
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_search_sends_repeated_query_pairs() {
    let (base, recorded) = serve(vec![(
        200,
        r#"{"total": 2, "hits": [{"uuid": "a"}, {"uuid": "b"}], "facets": {}}"#,
    )])
    .await;
    let api = HttpApi::new(&Config::with_base_url(base, None)).unwrap();

    let page = api
        .search(&pairs(&[
            ("product", "Firefox"),
            ("product", "Beta"),
            ("q", ">42"),
            ("_results_offset", "0"),
        ]))
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.hits.len(), 2);

    let requests = recorded.lock().unwrap();
    let request_line = requests[0].head.lines().next().unwrap().to_string();
    assert!(request_line.starts_with("GET /api/SuperSearch/?"), "{}", request_line);
    assert!(request_line.contains("product=Firefox&product=Beta"), "{}", request_line);
    assert!(request_line.contains("q=%3E42"), "{}", request_line);
    assert!(request_line.contains("_results_offset=0"), "{}", request_line);
}

#[tokio::test]
async fn test_search_error_status_is_http_error() {
    let (base, _) = serve(vec![(500, r#"{"error": "boom"}"#)]).await;
    let api = HttpApi::new(&Config::with_base_url(base, None)).unwrap();

    let err = api.search(&[]).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{:?}", err);
}

#[tokio::test]
async fn test_search_malformed_body_is_json_error() {
    let (base, _) = serve(vec![(200, "<html>not json</html>")]).await;
    let api = HttpApi::new(&Config::with_base_url(base, None)).unwrap();

    let err = api.search(&[]).await.unwrap_err();
    assert!(matches!(err, Error::Json(_)), "{:?}", err);
}

#[tokio::test]
async fn test_reprocess_posts_form_with_auth_header() {
    let (base, recorded) = serve(vec![(201, "true")]).await;
    let api = HttpApi::new(&Config::with_base_url(base, None)).unwrap();

    let ids = vec!["a".to_string(), "b".to_string()];
    let status = api.reprocess(&ids, "secret").await.unwrap();
    assert_eq!(status, 201);

    let requests = recorded.lock().unwrap();
    let head = requests[0].head.to_ascii_lowercase();
    assert!(head.starts_with("post /api/reprocessing/ "), "{}", head);
    assert!(head.contains("auth-token: secret"), "{}", head);
    assert!(head.contains("application/x-www-form-urlencoded"), "{}", head);
    assert_eq!(requests[0].body, "crash_ids=a&crash_ids=b");
}

#[tokio::test]
async fn test_reprocess_returns_rejection_status() {
    let (base, _) = serve(vec![(403, r#"{"error": "forbidden"}"#)]).await;
    let api = HttpApi::new(&Config::with_base_url(base, None)).unwrap();

    let status = api.reprocess(&["a".to_string()], "bad").await.unwrap();
    assert_eq!(status, 403);
}
