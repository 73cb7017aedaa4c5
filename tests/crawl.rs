use std::io::Read as _;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

struct MockOrigin {
    base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockOrigin {
    fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start mock origin");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let (status, content_type, body): (u16, &str, String) = match request.url() {
                "/" => (
                    200,
                    "text/html",
                    r#"<html><body>
                        <a href="/page2">page2</a>
                        <a href="https://external.test/offsite">offsite</a>
                        <script src="/app.js"></script>
                    </body></html>"#
                        .to_string(),
                ),
                "/page2" => (200, "text/html", "<html><body>leaf page</body></html>".to_string()),
                "/app.js" => (
                    200,
                    "application/javascript",
                    r#"fetch("/api/v1/data"); var u = "https://cdn.external.test/lib.js";"#
                        .to_string(),
                ),
                "/api/v1/data" => (200, "application/json", "{}".to_string()),
                _ => (404, "text/plain", "not found".to_string()),
            };

            let header = tiny_http::Header::from_bytes(
                &b"Content-Type"[..],
                content_type.as_bytes(),
            )
            .expect("valid header");
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}

impl Drop for MockOrigin {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_to_string(path: &std::path::Path) -> String {
    let mut file = std::fs::File::open(path).unwrap_or_else(|err| panic!("open {path:?}: {err}"));
    let mut buf = String::new();
    file.read_to_string(&mut buf).unwrap();
    buf
}

#[test]
fn crawl_discovers_endpoints_js_files_and_offsite_osint() {
    let origin = MockOrigin::spawn();
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("crawl").to_string_lossy().to_string();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("originscout");
    cmd.args([
        origin.base_url().as_str(),
        "--threads",
        "2",
        "--depth",
        "3",
        "--mode",
        "plain",
        "--prefix",
        prefix.as_str(),
    ])
    .assert()
    .success();

    let alive = read_to_string(std::path::Path::new(&format!("{prefix}_alive_urls.txt")));
    assert!(alive.contains(&format!("200\t{}/", origin.base_url())));
    assert!(alive.contains(&format!("200\t{}/page2", origin.base_url())));
    assert!(alive.contains(&format!("200\t{}/app.js", origin.base_url())));

    let js_files = read_to_string(std::path::Path::new(&format!("{prefix}_js_files.txt")));
    assert!(js_files.contains("/app.js"));

    let api_endpoints =
        read_to_string(std::path::Path::new(&format!("{prefix}_api_endpoints.txt")));
    assert!(api_endpoints.contains("/api/v1/data"));

    let osint = read_to_string(std::path::Path::new(&format!("{prefix}_osint_strings.txt")));
    assert!(osint.contains("https://external.test/offsite"));
    assert!(osint.contains("https://cdn.external.test/lib.js"));
}

#[test]
fn crawl_respects_max_depth_zero_by_only_fetching_the_seed() {
    let origin = MockOrigin::spawn();
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("crawl").to_string_lossy().to_string();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("originscout");
    cmd.args([
        origin.base_url().as_str(),
        "--threads",
        "1",
        "--depth",
        "0",
        "--mode",
        "plain",
        "--prefix",
        prefix.as_str(),
    ])
    .assert()
    .success();

    let alive = read_to_string(std::path::Path::new(&format!("{prefix}_alive_urls.txt")));
    assert!(alive.contains(&format!("200\t{}/", origin.base_url())));
    assert!(!alive.contains("page2"));
}

#[test]
fn missing_url_argument_fails_with_nonzero_exit() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("originscout");
    cmd.assert().failure();
}
