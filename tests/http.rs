use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct LoggedEvent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct BucketPoint {
    label: String,
    emotional: u64,
    background: u64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("anxiety_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/events")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_anxiety_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_UTC_OFFSET", "UTC")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_stats(client: &Client, base_url: &str, range: &str) -> Vec<BucketPoint> {
    client
        .get(format!("{base_url}/api/stats?range={range}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn totals(points: &[BucketPoint]) -> (u64, u64) {
    points
        .iter()
        .fold((0, 0), |(e, b), point| (e + point.emotional, b + point.background))
}

#[tokio::test]
async fn http_logged_event_shows_in_every_range() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = totals(&fetch_stats(&client, &server.base_url, "week").await);

    let logged: LoggedEvent = client
        .post(format!("{}/api/events", server.base_url))
        .json(&serde_json::json!({ "type": "emotional" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(logged.kind, "emotional");
    assert!(!logged.id.is_empty());
    assert!(logged.timestamp.ends_with('Z'));

    for (range, len) in [("day", 24), ("week", 7), ("month", 30), ("year", 12)] {
        let points = fetch_stats(&client, &server.base_url, range).await;
        assert_eq!(points.len(), len, "{range}");
        assert!(points.iter().all(|point| !point.label.is_empty()));
    }

    let after = totals(&fetch_stats(&client, &server.base_url, "week").await);
    assert_eq!(after.0, before.0 + 1);
    assert_eq!(after.1, before.1);
}

#[tokio::test]
async fn http_rejects_unknown_type_and_range() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/events", server.base_url))
        .json(&serde_json::json!({ "type": "joy" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let points = fetch_stats(&client, &server.base_url, "unknown").await;
    assert!(points.is_empty());
}

#[tokio::test]
async fn http_clear_empties_log() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/log/background", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/api/events", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let events: Vec<serde_json::Value> = client
        .get(format!("{}/api/events", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(events.is_empty());
    assert_eq!(totals(&fetch_stats(&client, &server.base_url, "day").await), (0, 0));
}
