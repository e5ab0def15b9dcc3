#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server, StatusCode};

use txlens_adapters::CachedHttpClient;

/// One recorded request: url (path + query) and body.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub url: String,
    pub body: String,
}

pub type Calls = Arc<Mutex<Vec<Recorded>>>;

/// Serves requests until the process exits. `handler` receives the request
/// index, url and body and returns a status code and JSON body.
pub fn spawn_mock_server<F>(handler: F) -> (String, Calls)
where
    F: Fn(usize, &str, &str) -> (u16, String) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    thread::spawn(move || {
        for (idx, mut req) in server.incoming_requests().enumerate() {
            let url = req.url().to_owned();
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            if let Ok(mut g) = recorded.lock() {
                g.push(Recorded {
                    url: url.clone(),
                    body: body.clone(),
                });
            }

            let (code, payload) = handler(idx, &url, &body);
            let header = Header::from_bytes("Content-Type", "application/json").expect("header");
            let response = Response::from_string(payload)
                .with_status_code(StatusCode(code))
                .with_header(header);
            let _ = req.respond(response);
        }
    });

    (addr, calls)
}

pub fn recorded(calls: &Calls) -> Vec<Recorded> {
    calls.lock().expect("calls lock").clone()
}

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("http client")
}

pub fn test_http(refresh: Duration, allow_stale: bool) -> CachedHttpClient {
    CachedHttpClient::with_client(test_client(), refresh, allow_stale)
}
