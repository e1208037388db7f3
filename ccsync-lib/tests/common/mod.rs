//! Shared test fixtures: a scriptable auth provider and a one-shot HTTP stub.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ccsync_lib::auth::{AuthIdentity, AuthProvider, AuthState};
use ccsync_lib::error::AuthError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub fn init_logging() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
}

/// HTTP client for talking to the local stub, ignoring any proxy settings.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Builds an unsigned JWT with the given JSON payload.
pub fn jwt(payload: &str) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

pub fn token_for(uid: &str, generation: usize) -> String {
    jwt(&format!(r#"{{"sub":"{uid}","email":"{uid}@example.edu","gen":{generation}}}"#))
}

type Hook = Box<dyn FnOnce() + Send>;

/// An auth provider driven entirely by the test.
pub struct FakeProvider {
    state: watch::Sender<AuthState>,
    refreshes: AtomicUsize,
    sign_outs: AtomicUsize,
    fail_refresh: AtomicBool,
    fail_sign_out: AtomicBool,
    on_refresh: Mutex<Option<Hook>>,
}

impl FakeProvider {
    pub fn new(initial: AuthState) -> Arc<Self> {
        let (state, _) = watch::channel(initial);
        Arc::new(Self {
            state,
            refreshes: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
            fail_refresh: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            on_refresh: Mutex::new(None),
        })
    }

    pub fn signed_in(uid: &str) -> Arc<Self> {
        Self::new(AuthState::SignedIn(
            AuthIdentity::new(uid).with_email(format!("{uid}@example.edu")),
        ))
    }

    pub fn emit(&self, state: AuthState) {
        self.state.send_replace(state);
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Runs `hook` inside the next refresh call, before it returns.
    pub fn on_next_refresh(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_refresh.lock().unwrap() = Some(Box::new(hook));
    }

    fn current_uid(&self) -> Option<String> {
        self.state.borrow().identity().map(|identity| identity.uid.clone())
    }
}

#[async_trait]
impl AuthProvider for FakeProvider {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    async fn fresh_token(&self, _force_refresh: bool) -> Result<String, AuthError> {
        let generation = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        // Give other callers a chance to interleave, as a network call would.
        tokio::task::yield_now().await;

        let hook = self.on_refresh.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }

        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(AuthError::Provider {
                code: "NETWORK_REQUEST_FAILED".into(),
                message: "offline".into(),
            });
        }
        let uid = self.current_uid().ok_or(AuthError::NotSignedIn)?;
        Ok(token_for(&uid, generation))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Provider {
                code: "NETWORK_REQUEST_FAILED".into(),
                message: "offline".into(),
            });
        }
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }
}

/// Serves the given `(status, body)` responses to successive connections and
/// returns the base URL plus a handle yielding the raw requests received.
pub async fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let reply = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                if status < 400 { "OK" } else { "Error" },
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        requests
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&buf).into_owned();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}
