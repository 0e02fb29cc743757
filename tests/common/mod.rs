//! Common test utilities for roster integration tests.
//!
//! Provides `TestEnv` for isolated working directories and `FakeBamboo`, a
//! tiny HTTP server that answers the three BambooHR endpoints roster calls.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::Command;
pub use tempfile::TempDir;

/// Company subdomain used by tests that talk to `FakeBamboo`.
pub const TEST_DOMAIN: &str = "acme";

/// API key used by tests that talk to `FakeBamboo`.
pub const TEST_API_KEY: &str = "test-key-0123456789";

/// A test environment with an isolated working directory.
///
/// `roster()` clears every environment variable roster reads and points the
/// user config directory into the temp dir, so a developer's own roster.kdl
/// or BambooHR credentials never leak into a test.
pub struct TestEnv {
    pub work_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the roster binary running in the work directory.
    pub fn roster(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_roster"));
        cmd.current_dir(self.work_dir.path());
        for name in [
            "BAMBOO_COMPANY_DOMAIN",
            "BAMBOO_API_KEY",
            "BAMBOO_BASE_URL",
            "ROSTER_CONFIG",
            "ROSTER_LOG",
        ] {
            cmd.env_remove(name);
        }
        cmd.env("HOME", self.work_dir.path());
        cmd.env("XDG_CONFIG_HOME", self.work_dir.path().join(".config"));
        cmd
    }

    /// Get a Command for the roster binary wired to a fake server.
    pub fn roster_against(&self, server: &FakeBamboo) -> Command {
        let mut cmd = self.roster();
        cmd.env("BAMBOO_BASE_URL", server.base_url());
        cmd.env("BAMBOO_COMPANY_DOMAIN", TEST_DOMAIN);
        cmd.env("BAMBOO_API_KEY", TEST_API_KEY);
        cmd
    }

    /// Get the path to the work directory.
    pub fn path(&self) -> &std::path::Path {
        self.work_dir.path()
    }

    /// Write a file relative to the work directory.
    pub fn write(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Read a file relative to the work directory as JSON.
    pub fn read_json(&self, name: &str) -> serde_json::Value {
        let text = std::fs::read_to_string(self.work_dir.path().join(name)).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// One canned response of `FakeBamboo`.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl Route {
    /// A `200 OK` JSON response.
    pub fn ok(method: &'static str, path: &'static str, body: serde_json::Value) -> Self {
        Self {
            method,
            path,
            status: 200,
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    /// An error response carrying BambooHR's error header.
    pub fn error(method: &'static str, path: &'static str, status: u16, message: &str) -> Self {
        Self {
            method,
            path,
            status,
            body: String::new(),
            headers: vec![("X-BambooHR-Error-Message".to_string(), message.to_string())],
        }
    }
}

/// A request received by `FakeBamboo`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Minimal HTTP/1.1 server for the BambooHR endpoints.
///
/// Routes match on method and path suffix. Unknown paths answer 404.
/// The server thread lives until the test process exits.
pub struct FakeBamboo {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeBamboo {
    /// Start a server answering the given routes.
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let routes = routes.clone();
                let recorded = Arc::clone(&recorded);
                thread::spawn(move || {
                    let _ = serve(stream, &routes, &recorded);
                });
            }
        });

        Self { addr, requests }
    }

    /// Start a server with a healthy default data set (see [`fixture_routes`]).
    pub fn healthy() -> Self {
        Self::start(fixture_routes())
    }

    /// Gateway root to put in `BAMBOO_BASE_URL`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(
    stream: TcpStream,
    routes: &[Route],
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let route = routes
        .iter()
        .find(|r| r.method == method && path.ends_with(r.path));
    let (status, body, headers) = match route {
        Some(r) => (r.status, r.body.clone(), r.headers.clone()),
        None => (404, String::new(), Vec::new()),
    };

    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        reason(status),
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(&body);

    let mut stream = stream;
    stream.write_all(response.as_bytes())?;
    stream.flush()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Field list advertised by the default fixture.
pub fn fixture_fields() -> serde_json::Value {
    serde_json::json!([
        {"id": "0", "name": "Employee #", "alias": "id"},
        {"id": 1, "name": "First Name", "alias": "firstName"},
        {"id": 2, "name": "Last Name", "alias": "lastName"},
        {"id": 3, "name": "Job Title", "alias": "jobTitle"},
        {"id": 4, "name": "Department", "alias": "department"},
        {"id": 5, "name": "Hire Date", "alias": "hireDate"},
        {"id": 6, "name": "Reporting To"},
        {"id": 7, "name": "Social Security #", "alias": "ssn"},
        {"id": 8, "name": "Pay Rate", "alias": "payRate"}
    ])
}

/// Custom report rows of the default fixture.
///
/// Ann runs the company, Ben reports to Ann, Cal reports to Ben by his
/// directory display name, and Dee names a manager nobody has. Cal's row
/// carries the manager under both keys and a `null` job title.
pub fn fixture_report() -> serde_json::Value {
    serde_json::json!({
        "title": "Report",
        "fields": [
            {"id": "id", "type": "int", "name": "ID"},
            {"id": "firstName", "type": "text", "name": "First Name"}
        ],
        "employees": [
            {"id": "1", "firstName": "Ann", "lastName": "Lee", "jobTitle": "CEO",
             "department": "Exec", "hireDate": "2015-03-01", "Reporting To": null},
            {"id": 2, "firstName": "Benjamin", "lastName": "Ortiz", "jobTitle": "CTO",
             "department": "Engineering", "hireDate": "2018-06-15", "Reporting To": "Ann Lee"},
            {"id": "3", "firstName": "Cal", "lastName": "Moss", "jobTitle": null,
             "department": "Engineering", "hireDate": "0000-00-00",
             "supervisor": "Ben Ortiz", "Reporting To": "Ben Ortiz"},
            {"id": "4", "firstName": "Dee", "lastName": "Park", "jobTitle": "Analyst",
             "Reporting To": "Nobody Known"}
        ]
    })
}

/// Directory of the default fixture.
///
/// Ben goes by "Ben Ortiz" and his work email only exists here. Cal's title
/// here is overwritten by the report's `null`. Id 99 is absent from the
/// report and must not appear in the output.
pub fn fixture_directory() -> serde_json::Value {
    serde_json::json!({
        "fields": [],
        "employees": [
            {"id": "1", "displayName": "Ann Lee", "jobTitle": "Chief Executive",
             "photoUrl": "https://img.example/ann.jpg"},
            {"id": "2", "displayName": "Ben Ortiz", "workEmail": "ben@acme.example"},
            {"id": "3", "displayName": "Cal Moss", "jobTitle": "Engineer"},
            {"id": "99", "displayName": "Ghost Person", "jobTitle": "Contractor"}
        ]
    })
}

/// The default set of healthy routes.
pub fn fixture_routes() -> Vec<Route> {
    vec![
        Route::ok("GET", "/acme/v1/meta/fields", fixture_fields()),
        Route::ok("POST", "/acme/v1/reports/custom", fixture_report()),
        Route::ok("GET", "/acme/v1/employees/directory", fixture_directory()),
    ]
}
