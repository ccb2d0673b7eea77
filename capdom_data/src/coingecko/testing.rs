//! Scripted stand-ins for the network and the clock.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use futures::future::{self, BoxFuture};
use reqwest::StatusCode;

use super::{Clock, HttpReply, Transport, TransportError};

/// A recorded request: path and query pairs.
pub type RecordedRequest = (String, Vec<(String, String)>);

/// Replies to each path from a queue, in the order they were scripted.
/// A path with nothing left to reply fails the request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Result<HttpReply, String>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> ScriptedTransport {
        ScriptedTransport::default()
    }

    pub fn reply(&self, path: impl Into<String>, status: StatusCode, body: impl Into<String>) -> &Self {
        self.push(path.into(), Ok(HttpReply::new(status, body.into())));
        self
    }

    pub fn fail(&self, path: impl Into<String>, message: impl Into<String>) -> &Self {
        self.push(path.into(), Err(message.into()));
        self
    }

    fn push(&self, path: String, reply: Result<HttpReply, String>) {
        let mut replies = self.replies.lock().unwrap();
        replies.entry(path).or_insert_with(VecDeque::new).push_back(reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.requests.lock().unwrap().iter()
            .filter(|(p, _)| p == path)
            .count()
    }

    /// Paths in the order they were requested.
    pub fn paths(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter()
            .map(|(p, _)| p.clone())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn get<'a>(
        &'a self,
        path: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<HttpReply, TransportError>> {
        self.requests.lock().unwrap().push((
            path.to_owned(),
            query.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect(),
        ));

        let next = self.replies.lock().unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front);

        let result = match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(TransportError::Other { message }),
            None => Err(TransportError::Other { message: format!("no reply scripted for '{}'", path) }),
        };

        Box::pin(future::ready(result))
    }
}

/// Records requested waits and returns immediately.
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn new() -> RecordingClock {
        RecordingClock::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.sleeps.lock().unwrap().push(duration);
        Box::pin(future::ready(()))
    }
}

/// Body of a `coins/markets` reply listing `ids` in rank order.
pub fn markets_body(ids: &[&str]) -> String {
    let entries: Vec<String> = ids.iter()
        .map(|id| format!(r#"{{"id":"{}","symbol":"{}","name":"{}"}}"#, id, &id[..id.len().min(3)], id))
        .collect();
    format!("[{}]", entries.join(","))
}

/// Body of a `market_chart` reply. Values are written verbatim as JSON numbers,
/// `null` included.
pub fn market_chart_body(points: &[(i64, &str)]) -> String {
    let caps: Vec<String> = points.iter()
        .map(|(ts, value)| format!("[{},{}]", ts, value))
        .collect();
    let prices: Vec<String> = points.iter()
        .map(|(ts, _)| format!("[{},1.0]", ts))
        .collect();
    format!(
        r#"{{"prices":[{}],"market_caps":[{}],"total_volumes":[]}}"#,
        prices.join(","),
        caps.join(","))
}
