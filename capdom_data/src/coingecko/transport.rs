use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use log::debug;
use reqwest::StatusCode;
use snafu::ResultExt;

use super::{TransportError, Http};

/// Status and raw body of a completed request. Non-success statuses are not errors here.
#[derive(Clone, Debug)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpReply {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> HttpReply {
        HttpReply { status, body: body.into() }
    }
}

/// Issues GET requests relative to the API base URL.
pub trait Transport {
    fn get<'a>(
        &'a self,
        path: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<HttpReply, TransportError>>;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: impl AsRef<str>,
    ) -> Result<ReqwestTransport, TransportError> {
        let http = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent.as_ref())
            .gzip(true)
            .build()
            .context(Http)?;

        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> ReqwestTransport {
        ReqwestTransport { http, base_url: base_url.into() }
    }

    fn url_of(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        path: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<HttpReply, TransportError>> {
        Box::pin(async move {
            let url = self.url_of(path);
            debug!("GET {} {:?}", url, query);

            let response = self.http.get(&url)
                .query(query)
                .send()
                .await
                .context(Http)?;

            let status = response.status();
            let body = response.bytes().await.context(Http)?;

            Ok(HttpReply { status, body })
        })
    }
}
