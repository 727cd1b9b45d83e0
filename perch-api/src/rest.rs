use std::{
    borrow::Cow,
    time::{Duration, Instant},
};

use bytes::Bytes;
use http::Method;
use perch_api_core::error::{
    ApiError, CommonApiError, CommonErrorKind, ErrorResponse,
};
use reqwest::IntoUrl;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Avoid `Method::` prefix. Associated constants can't be imported
pub const GET: Method = Method::GET;
pub const PUT: Method = Method::PUT;
pub const POST: Method = Method::POST;
pub const DELETE: Method = Method::DELETE;

/// A generic RestClient which conforms to Perch's API: JSON request bodies,
/// and a JSON-serialized [`ErrorResponse`] body on any non-2xx status.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    /// The process that this [`RestClient`] is being called from, e.g. "app"
    from: Cow<'static, str>,
    /// The process that this [`RestClient`] is calling, e.g. "backend"
    to: &'static str,
}

impl RestClient {
    /// Builds a new [`RestClient`] with safe defaults.
    ///
    /// The `from` and `to` fields should succinctly specify the client and
    /// server components that this [`RestClient`] is used for, e.g.
    /// `from`="app", `to`="backend". The [`RestClient`] will log both fields
    /// so that requests from this client can be differentiated from those
    /// made by other clients in the same process, and propagate the `from`
    /// field to the server via the user agent header so that servers can
    /// identify requesting clients.
    pub fn new(from: impl Into<Cow<'static, str>>, to: &'static str) -> Self {
        fn inner(from: Cow<'static, str>, to: &'static str) -> RestClient {
            let client = RestClient::client_builder(&from)
                .build()
                .expect("Failed to build reqwest Client");
            RestClient { client, from, to }
        }
        inner(from.into(), to)
    }

    /// Get a [`reqwest::ClientBuilder`] with some defaults set.
    pub fn client_builder(from: impl AsRef<str>) -> reqwest::ClientBuilder {
        fn inner(from: &str) -> reqwest::ClientBuilder {
            reqwest::Client::builder()
                .user_agent(from)
                .timeout(API_REQUEST_TIMEOUT)
        }
        inner(from.as_ref())
    }

    /// Construct a [`RestClient`] from a [`reqwest::Client`].
    pub fn from_inner(
        client: reqwest::Client,
        from: impl Into<Cow<'static, str>>,
        to: &'static str,
    ) -> Self {
        Self {
            client,
            from: from.into(),
            to,
        }
    }

    #[inline]
    pub fn user_agent(&self) -> &Cow<'static, str> {
        &self.from
    }

    // --- RequestBuilder helpers --- //

    #[inline]
    pub fn get<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(GET, url).query(data)
    }

    #[inline]
    pub fn post<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(POST, url).json(data)
    }

    #[inline]
    pub fn put<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(PUT, url).json(data)
    }

    #[inline]
    pub fn delete<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(DELETE, url).json(data)
    }

    /// A clean slate [`reqwest::RequestBuilder`] for non-standard requests.
    /// Otherwise prefer to use the ready-made `get`, `put`, ..., etc helpers.
    pub fn builder(
        &self,
        method: Method,
        url: impl IntoUrl,
    ) -> reqwest::RequestBuilder {
        self.client.request(method, url)
    }

    // --- Request send/recv --- //

    /// Sends the built HTTP request.
    /// Tries to JSON deserialize the response body to `T`.
    ///
    /// The request is attempted exactly once; any retry policy belongs to
    /// the caller.
    pub async fn send<T: DeserializeOwned, E: ApiError>(
        &self,
        request_builder: reqwest::RequestBuilder,
    ) -> Result<T, E> {
        let bytes = self.send_no_deserialize::<E>(request_builder).await?;
        Self::json_deserialize(bytes)
    }

    /// Sends the HTTP request, but *doesn't* JSON-deserialize the response.
    pub async fn send_no_deserialize<E: ApiError>(
        &self,
        request_builder: reqwest::RequestBuilder,
    ) -> Result<Bytes, E> {
        let request = request_builder.build().map_err(CommonApiError::from)?;
        let response = self.send_inner(request).await;
        Self::map_response_errors::<Bytes, E>(response)
    }

    // `send_inner` intentionally uses zero generics in its function
    // signature to minimize code bloat.
    async fn send_inner(
        &self,
        request: reqwest::Request,
    ) -> Result<Result<Bytes, ErrorResponse>, CommonApiError> {
        let start = Instant::now();
        let method = request.method().clone();
        let url = request.url().clone();
        let from = &self.from;
        let to = self.to;
        debug!(%method, %url, %from, %to, "New client request");

        // send the request, await the response headers
        let resp = self.client.execute(request).await.inspect_err(|e| {
            let req_time = start.elapsed();
            warn!(
                ?req_time,
                "Done (error)(sending) Error sending request: {e}"
            );
        })?;

        let status = resp.status().as_u16();

        if resp.status().is_success() {
            let bytes = resp.bytes().await.inspect_err(|e| {
                let req_time = start.elapsed();
                warn!(
                    ?req_time,
                    %status,
                    "Done (error)(receiving) \
                     Couldn't receive response body: {e}",
                );
            })?;

            let req_time = start.elapsed();
            debug!(?req_time, %status, "Done (success)");
            Ok(Ok(bytes))
        } else {
            // http error => await response json and convert to ErrorResponse
            let error =
                resp.json::<ErrorResponse>().await.inspect_err(|e| {
                    let req_time = start.elapsed();
                    warn!(
                        ?req_time,
                        %status,
                        "Done (error)(receiving) \
                         Couldn't receive ErrorResponse: {e}",
                    );
                })?;

            let req_time = start.elapsed();
            warn!(
                ?req_time,
                %status,
                error_code = %error.code,
                error_msg = %error.msg,
                "Done (error)(response) Server returned error response",
            );
            Ok(Err(error))
        }
    }

    /// Converts the [`Result<Result<T, ErrorResponse>, CommonApiError>`]
    /// returned by [`Self::send_inner`] to [`Result<T, E>`].
    fn map_response_errors<T, E: ApiError>(
        response: Result<Result<T, ErrorResponse>, CommonApiError>,
    ) -> Result<T, E> {
        match response {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(err_api)) => Err(E::from(err_api)),
            Err(err_client) => Err(E::from(err_client)),
        }
    }

    /// JSON-deserializes the REST response bytes.
    fn json_deserialize<T: DeserializeOwned, E: ApiError>(
        bytes: Bytes,
    ) -> Result<T, E> {
        serde_json::from_slice::<T>(&bytes)
            .map_err(|err| {
                let kind = CommonErrorKind::Decode;
                let mut msg = format!("JSON deserialization failed: {err}");

                // If we're in debug, append the response str to the error msg.
                if cfg!(any(debug_assertions, test)) {
                    let resp_msg = String::from_utf8_lossy(&bytes);
                    msg.push_str(&format!(": '{resp_msg}'"));
                }

                CommonApiError::new(kind, msg)
            })
            .map_err(E::from)
    }
}
