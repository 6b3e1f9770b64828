//! The vMix web API client.

use crate::document::ServerInfo;
use crate::error::Error;
use crate::inputs::{Input, inputs_of};
use crate::query::{Function, Options, TextFieldSelector};
use reqwest::{StatusCode, Url};
use tracing::instrument;

/// Client for the web API of a single vMix instance.
///
/// Every method is a single `GET` round trip. Nothing is cached between calls, and a failed
/// call is never retried. Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Vmix {
    /// Base address of the mixer, e.g. `http://192.168.1.20:8088`.
    server: Url,
    client: reqwest::Client,
}

impl Vmix {
    /// Creates a client for the mixer at `server`.
    ///
    /// No request is made until the first method call.
    pub fn new(server: &str) -> Result<Self, Error> {
        Self::with_client(server, reqwest::Client::new())
    }

    /// Creates a client that sends its requests through `client`.
    ///
    /// Use this to configure timeouts or proxies on the transport.
    pub fn with_client(server: &str, client: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            server: Url::parse(server)?,
            client,
        })
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    /// Issues a `GET` and turns anything but `200 OK` into [`Error::Request`].
    #[instrument(skip(self, url), fields(%url), level = tracing::Level::TRACE)]
    async fn get(&self, operation: &str, url: Url) -> Result<reqwest::Response, Error> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(%status, "vMix rejected request");
            return Err(Error::request(operation, status));
        }

        Ok(response)
    }

    /// Fetches the mixer's state document from `/api`.
    #[instrument(skip(self), err)]
    pub async fn info(&self) -> Result<ServerInfo, Error> {
        let url = self.server.join("/api")?;
        let body = self
            .get("get vMix information", url)
            .await?
            .text()
            .await?;
        let info = ServerInfo::parse(&body)?;

        tracing::trace!(version = info.version(), "fetched vMix state");
        Ok(info)
    }

    /// Calls an API function with the given parameters.
    ///
    /// The options are sent as `/api/?<query>` exactly as [`Options::to_query_string`] renders
    /// them, apart from the characters a URL cannot carry at all (such as spaces), which are
    /// percent-encoded.
    #[instrument(skip(self), fields(function = options.get("Function")), err)]
    pub async fn call(&self, options: &Options) -> Result<(), Error> {
        let mut url = self.server.join("/api/")?;
        url.set_query(Some(&options.to_query_string()));

        let operation = options.get("Function").unwrap_or("vMix function call");
        self.get(operation, url).await?;
        Ok(())
    }

    /// Sets the text of one field of a title input.
    ///
    /// `field` is either a zero-based index or a field name such as `Message.Text`; a string
    /// consisting only of digits is treated as an index.
    pub async fn set_text(
        &self,
        input: &str,
        field: impl Into<TextFieldSelector>,
        value: &str,
    ) -> Result<(), Error> {
        let field = field.into();
        let options = Options::for_input(Function::SetText, input)
            .with("Value", value)
            .with(field.parameter(), field.value());
        self.call(&options).await
    }

    pub async fn start_countdown(&self, input: &str) -> Result<(), Error> {
        self.call(&Options::for_input(Function::StartCountdown, input))
            .await
    }

    pub async fn stop_countdown(&self, input: &str) -> Result<(), Error> {
        self.call(&Options::for_input(Function::StopCountdown, input))
            .await
    }

    pub async fn pause_countdown(&self, input: &str) -> Result<(), Error> {
        self.call(&Options::for_input(Function::PauseCountdown, input))
            .await
    }

    /// Sets the countdown duration of an input.
    ///
    /// `value` is sent unchecked and should be `hh:mm:ss`; see
    /// [`countdown_duration`](crate::countdown_duration).
    pub async fn set_countdown(&self, input: &str, value: &str) -> Result<(), Error> {
        let options = Options::for_input(Function::SetCountdown, input).with("Value", value);
        self.call(&options).await
    }

    /// Moves the countdown of an input by `seconds`: negative values subtract time, positive
    /// values add it.
    pub async fn adjust_countdown(&self, input: &str, seconds: i64) -> Result<(), Error> {
        let options = Options::for_input(Function::AdjustCountdown, input)
            .with("Value", seconds.to_string());
        self.call(&options).await
    }

    /// Lists all inputs and their text fields, in the order the mixer reports them.
    pub async fn inputs(&self) -> Result<Vec<Input>, Error> {
        let info = self.info().await?;
        Ok(inputs_of(&info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::{self, Bytes};
    use hyper::service::service_fn;
    use hyper::{Request, Response};
    use pretty_assertions::assert_eq;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    const GUID: &str = "ab09d985-bec6-4d62-9a66-455d3b416bba";

    const STATE: &str = r#"<vmix>
  <version>27.0.0.49</version>
  <edition>4K</edition>
  <inputs>
    <input key="ab09d985-bec6-4d62-9a66-455d3b416bba" number="1" type="GT" title="Lower Third">
      <text index="0" name="Message.Text">Hello</text>
      <text index="1" name="Clock.Text">00:05:00</text>
    </input>
    <input key="5c6e1a5c-1f5f-4a3f-9f0e-2f5d2c6a7b11" number="2" type="Colour" title="Black"/>
  </inputs>
</vmix>"#;

    /// A stand-in mixer that answers every request with the same status and body, and records
    /// the request targets it saw.
    struct FakeMixer {
        url: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeMixer {
        async fn start(status: u16, body: &'static str) -> Self {
            let socket = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind to localhost");
            let addr = socket.local_addr().expect("get local address");
            let requests = Arc::new(Mutex::new(Vec::new()));
            let seen = Arc::clone(&requests);
            tokio::spawn(async move {
                while let Ok((conn, _)) = socket.accept().await {
                    let conn = hyper_util::rt::TokioIo::new(conn);
                    let seen = Arc::clone(&seen);
                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<body::Incoming>| {
                            seen.lock().unwrap().push(req.uri().to_string());
                            async move {
                                let mut response = Response::new(Full::new(Bytes::from(body)));
                                *response.status_mut() = StatusCode::from_u16(status).unwrap();
                                Ok::<_, Infallible>(response)
                            }
                        });
                        let _ = hyper::server::conn::http1::Builder::new()
                            .serve_connection(conn, service)
                            .await;
                    });
                }
            });
            Self {
                url: format!("http://{addr}"),
                requests,
            }
        }

        fn client(&self) -> Vmix {
            Vmix::new(&self.url).unwrap()
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[test]
    fn construction_does_not_connect() {
        let vmix = Vmix::new("http://192.0.2.1:8088").unwrap();
        assert_eq!(vmix.server().as_str(), "http://192.0.2.1:8088/");
    }

    #[test]
    fn rejects_bad_server_address() {
        assert!(matches!(
            Vmix::new("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn info_parses_state() {
        let mixer = FakeMixer::start(200, STATE).await;
        let info = mixer.client().info().await.unwrap();
        assert_eq!(info.version(), Some("27.0.0.49"));
        assert_eq!(info.edition(), Some("4K"));
        assert_eq!(mixer.requests(), ["/api"]);
    }

    #[tokio::test]
    async fn info_reports_status() {
        let mixer = FakeMixer::start(500, "").await;
        let err = mixer.client().info().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        let Error::Request {
            operation, reason, ..
        } = &err
        else {
            panic!("expected a request error, got {err:?}");
        };
        assert_eq!(operation, "get vMix information");
        assert_eq!(reason, "Internal Server Error");
        assert_eq!(
            err.to_string(),
            "get vMix information failed: Internal Server Error (500)"
        );
    }

    #[tokio::test]
    async fn info_rejects_malformed_document() {
        let mixer = FakeMixer::start(200, "<vmix><inputs></vmix>").await;
        let err = mixer.client().info().await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_mixer_is_a_transport_error() {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        drop(socket);

        let err = Vmix::new(&format!("http://{addr}"))
            .unwrap()
            .start_countdown(GUID)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "{err:?}");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn set_text_by_name() {
        let mixer = FakeMixer::start(200, "").await;
        mixer
            .client()
            .set_text(GUID, "Message", "Test")
            .await
            .unwrap();
        assert_eq!(
            mixer.requests(),
            [format!(
                "/api/?Function=SetText&Input={GUID}&Value=Test&SelectedName=Message"
            )]
        );
    }

    #[tokio::test]
    async fn set_text_by_index() {
        let mixer = FakeMixer::start(200, "").await;
        mixer.client().set_text(GUID, "2", "Test").await.unwrap();
        let requests = mixer.requests();
        assert_eq!(
            requests,
            [format!(
                "/api/?Function=SetText&Input={GUID}&Value=Test&SelectedIndex=2"
            )]
        );
        assert!(!requests[0].contains("SelectedName"));
    }

    #[tokio::test]
    async fn set_text_encodes_only_what_urls_cannot_carry() {
        let mixer = FakeMixer::start(200, "").await;
        mixer
            .client()
            .set_text(GUID, 0u64, "Hello World")
            .await
            .unwrap();
        assert_eq!(
            mixer.requests(),
            [format!(
                "/api/?Function=SetText&Input={GUID}&Value=Hello%20World&SelectedIndex=0"
            )]
        );
    }

    #[tokio::test]
    async fn set_text_failure() {
        let mixer = FakeMixer::start(404, "").await;
        let err = mixer
            .client()
            .set_text(GUID, "Message", "Test")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(
            matches!(&err, Error::Request { operation, .. } if operation == "SetText"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn countdown_controls() {
        let mixer = FakeMixer::start(200, "").await;
        let vmix = mixer.client();
        vmix.start_countdown(GUID).await.unwrap();
        vmix.pause_countdown(GUID).await.unwrap();
        vmix.stop_countdown(GUID).await.unwrap();
        vmix.set_countdown(GUID, "00:10:00").await.unwrap();
        vmix.adjust_countdown(GUID, -30).await.unwrap();
        vmix.adjust_countdown(GUID, 15).await.unwrap();

        assert_eq!(
            mixer.requests(),
            [
                format!("/api/?Function=StartCountdown&Input={GUID}"),
                format!("/api/?Function=PauseCountdown&Input={GUID}"),
                format!("/api/?Function=StopCountdown&Input={GUID}"),
                format!("/api/?Function=SetCountdown&Input={GUID}&Value=00:10:00"),
                format!("/api/?Function=AdjustCountdown&Input={GUID}&Value=-30"),
                format!("/api/?Function=AdjustCountdown&Input={GUID}&Value=15"),
            ]
        );
    }

    #[tokio::test]
    async fn countdown_failure() {
        let mixer = FakeMixer::start(503, "").await;
        let err = mixer.client().pause_countdown(GUID).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn other_success_codes_are_failures() {
        let mixer = FakeMixer::start(204, "").await;
        let err = mixer.client().start_countdown(GUID).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));

        let err = mixer.client().info().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn server_path_is_replaced() {
        let mixer = FakeMixer::start(200, "").await;
        let vmix = Vmix::new(&format!("{}/ignored/", mixer.url)).unwrap();
        vmix.stop_countdown(GUID).await.unwrap();
        assert_eq!(
            mixer.requests(),
            [format!("/api/?Function=StopCountdown&Input={GUID}")]
        );
    }

    #[tokio::test]
    async fn lists_inputs_in_document_order() {
        let mixer = FakeMixer::start(200, STATE).await;
        let inputs = mixer.client().inputs().await.unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].key(), Some(GUID));
        assert_eq!(
            inputs[0]
                .text
                .iter()
                .map(|t| t.name().unwrap())
                .collect::<Vec<_>>(),
            ["Message.Text", "Clock.Text"]
        );
        assert_eq!(inputs[1].title(), Some("Black"));
        assert!(inputs[1].text.is_empty());
    }

    #[tokio::test]
    async fn lists_no_inputs() {
        let mixer = FakeMixer::start(200, "<vmix><inputs/></vmix>").await;
        assert!(mixer.client().inputs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_inputs_failure() {
        let mixer = FakeMixer::start(401, "").await;
        let err = mixer.client().inputs().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }
}
