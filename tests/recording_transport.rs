//! End-to-end pipeline tests over an in-memory transport.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use topvisor_client::client::Payload;
use topvisor_client::transport::{Transport, TransportError, TransportResponse};
use topvisor_client::{
    Arguments, CheckerPriceParams, DateSpec, Error, Operation, ProjectsParams,
    SearchersRegionsParams, Service, SummaryChartParams, SummaryParams, TopvisorClient,
};

/// Records every exchange and answers with a canned response.
struct RecordingTransport {
    sent: Mutex<Vec<(String, Value)>>,
    status: u16,
    body: Vec<u8>,
}

impl RecordingTransport {
    fn answering(status: u16, body: impl Into<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            status,
            body: body.into(),
        })
    }

    fn ok() -> Arc<Self> {
        Self::answering(200, r#"{"result":[]}"#)
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.sent.lock().unwrap().clone()
    }

    fn last_payload(&self) -> Value {
        self.calls().last().expect("a request was sent").1.clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        endpoint: &str,
        payload: &Payload,
        _request_id: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.to_string(), payload.to_json()));
        Ok(TransportResponse::new(self.status, self.body.clone()))
    }
}

fn client(transport: &Arc<RecordingTransport>) -> TopvisorClient {
    TopvisorClient::with_transport(transport.clone())
}

fn args(value: Value) -> Arguments {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn unknown_operation_never_invokes_transport() {
    let transport = RecordingTransport::ok();
    let err = client(&transport)
        .execute("get_keywords", Arguments::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidRequest { .. }));
    assert!(err.to_string().contains("get_keywords"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn validation_failures_never_invoke_transport() {
    let transport = RecordingTransport::ok();
    let client = client(&transport);

    let cases = [
        ("get_competitors", json!({})),
        ("get_history", json!({"project_id": 1, "regions_indexes": [1]})),
        (
            "get_history",
            json!({"project_id": 1, "regions_indexes": [1], "dates": ["2024-01-01"], "date1": "2024-01-01", "date2": "2024-01-02"}),
        ),
        (
            "get_summary",
            json!({"project_id": 1, "region_index": 1, "dates": ["2024-01-01"]}),
        ),
        (
            "get_summary_chart",
            json!({"project_id": 1, "region_index": 1, "dates": ["01.01.2024"]}),
        ),
        ("get_searchers_regions", json!({"project_id": 1, "device": 3})),
        ("get_projects", json!({"limit": "ten"})),
    ];

    for (operation, arguments) in cases {
        let err = client
            .execute(operation, args(arguments.clone()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidRequest { .. }),
            "{operation} {arguments} gave {err:?}"
        );
    }
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn operations_route_to_their_service_endpoints() {
    let transport = RecordingTransport::ok();
    let client = client(&transport);

    client.get_projects(&ProjectsParams::default()).await.unwrap();
    client
        .get_checker_price(&CheckerPriceParams::new(5))
        .await
        .unwrap();

    let endpoints: Vec<String> = transport.calls().into_iter().map(|(e, _)| e).collect();
    assert_eq!(
        endpoints,
        vec![
            "/v2/json/get/projects_2/projects".to_string(),
            "/v2/json/get/positions_2/checker/price".to_string(),
        ]
    );
    assert!(client.registry().is_initialized(Service::Projects));
    assert!(client.registry().is_initialized(Service::Positions));
}

#[tokio::test]
async fn flags_are_sent_as_integers_and_absent_ones_omitted() {
    let transport = RecordingTransport::ok();
    let mut params = ProjectsParams::default();
    params.show_site_stat = Some(true);
    params.include_positions_summary = Some(false);

    client(&transport).get_projects(&params).await.unwrap();

    let payload = transport.last_payload();
    assert_eq!(payload["show_site_stat"], json!(1));
    assert_eq!(payload["include_positions_summary"], json!(0));
    assert!(payload.get("show_searchers_and_regions").is_none());
}

#[tokio::test]
async fn summary_chart_defaults_type_range() {
    let transport = RecordingTransport::ok();
    let params = SummaryChartParams::new(3, 1, DateSpec::list(["2024-01-01", "2024-02-01"]));

    client(&transport).get_summary_chart(&params).await.unwrap();

    let payload = transport.last_payload();
    assert_eq!(payload["type_range"], json!(2));
    assert_eq!(payload["dates"], json!(["2024-01-01", "2024-02-01"]));
}

#[tokio::test]
async fn universal_params_do_not_override_operation_values() {
    let transport = RecordingTransport::ok();
    let mut params = SummaryParams::new(3, 1, "2024-01-01", "2024-01-08");
    params.universal.limit = Some(10);
    params.universal.fields = Some(vec!["name".into()]);

    client(&transport).get_summary(&params).await.unwrap();

    let payload = transport.last_payload();
    assert_eq!(payload["project_id"], json!(3));
    assert_eq!(payload["limit"], json!(10));
    assert_eq!(payload["fields"], json!(["name"]));
    assert_eq!(payload["dates"], json!(["2024-01-01", "2024-01-08"]));
}

#[tokio::test]
async fn service_errors_in_success_responses_are_raised() {
    let transport = RecordingTransport::answering(
        200,
        r#"{"errors":[{"code":53,"string":"Authorization failed","detail":"bad key"},{"code":1000,"string":"ignored"}]}"#,
    );
    let err = client(&transport)
        .execute("get_projects", Arguments::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
    assert_eq!(
        err.fault().unwrap().to_string(),
        "[53] Authorization failed. bad key"
    );
}

#[tokio::test]
async fn export_error_document_is_raised() {
    let transport = RecordingTransport::answering(
        200,
        r#"{"result":null,"errors":[{"code":53,"string":"Authorization failed"}]}"#,
    );
    let client = client(&transport);

    let err = client
        .execute("get_searchers_regions", args(json!({"project_id": 1})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert_eq!(
        err.fault().unwrap().to_string(),
        "[53] Authorization failed"
    );

    let err = client
        .get_searchers_regions(&SearchersRegionsParams::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn export_failure_body_is_transcoded() {
    // "Ошибка" in Windows-1251
    let transport = RecordingTransport::answering(503, b"\xce\xf8\xe8\xe1\xea\xe0".to_vec());
    let err = client(&transport)
        .execute("get_searchers_regions", args(json!({"project_id": 1})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Server(_)));
    assert_eq!(err.fault().unwrap().message, "Ошибка");
}

#[tokio::test]
async fn empty_error_list_is_success() {
    let transport = RecordingTransport::answering(200, r#"{"result":{"price":1.5},"errors":[]}"#);
    let response = client(&transport)
        .execute_operation(Operation::GetCheckerPrice, &args(json!({"project_id": 1})))
        .await
        .unwrap()
        .into_structured()
        .unwrap();
    assert_eq!(response.result, json!({"price": 1.5}));
    assert!(!response.has_errors());
}

#[tokio::test]
async fn prepare_exposes_the_request_without_sending() {
    let transport = RecordingTransport::ok();
    let client = client(&transport);
    let prepared = client
        .prepare(
            Operation::GetSearchersRegions,
            &args(json!({"project_id": 4, "region_name": "Moscow", "device": 2})),
        )
        .unwrap();

    assert_eq!(
        prepared.endpoint,
        "/v2/json/get/positions_2/searchers/regions/export"
    );
    assert_eq!(prepared.payload.get("region.name"), Some(&json!("Moscow")));
    assert!(!prepared.payload.contains_key("region_name"));
    assert!(transport.calls().is_empty());
}
