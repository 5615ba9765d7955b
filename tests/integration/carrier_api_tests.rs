use kleinwatch::config::ScraperConfig;
use kleinwatch::tracking::{normalize_tracking_result, CarrierApi, Carrier, TrackingClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> ScraperConfig {
    ScraperConfig {
        user_agent: "TestAgent/1.0".to_string(),
        request_timeout: 5,
        tracking_timeout: 5,
    }
}

async fn client_for(server: &MockServer) -> CarrierApi {
    CarrierApi::new(&test_config())
        .unwrap()
        .with_endpoints(&server.uri(), &server.uri())
}

#[tokio::test]
async fn test_dhl_fetch_and_normalize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/int-verfolgen/data/search"))
        .and(query_param("piececode", "00340434292135100100"))
        .and(query_param("language", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sendungen": [{
                "hasCompleteDetails": true,
                "sendungsdetails": {
                    "sendungsverlauf": {
                        "aktuellerStatus": "Die Sendung wurde in die Zustellbasis gebracht",
                        "events": [
                            { "datum": "2026-02-01T08:15:00Z", "status": "Abgeholt" },
                            { "datum": "2026-02-02T06:00:00Z", "status": "In Zustellbasis" }
                        ]
                    }
                }
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let payload = client
        .fetch_raw_status("00340434292135100100", Carrier::Dhl)
        .await
        .unwrap();

    let snapshot = normalize_tracking_result("00340434292135100100", &payload);
    assert_eq!(snapshot.carrier, Carrier::Dhl);
    assert_eq!(snapshot.progress, 80);
    assert_eq!(snapshot.history.len(), 2);
    assert_eq!(snapshot.history[0].time, "01.02.2026, 08:15");
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_hermes_fetch_and_normalize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tnt/parcelservice/parceldetails/12345678901234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": {
                "text": {
                    "longText": "Die Sendung wurde zugestellt",
                    "shortText": "Zugestellt"
                }
            },
            "parcelHistory": [
                { "timestamp": "2026-02-03T11:45:00Z", "status": "ZUGESTELLT" }
            ],
            "metaInformation": { "destination": "Hamburg" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let payload = client
        .fetch_raw_status("12345678901234", Carrier::Hermes)
        .await
        .unwrap();

    let snapshot = normalize_tracking_result("12345678901234", &payload);
    assert_eq!(snapshot.carrier, Carrier::Hermes);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.destination.as_deref(), Some("Hamburg"));
    assert_eq!(snapshot.history[0].text, "Delivered");
}

#[tokio::test]
async fn test_hermes_non_json_response_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client.fetch_raw_status("12345678901234", Carrier::Hermes).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_dhl_server_error_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client
        .fetch_raw_status("00340434292135100100", Carrier::Dhl)
        .await;
    assert!(result.is_err());
}
