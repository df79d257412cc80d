mod common;

use std::time::Duration;

use common::{Call, FakeBus, ScanBehavior, gateway, wifi_service};
use netsetup::ConnectionError;

fn home_net_appears_on_scan(bus: &FakeBus) {
    bus.on_scan(ScanBehavior::Emit {
        payload: vec![wifi_service("HomeNet", "02")],
        discovered: vec![wifi_service("HomeNet", "02")],
    });
}

#[tokio::test]
async fn connect_scans_then_connects_and_agent_answers() {
    let bus = FakeBus::new();
    home_net_appears_on_scan(&bus);
    let gw = gateway(&bus, Duration::from_secs(2)).await;

    gw.connect("HomeNet", "secret123").await.unwrap();

    let target = wifi_service("HomeNet", "02").path.to_string();
    let scan = bus.position(|c| matches!(c, Call::Scan(_))).unwrap();
    let connect = bus.position(|c| *c == Call::Connect(target.clone())).unwrap();
    assert!(scan < connect);

    let answers = bus.agent_answers();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].get("Passphrase").map(String::as_str), Some("secret123"));

    // credentials stay loaded for later challenges
    let again = gw.agent().request_input(&target, &["Passphrase"]);
    assert_eq!(again.get("Passphrase").map(String::as_str), Some("secret123"));
}

#[tokio::test]
async fn connect_to_missing_network_never_connects() {
    let bus = FakeBus::new();
    bus.add_services(vec![wifi_service("Cafe", "03")]);
    let gw = gateway(&bus, Duration::from_millis(50)).await;

    let err = gw.connect("HomeNet", "secret123").await.unwrap_err();

    assert!(matches!(err, ConnectionError::ServiceNotFound(ref n) if n == "HomeNet"));
    assert_eq!(bus.count(|c| matches!(c, Call::Connect(_))), 0);
}

#[tokio::test]
async fn connect_matches_names_case_sensitively() {
    let bus = FakeBus::new();
    home_net_appears_on_scan(&bus);
    let gw = gateway(&bus, Duration::from_secs(2)).await;

    let err = gw.connect("homenet", "secret123").await.unwrap_err();

    assert!(matches!(err, ConnectionError::ServiceNotFound(_)));
    assert_eq!(bus.count(|c| matches!(c, Call::Connect(_))), 0);
}

#[tokio::test]
async fn connect_failure_is_reported() {
    let bus = FakeBus::new();
    home_net_appears_on_scan(&bus);
    bus.fail_connect("net.connman.Error.InvalidKey");
    let gw = gateway(&bus, Duration::from_secs(2)).await;

    let err = gw.connect("HomeNet", "wrongpass").await.unwrap_err();

    assert!(matches!(err, ConnectionError::ConnectFailed(ref r) if r.contains("InvalidKey")));
}

#[tokio::test]
async fn connect_during_scan_is_rejected() {
    let bus = FakeBus::new();
    let gw = gateway(&bus, Duration::from_millis(100)).await;

    let (scan, connect) = futures::join!(gw.scan(), gw.connect("HomeNet", "secret123"));

    assert!(scan.is_ok());
    assert!(matches!(connect, Err(ConnectionError::AlreadyInProgress)));
    // rejected before the agent was touched
    assert!(gw.agent().credentials().is_none());
}

#[tokio::test]
async fn agent_is_registered_once() {
    let bus = FakeBus::new();
    home_net_appears_on_scan(&bus);
    let gw = gateway(&bus, Duration::from_secs(2)).await;

    gw.connect("HomeNet", "secret123").await.unwrap();
    gw.connect("HomeNet", "another-pass").await.unwrap();

    let registrations: Vec<Call> = bus
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::RegisterAgent(_)))
        .collect();
    assert_eq!(
        registrations,
        [Call::RegisterAgent(gw.config().agent_path.clone())]
    );

    let latest = bus.agent_answers().pop().unwrap();
    assert_eq!(latest.get("Passphrase").map(String::as_str), Some("another-pass"));
}
