//! End-to-end reconciliation tests against the in-memory provider

mod common;

use std::sync::Arc;

use common::{a, contents, marker, registrar, seeded_provider, ZONE};
use dns_register_core::{
    ApplyAction, DnsRegistrar, EngineOptions, InMemoryProviderRegistry, OutcomeStatus,
    PlanSummary, ProviderRegistry, Record, RegisterConfig, ZoneState,
};
use dns_register_provider::{Capabilities, MemoryProvider};

fn append_only() -> Capabilities {
    Capabilities {
        get: true,
        append: true,
        ..Capabilities::default()
    }
}

// ============ Scenarios ============

#[tokio::test]
async fn creates_record_and_marker_in_empty_zone() {
    let provider = seeded_provider(Capabilities::ALL, Vec::new()).await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![Record::new("www", "A", "192.0.2.1").with_ttl(300)],
    );

    let report = require_ok!(engine.reconcile_zone(ZONE).await);

    let plan = require_some!(report.plan);
    assert_eq!((plan.create, plan.update, plan.delete), (1, 0, 0));
    assert_eq!(
        contents(&provider).await,
        vec![
            "_cdr.www 300 TXT owner=X,heritage=caddy-dns-register",
            "www 300 A 192.0.2.1",
        ]
    );
}

#[tokio::test]
async fn changed_value_is_an_update_only() {
    let provider = seeded_provider(
        Capabilities::ALL,
        vec![a("www", "192.0.2.1", 300), marker("www", "X")],
    )
    .await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![Record::new("www", "A", "192.0.2.2").with_ttl(300)],
    );

    let report = require_ok!(engine.reconcile_zone(ZONE).await);

    let plan = require_some!(report.plan);
    assert_eq!((plan.create, plan.update, plan.delete), (0, 1, 0));
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].action, ApplyAction::Update);
    assert_eq!(report.outcomes[0].value.as_deref(), Some("192.0.2.2"));
    assert_eq!(
        contents(&provider).await,
        vec![
            "_cdr.www 300 TXT owner=X,heritage=caddy-dns-register",
            "www 300 A 192.0.2.2",
        ]
    );
}

#[tokio::test]
async fn undeclared_owned_record_is_deleted_with_marker() {
    let provider = seeded_provider(
        Capabilities::ALL,
        vec![a("www", "192.0.2.1", 300), marker("www", "X")],
    )
    .await;
    let engine = registrar("X", EngineOptions::default(), &provider, Vec::new());

    let report = require_ok!(engine.reconcile_zone(ZONE).await);

    let plan = require_some!(report.plan);
    assert_eq!((plan.create, plan.update, plan.delete), (0, 0, 1));
    assert!(report.is_clean());
    assert!(contents(&provider).await.is_empty());
}

#[tokio::test]
async fn manual_record_is_never_deleted() {
    let provider = seeded_provider(Capabilities::ALL, vec![a("manual", "10.0.0.1", 300)]).await;
    let engine = registrar("X", EngineOptions::default(), &provider, Vec::new());

    let report = require_ok!(engine.reconcile_zone(ZONE).await);

    let plan = require_some!(report.plan);
    assert_eq!(plan.delete, 0);
    assert_eq!(contents(&provider).await, vec!["manual 300 A 10.0.0.1"]);
}

#[tokio::test]
async fn declared_record_over_manual_record_is_not_adopted_by_update() {
    let provider = seeded_provider(Capabilities::ALL, vec![a("www", "10.0.0.1", 300)]).await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![Record::new("www", "A", "192.0.2.1")],
    );

    let report = require_ok!(engine.reconcile_zone(ZONE).await);

    let plan = require_some!(report.plan);
    assert_eq!((plan.create, plan.update), (1, 0));
}

// ============ Properties ============

#[tokio::test]
async fn second_pass_is_empty() {
    let provider = seeded_provider(
        Capabilities::ALL,
        vec![
            a("stale", "192.0.2.50", 300),
            marker("stale", "X"),
            a("www", "192.0.2.1", 3600),
            marker("www", "X"),
        ],
    )
    .await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![
            Record::new("www", "A", "192.0.2.1").with_ttl(60),
            Record::new("v6", "AAAA", "2001:db8::1"),
            Record::new("alias", "CNAME", "www.example.com."),
            Record::new("@", "TXT", "v=spf1 -all"),
            Record::new("@", "MX", "10 mail.example.com."),
            Record::new("_sip._tcp", "SRV", "10 5 5060 sip.example.com."),
        ],
    );

    let first = engine.run_pass().await;
    assert!(first.is_clean());

    let second = engine.run_pass().await;
    let zone = require_some!(second.zone(ZONE));
    let plan = require_some!(zone.plan);
    assert_eq!(plan, PlanSummary::default());
    assert!(zone.outcomes.is_empty());
}

#[tokio::test]
async fn owners_sharing_a_zone_leave_each_other_alone() {
    let provider = seeded_provider(Capabilities::ALL, vec![a("manual", "10.0.0.1", 300)]).await;
    let edge_a = registrar(
        "edge-a",
        EngineOptions::default(),
        &provider,
        vec![Record::new("a", "A", "192.0.2.1")],
    );
    let edge_b = registrar(
        "edge-b",
        EngineOptions::default(),
        &provider,
        vec![Record::new("b", "A", "192.0.2.2")],
    );

    assert!(edge_a.run_pass().await.is_clean());
    assert!(edge_b.run_pass().await.is_clean());
    assert!(require_some!(edge_a.run_pass().await.zone(ZONE).cloned())
        .outcomes
        .is_empty());

    let edge_a = registrar("edge-a", EngineOptions::default(), &provider, Vec::new());
    let report = require_ok!(edge_a.reconcile_zone(ZONE).await);
    assert_eq!(require_some!(report.plan).delete, 1);

    assert_eq!(
        contents(&provider).await,
        vec![
            "_cdr.b 300 TXT owner=edge-b,heritage=caddy-dns-register",
            "b 300 A 192.0.2.2",
            "manual 300 A 10.0.0.1",
        ]
    );
}

#[tokio::test]
async fn foreign_marker_does_not_grant_ownership() {
    let provider = seeded_provider(
        Capabilities::ALL,
        vec![a("www", "192.0.2.1", 300), marker("www", "someone-else")],
    )
    .await;
    let engine = registrar("X", EngineOptions::default(), &provider, Vec::new());

    let report = require_ok!(engine.reconcile_zone(ZONE).await);

    assert!(report.outcomes.is_empty());
    assert_eq!(contents(&provider).await.len(), 2);
}

#[tokio::test]
async fn name_claimed_by_another_owner_is_never_written() {
    let provider = seeded_provider(
        Capabilities::ALL,
        vec![a("www", "192.0.2.1", 300), marker("www", "Y")],
    )
    .await;
    let before = contents(&provider).await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![Record::new("www", "AAAA", "2001:db8::1")],
    );

    for _ in 0..2 {
        let report = require_ok!(engine.reconcile_zone(ZONE).await);
        assert_eq!(report.state, ZoneState::Done);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].action, ApplyAction::Create);
        assert!(matches!(report.outcomes[0].status, OutcomeStatus::Failed { .. }));
    }

    assert_eq!(contents(&provider).await, before);
}

// ============ Capabilities & failures ============

#[tokio::test]
async fn append_only_provider_creates_but_reports_unsupported_phases() {
    let provider = seeded_provider(
        append_only(),
        vec![
            a("old", "192.0.2.9", 300),
            marker("old", "X"),
            a("www", "192.0.2.1", 300),
            marker("www", "X"),
        ],
    )
    .await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![
            Record::new("www", "A", "192.0.2.2"),
            Record::new("new", "A", "192.0.2.3"),
        ],
    );

    let report = require_ok!(engine.reconcile_zone(ZONE).await);

    assert_eq!(report.state, ZoneState::Done);
    let statuses: Vec<(ApplyAction, &OutcomeStatus)> = report
        .outcomes
        .iter()
        .map(|o| (o.action, &o.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (ApplyAction::Delete, &OutcomeStatus::Unsupported),
            (ApplyAction::Create, &OutcomeStatus::Applied),
            (ApplyAction::Update, &OutcomeStatus::Unsupported),
        ]
    );
    assert!(contents(&provider)
        .await
        .contains(&"_cdr.new 300 TXT owner=X,heritage=caddy-dns-register".to_string()));
}

#[test]
fn provider_without_writes_is_rejected_at_setup() {
    let provider = Arc::new(MemoryProvider::with_capabilities(Capabilities {
        get: true,
        delete: true,
        ..Capabilities::default()
    }));
    let mut engine = DnsRegistrar::new("X", EngineOptions::default());

    let result = engine.add_zone(ZONE, provider, Vec::new());

    assert!(result.is_err());
    assert!(engine.zones().is_empty());
}

#[tokio::test]
async fn failed_fetch_does_not_stop_other_zones() {
    let provider = Arc::new(MemoryProvider::new());
    provider.add_zone("good.example", Vec::new()).await;
    let mut engine = DnsRegistrar::new("X", EngineOptions::default());
    require_ok!(engine.add_zone(
        "missing.example",
        provider.clone(),
        vec![Record::new("www", "A", "192.0.2.1")],
    ));
    require_ok!(engine.add_zone(
        "good.example",
        provider.clone(),
        vec![Record::new("www", "A", "192.0.2.1")],
    ));

    let report = engine.run_pass().await;

    assert_eq!(report.failed_zones(), vec!["missing.example"]);
    let good = require_some!(report.zone("good.example"));
    assert_eq!(good.state, ZoneState::Done);
    assert!(good.is_clean());
    assert!(!report.is_clean());
}

// ============ Options ============

#[tokio::test]
async fn enforce_default_ttl_resets_drifted_ttl() {
    let provider = seeded_provider(
        Capabilities::ALL,
        vec![a("www", "192.0.2.1", 3600), marker("www", "X")],
    )
    .await;
    let declared = vec![Record::new("www", "A", "192.0.2.1")];

    let lenient = registrar("X", EngineOptions::default(), &provider, declared.clone());
    let report = require_ok!(lenient.reconcile_zone(ZONE).await);
    assert!(report.outcomes.is_empty());

    let strict = registrar(
        "X",
        EngineOptions {
            enforce_default_ttl: true,
            ..EngineOptions::default()
        },
        &provider,
        declared,
    );
    let report = require_ok!(strict.reconcile_zone(ZONE).await);
    assert_eq!(require_some!(report.plan).update, 1);
    assert!(contents(&provider)
        .await
        .contains(&"www 300 A 192.0.2.1".to_string()));
}

#[tokio::test]
async fn concurrent_zones_keep_report_order() {
    let provider = Arc::new(MemoryProvider::new());
    let mut engine = DnsRegistrar::new(
        "X",
        EngineOptions {
            zone_concurrency: 4,
            ..EngineOptions::default()
        },
    );
    let zones = ["a.example", "b.example", "c.example", "d.example", "e.example"];
    for zone in zones {
        provider.add_zone(zone, Vec::new()).await;
        require_ok!(engine.add_zone(
            zone,
            provider.clone(),
            vec![Record::new("www", "A", "192.0.2.1")],
        ));
    }

    let report = engine.run_pass().await;

    let reported: Vec<&str> = report.zones.iter().map(|z| z.zone.as_str()).collect();
    assert_eq!(reported, zones);
    assert!(report.is_clean());
}

// ============ Configuration ============

#[tokio::test]
async fn provisions_from_json_with_named_and_inline_providers() {
    let registry = InMemoryProviderRegistry::new();
    let named = Arc::new(MemoryProvider::new());
    named.add_zone("named.example", Vec::new()).await;
    require_ok!(registry.register("primary".to_string(), named.clone()).await);

    let config = require_ok!(RegisterConfig::from_json_str(
        r#"{
            "ownerId": "edge-1",
            "options": { "sweepOrphanMarkers": true },
            "zones": [
                {
                    "zone": "named.example",
                    "provider": "primary",
                    "records": [{ "name": "www", "type": "A", "value": "192.0.2.1" }]
                },
                {
                    "zone": "inline.example",
                    "provider": {
                        "provider": "memory",
                        "config": {
                            "zones": {
                                "inline.example": [
                                    { "kind": "address", "name": "manual", "ip": "10.0.0.1", "ttl": 300 },
                                    { "kind": "txt", "name": "_cdr.gone", "text": "owner=edge-1,heritage=caddy-dns-register", "ttl": 300 }
                                ]
                            }
                        }
                    },
                    "records": [{ "name": "api", "type": "CNAME", "value": "www.named.example." }]
                },
                { "zone": "orphan.example", "provider": "unregistered" }
            ]
        }"#
    ));

    let engine = DnsRegistrar::provision(config, &registry).await;

    assert_eq!(engine.owner_id(), "edge-1");
    assert_eq!(engine.zones().len(), 2);
    assert_eq!(engine.setup_errors().len(), 1);

    let report = engine.run_pass().await;
    assert!(report.is_clean());

    let inline = require_some!(report.zone("inline.example"));
    let actions: Vec<(ApplyAction, &str)> = inline
        .outcomes
        .iter()
        .map(|o| (o.action, o.name.as_str()))
        .collect();
    assert_eq!(
        actions,
        vec![(ApplyAction::SweepMarker, "_cdr.gone"), (ApplyAction::Create, "api")]
    );
    let named_zone = require_some!(named.snapshot("named.example").await);
    assert_eq!(named_zone.len(), 2);
}

#[tokio::test]
async fn run_report_serializes_for_hosts() {
    let provider = seeded_provider(Capabilities::ALL, Vec::new()).await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![Record::new("www", "A", "192.0.2.1")],
    );

    let report = engine.run_pass().await;
    let json = require_ok!(serde_json::to_value(&report));

    assert!(json["passId"].is_string());
    assert_eq!(json["zones"][0]["state"], "done");
    assert_eq!(json["zones"][0]["plan"]["create"], 1);
    assert_eq!(json["zones"][0]["outcomes"][0]["status"], "applied");
    assert_eq!(json["zones"][0]["outcomes"][0]["value"], "192.0.2.1");
}

#[tokio::test]
async fn stopped_engine_reports_cancelled_zones() {
    let provider = seeded_provider(Capabilities::ALL, Vec::new()).await;
    let engine = registrar(
        "X",
        EngineOptions::default(),
        &provider,
        vec![Record::new("www", "A", "192.0.2.1")],
    );

    engine.stop();
    let report = engine.run_pass().await;

    assert_eq!(report.zones[0].state, ZoneState::Cancelled);
    assert_eq!(report.zones[0].error.as_deref(), Some("Operation cancelled"));
    assert!(!report.is_clean());
    assert!(contents(&provider).await.is_empty());
}
