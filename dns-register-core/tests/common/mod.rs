//! Shared helpers for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use dns_register_core::{DnsRegistrar, EngineOptions, Record};
use dns_register_provider::{Capabilities, MemoryProvider, ProviderRecord};

/// Assert an `Option` is `Some` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

pub const ZONE: &str = "example.com";

pub fn a(name: &str, ip: &str, ttl: u32) -> ProviderRecord {
    ProviderRecord::Address {
        name: name.to_string(),
        ip: ip.parse().unwrap(),
        ttl,
    }
}

pub fn marker(target: &str, owner: &str) -> ProviderRecord {
    ProviderRecord::Txt {
        name: format!("_cdr.{target}"),
        text: format!("owner={owner},heritage=caddy-dns-register"),
        ttl: 300,
    }
}

/// A provider holding `ZONE` with `records`.
pub async fn seeded_provider(
    capabilities: Capabilities,
    records: Vec<ProviderRecord>,
) -> Arc<MemoryProvider> {
    let provider = Arc::new(MemoryProvider::with_capabilities(capabilities));
    provider.add_zone(ZONE, records).await;
    provider
}

/// Engine for `owner` managing `ZONE` through `provider`.
pub fn registrar(
    owner: &str,
    options: EngineOptions,
    provider: &Arc<MemoryProvider>,
    declared: Vec<Record>,
) -> DnsRegistrar {
    let mut registrar = DnsRegistrar::new(owner, options);
    registrar.add_zone(ZONE, provider.clone(), declared).unwrap();
    registrar
}

/// Zone contents sorted by their display form, for order-independent comparison.
pub async fn contents(provider: &MemoryProvider) -> Vec<String> {
    let mut records: Vec<String> = provider
        .snapshot(ZONE)
        .await
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect();
    records.sort();
    records
}
