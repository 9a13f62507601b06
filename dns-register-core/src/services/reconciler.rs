//! Zone reconciler
//!
//! [`DnsRegistrar`] owns the provisioned zones and runs reconciliation passes.
//! Per zone a pass goes `Fetching -> Classifying -> Diffing -> ApplyingDeletes ->
//! ApplyingCreates -> ApplyingUpdates -> Done`. A failed fetch ends the zone in
//! `ZoneFailed` for this pass only; write failures never fail the zone.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use dns_register_provider::{Capabilities, DnsProvider};

use super::apply::{cancellable, ApplyDriver};
use super::diff::{diff, DiffOptions};
use super::ownership::classify;
use crate::config::{EngineOptions, MarkerFormat, RegisterConfig, ZoneConfig};
use crate::error::{CoreError, CoreResult};
use crate::traits::{ensure_usable, ProviderRegistry};
use crate::types::{Record, RunReport, ZoneReport, ZoneState};

/// A zone accepted at provisioning time.
pub struct ManagedZone {
    pub name: String,
    pub provider: Arc<dyn DnsProvider>,
    /// Checked once when the zone is added.
    pub capabilities: Capabilities,
    pub records: Vec<Record>,
}

/// Reconciliation engine for a set of zones.
pub struct DnsRegistrar {
    format: MarkerFormat,
    options: EngineOptions,
    zones: Vec<ManagedZone>,
    setup_errors: Vec<CoreError>,
    cancel: CancellationToken,
}

impl DnsRegistrar {
    pub fn new(owner_id: impl Into<String>, options: EngineOptions) -> Self {
        Self {
            format: MarkerFormat::new(owner_id),
            options,
            zones: Vec::new(),
            setup_errors: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Builds an engine from declared configuration.
    ///
    /// Zones whose provider cannot be resolved or lacks required capabilities are
    /// left out and reported by [`setup_errors`](Self::setup_errors).
    pub async fn provision(config: RegisterConfig, registry: &dyn ProviderRegistry) -> Self {
        let mut registrar = Self::new(config.effective_owner_id(), config.options.clone());
        log::info!(
            "Provisioning {} zone(s) as owner '{}'",
            config.zones.len(),
            registrar.format.owner_id
        );

        for zone in config.zones {
            if let Err(err) = registrar.provision_zone(zone, registry).await {
                if err.is_expected() {
                    log::warn!("{err}");
                } else {
                    log::error!("{err}");
                }
                registrar.setup_errors.push(err);
            }
        }
        registrar
    }

    async fn provision_zone(
        &mut self,
        zone: ZoneConfig,
        registry: &dyn ProviderRegistry,
    ) -> CoreResult<()> {
        let provider = registry.resolve(&zone.provider).await.map_err(|err| match err {
            CoreError::Provider(source) => CoreError::Setup {
                zone: zone.zone.clone(),
                reason: source.to_string(),
            },
            other => other,
        })?;
        self.add_zone(zone.zone, provider, zone.records)
    }

    /// Adds a zone after checking its provider can fetch and write records.
    ///
    /// Declared records may not use marker names.
    pub fn add_zone(
        &mut self,
        zone: impl Into<String>,
        provider: Arc<dyn DnsProvider>,
        records: Vec<Record>,
    ) -> CoreResult<()> {
        let name = zone.into();
        let capabilities = provider.capabilities();

        if let Err(source) = ensure_usable(provider.as_ref()) {
            return Err(CoreError::Setup {
                zone: name,
                reason: source.to_string(),
            });
        }
        if let Some(record) = records.iter().find(|r| self.format.is_marker_name(&r.name)) {
            return Err(CoreError::Setup {
                zone: name,
                reason: format!(
                    "record '{}' uses the reserved prefix '{}'",
                    record.name, self.format.prefix
                ),
            });
        }
        if self.zones.iter().any(|z| z.name == name) {
            return Err(CoreError::Setup {
                zone: name,
                reason: "zone is already managed".to_string(),
            });
        }

        log::debug!(
            "Managing zone {name} via '{}' ({capabilities}), {} declared record(s)",
            provider.id(),
            records.len()
        );
        self.zones.push(ManagedZone {
            name,
            provider,
            capabilities,
            records,
        });
        Ok(())
    }

    pub fn owner_id(&self) -> &str {
        &self.format.owner_id
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn zones(&self) -> &[ManagedZone] {
        &self.zones
    }

    /// Zones rejected while provisioning.
    pub fn setup_errors(&self) -> &[CoreError] {
        &self.setup_errors
    }

    /// Cancels the running pass and every later one.
    pub fn stop(&self) {
        log::info!("Stopping DNS registrar");
        self.cancel.cancel();
    }

    /// Reconciles every managed zone once.
    pub async fn run_pass(&self) -> RunReport {
        let pass_id = Uuid::new_v4();
        let started_at = Utc::now();
        log::info!("Reconciliation pass {pass_id} started for {} zone(s)", self.zones.len());

        let runs = self.zones.iter().map(|zone| self.reconcile(zone));
        let zones: Vec<ZoneReport> = stream::iter(runs)
            .buffered(self.options.zone_concurrency.max(1))
            .collect()
            .await;

        let report = RunReport {
            pass_id,
            started_at,
            finished_at: Utc::now(),
            zones,
        };
        let failed = report.failed_zones();
        if failed.is_empty() {
            log::info!("Reconciliation pass {pass_id} finished");
        } else {
            log::warn!(
                "Reconciliation pass {pass_id} finished, zone(s) failed: {}",
                failed.join(", ")
            );
        }
        report
    }

    /// Reconciles a single managed zone.
    pub async fn reconcile_zone(&self, zone: &str) -> CoreResult<ZoneReport> {
        let managed = self
            .zones
            .iter()
            .find(|z| z.name == zone)
            .ok_or_else(|| CoreError::ZoneNotManaged(zone.to_string()))?;
        Ok(self.reconcile(managed).await)
    }

    async fn reconcile(&self, zone: &ManagedZone) -> ZoneReport {
        let mut run = ZoneRun::new(&zone.name);

        run.enter(ZoneState::Fetching);
        let fetched = cancellable(&self.cancel, zone.provider.get_records(&zone.name)).await;
        let snapshot = match fetched {
            None => return run.cancel(),
            Some(Ok(snapshot)) => snapshot,
            Some(Err(source)) => {
                let transient = source.is_transient();
                let err = CoreError::Fetch {
                    zone: zone.name.clone(),
                    source,
                };
                if transient {
                    log::warn!("{err}, retrying next pass");
                } else if err.is_expected() {
                    log::warn!("{err}");
                } else {
                    log::error!("{err}");
                }
                run.report.error = Some(err.to_string());
                return run.finish(ZoneState::ZoneFailed);
            }
        };
        log::debug!("[{}] fetched {} record(s)", zone.name, snapshot.len());

        run.enter(ZoneState::Classifying);
        let ownership = classify(&snapshot, &self.format);

        run.enter(ZoneState::Diffing);
        let mut plan = diff(
            &ownership.owned,
            &zone.records,
            DiffOptions {
                enforce_default_ttl: self.options.enforce_default_ttl,
            },
        );
        if self.options.sweep_orphan_markers {
            plan.orphan_markers = ownership.orphan_markers();
        }
        let summary = plan.summary();
        run.report.plan = Some(summary);
        if plan.is_empty() {
            log::debug!("[{}] in sync", zone.name);
        } else {
            log::info!("[{}] plan: {summary}", zone.name);
        }

        let mut driver = ApplyDriver::new(
            &zone.name,
            zone.provider.as_ref(),
            zone.capabilities,
            &self.format,
            &ownership,
            &self.cancel,
        );

        run.enter(ZoneState::ApplyingDeletes);
        run.report.outcomes.extend(driver.apply_deletes(&plan).await);
        run.enter(ZoneState::ApplyingCreates);
        run.report.outcomes.extend(driver.apply_creates(&plan).await);
        run.enter(ZoneState::ApplyingUpdates);
        run.report.outcomes.extend(driver.apply_updates(&plan).await);

        if self.cancel.is_cancelled() {
            return run.cancel();
        }
        let unapplied = run.report.unapplied_count();
        if unapplied > 0 {
            log::warn!(
                "[{}] {unapplied} of {} change(s) not applied",
                zone.name,
                run.report.outcomes.len()
            );
        }
        run.finish(ZoneState::Done)
    }
}

/// Report under construction for one zone.
struct ZoneRun {
    report: ZoneReport,
}

impl ZoneRun {
    fn new(zone: &str) -> Self {
        let now = Utc::now();
        Self {
            report: ZoneReport {
                zone: zone.to_string(),
                state: ZoneState::Fetching,
                plan: None,
                outcomes: Vec::new(),
                error: None,
                started_at: now,
                finished_at: now,
            },
        }
    }

    fn enter(&mut self, state: ZoneState) {
        log::debug!("[{}] {state}", self.report.zone);
        self.report.state = state;
    }

    fn cancel(mut self) -> ZoneReport {
        self.report.error = Some(CoreError::Cancelled.to_string());
        self.finish(ZoneState::Cancelled)
    }

    fn finish(mut self, state: ZoneState) -> ZoneReport {
        self.enter(state);
        self.report.finished_at = Utc::now();
        self.report
    }
}
