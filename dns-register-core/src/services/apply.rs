//! Apply driver
//!
//! Executes a [`ReconciliationPlan`] against a provider in three phases:
//! deletes, then creates, then updates. Each item is written on its own and a
//! failing item never stops the items after it. Every item yields exactly one
//! [`ApplyOutcome`].

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use tokio_util::sync::CancellationToken;

use dns_register_provider::{Capabilities, DnsProvider, ProviderRecord, RecordType};

use super::codec;
use super::ownership::Ownership;
use crate::config::MarkerFormat;
use crate::error::CoreError;
use crate::types::{ApplyAction, ApplyOutcome, OutcomeStatus, ReconciliationPlan, Record};
use crate::utils::log_sanitizer::truncate_for_log;

type ProviderResult<T> = dns_register_provider::Result<T>;

/// Runs a provider call unless `cancel` fires first. `None` means cancelled.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = ProviderResult<T>>,
) -> Option<ProviderResult<T>> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        result = call => Some(result),
    }
}

/// Writes one zone's plan through its provider.
pub struct ApplyDriver<'a> {
    zone: &'a str,
    provider: &'a dyn DnsProvider,
    capabilities: Capabilities,
    format: &'a MarkerFormat,
    ownership: &'a Ownership,
    cancel: &'a CancellationToken,
    /// Names whose marker of this instance currently exists in the zone.
    live_markers: BTreeSet<String>,
}

impl<'a> ApplyDriver<'a> {
    pub fn new(
        zone: &'a str,
        provider: &'a dyn DnsProvider,
        capabilities: Capabilities,
        format: &'a MarkerFormat,
        ownership: &'a Ownership,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            zone,
            provider,
            capabilities,
            format,
            ownership,
            cancel,
            live_markers: ownership.markers.keys().cloned().collect(),
        }
    }

    /// Runs all three phases in order.
    pub async fn apply(&mut self, plan: &ReconciliationPlan) -> Vec<ApplyOutcome> {
        let mut outcomes = self.apply_deletes(plan).await;
        outcomes.extend(self.apply_creates(plan).await);
        outcomes.extend(self.apply_updates(plan).await);
        outcomes
    }

    /// Deletes every record in `to_delete` and sweeps `orphan_markers`.
    ///
    /// A marker is removed together with the last deleted record at its name, and
    /// only when no owned record at that name survives and no earlier delete at that
    /// name failed.
    pub async fn apply_deletes(&mut self, plan: &ReconciliationPlan) -> Vec<ApplyOutcome> {
        let mut outcomes = Vec::with_capacity(plan.to_delete.len() + plan.orphan_markers.len());

        if !self.capabilities.delete {
            if !plan.to_delete.is_empty() || !plan.orphan_markers.is_empty() {
                log::warn!(
                    "[{}] Provider '{}' cannot delete records, skipping {} delete(s)",
                    self.zone,
                    self.provider.id(),
                    plan.to_delete.len() + plan.orphan_markers.len()
                );
            }
            for key in &plan.to_delete {
                outcomes.push(unapplied(
                    ApplyAction::Delete,
                    &key.name,
                    &key.record_type,
                    OutcomeStatus::Unsupported,
                ));
            }
            for marker in &plan.orphan_markers {
                outcomes.push(unapplied(
                    ApplyAction::SweepMarker,
                    marker.name(),
                    &RecordType::Txt,
                    OutcomeStatus::Unsupported,
                ));
            }
            return outcomes;
        }

        let surviving: BTreeSet<&str> = self
            .ownership
            .owned
            .keys()
            .filter(|key| !plan.to_delete.contains(key))
            .map(|key| key.name.as_str())
            .collect();
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        for key in &plan.to_delete {
            *pending.entry(key.name.as_str()).or_default() += 1;
        }
        let mut failed_names: BTreeSet<&str> = BTreeSet::new();

        for key in &plan.to_delete {
            let name = key.name.as_str();
            let remaining = pending.get_mut(name).map_or(0, |count| {
                *count -= 1;
                *count
            });

            let Some(current) = self.ownership.owned.get(key) else {
                failed_names.insert(name);
                outcomes.push(unapplied(
                    ApplyAction::Delete,
                    name,
                    &key.record_type,
                    OutcomeStatus::Failed {
                        reason: "record is not in the owned index".to_string(),
                    },
                ));
                continue;
            };
            if self.cancel.is_cancelled() {
                outcomes.push(unapplied(
                    ApplyAction::Delete,
                    name,
                    &key.record_type,
                    OutcomeStatus::Cancelled,
                ));
                continue;
            }

            let mut records = vec![codec::to_provider_record(current)];
            let marker = self.ownership.markers.get(name).filter(|_| {
                remaining == 0 && !surviving.contains(name) && !failed_names.contains(name)
            });
            if let Some(marker) = marker {
                records.push(marker.clone());
            }

            let result =
                cancellable(self.cancel, self.provider.delete_records(self.zone, &records)).await;
            let outcome = self.settle(ApplyAction::Delete, current, None, result);
            if outcome.is_applied() {
                if marker.is_some() {
                    self.live_markers.remove(name);
                }
            } else {
                failed_names.insert(name);
            }
            outcomes.push(outcome);
        }

        for marker in &plan.orphan_markers {
            let as_record = codec::from_provider_record(marker);
            if self.cancel.is_cancelled() {
                outcomes.push(unapplied(
                    ApplyAction::SweepMarker,
                    marker.name(),
                    &RecordType::Txt,
                    OutcomeStatus::Cancelled,
                ));
                continue;
            }
            let result = cancellable(
                self.cancel,
                self.provider.delete_records(self.zone, std::slice::from_ref(marker)),
            )
            .await;
            let outcome = self.settle(ApplyAction::SweepMarker, &as_record, None, result);
            if outcome.is_applied() {
                if let Some(target) = self.format.target_name(marker.name()) {
                    self.live_markers.remove(target);
                }
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Writes every record in `to_create` together with its marker.
    ///
    /// Uses upsert when available and append otherwise. The marker is left out when
    /// this instance's marker for the name already exists. Names claimed by another
    /// owner's marker are refused without a provider call, since writing our marker
    /// there would replace theirs.
    pub async fn apply_creates(&mut self, plan: &ReconciliationPlan) -> Vec<ApplyOutcome> {
        let mut outcomes = Vec::with_capacity(plan.to_create.len());

        for record in &plan.to_create {
            if self.cancel.is_cancelled() {
                outcomes.push(cancelled(ApplyAction::Create, record));
                continue;
            }
            if self.ownership.is_foreign(&record.name) {
                log::warn!(
                    "[{}] Not creating {}: '{}' carries another owner's marker",
                    self.zone,
                    record.key(),
                    record.name
                );
                let reason = format!("'{}' is claimed by another owner's marker", record.name);
                outcomes.push(skipped(
                    ApplyAction::Create,
                    record,
                    OutcomeStatus::Failed { reason },
                ));
                continue;
            }

            let mut records = vec![codec::to_provider_record(record)];
            let with_marker = !self.live_markers.contains(&record.name);
            if with_marker {
                records.push(codec::make_marker(&record.name, self.format));
            }

            let result = if self.capabilities.set {
                cancellable(self.cancel, self.provider.set_records(self.zone, &records)).await
            } else {
                cancellable(self.cancel, self.provider.append_records(self.zone, &records)).await
            };
            let outcome = self.settle(ApplyAction::Create, record, Some(&record.value), result);
            if outcome.is_applied() && with_marker {
                self.live_markers.insert(record.name.clone());
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Rewrites every record in `to_update`. The marker is not touched.
    pub async fn apply_updates(&self, plan: &ReconciliationPlan) -> Vec<ApplyOutcome> {
        if !self.capabilities.set {
            if !plan.to_update.is_empty() {
                log::warn!(
                    "[{}] Provider '{}' cannot upsert records, skipping {} update(s)",
                    self.zone,
                    self.provider.id(),
                    plan.to_update.len()
                );
            }
            return plan
                .to_update
                .iter()
                .map(|record| ApplyOutcome {
                    value: Some(record.value.clone()),
                    ..unapplied(
                        ApplyAction::Update,
                        &record.name,
                        &record.record_type,
                        OutcomeStatus::Unsupported,
                    )
                })
                .collect();
        }

        let mut outcomes = Vec::with_capacity(plan.to_update.len());
        for record in &plan.to_update {
            if self.cancel.is_cancelled() {
                outcomes.push(cancelled(ApplyAction::Update, record));
                continue;
            }
            let records = [codec::to_provider_record(record)];
            let result =
                cancellable(self.cancel, self.provider.set_records(self.zone, &records)).await;
            outcomes.push(self.settle(ApplyAction::Update, record, Some(&record.value), result));
        }
        outcomes
    }

    /// Turns a provider call result into an outcome and logs it.
    fn settle(
        &self,
        action: ApplyAction,
        record: &Record,
        value: Option<&str>,
        result: Option<ProviderResult<Vec<ProviderRecord>>>,
    ) -> ApplyOutcome {
        let status = match result {
            None => {
                log::info!("[{}] {action} {} cancelled", self.zone, record.key());
                OutcomeStatus::Cancelled
            }
            Some(Ok(_)) => {
                log::info!(
                    "[{}] {action} {} {}",
                    self.zone,
                    record.key(),
                    truncate_for_log(value.unwrap_or_default())
                );
                OutcomeStatus::Applied
            }
            Some(Err(source)) => {
                let reason = source.to_string();
                let err = CoreError::Write {
                    zone: self.zone.to_string(),
                    record: record.key().to_string(),
                    source,
                };
                if err.is_expected() {
                    log::warn!("{err}");
                } else {
                    log::error!("{err}");
                }
                OutcomeStatus::Failed { reason }
            }
        };

        ApplyOutcome {
            action,
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            value: value.map(ToString::to_string),
            status,
        }
    }
}

fn unapplied(
    action: ApplyAction,
    name: &str,
    record_type: &RecordType,
    status: OutcomeStatus,
) -> ApplyOutcome {
    ApplyOutcome {
        action,
        name: name.to_string(),
        record_type: record_type.clone(),
        value: None,
        status,
    }
}

/// Outcome for a declared record that was never sent.
fn skipped(action: ApplyAction, record: &Record, status: OutcomeStatus) -> ApplyOutcome {
    ApplyOutcome {
        value: Some(record.value.clone()),
        ..unapplied(action, &record.name, &record.record_type, status)
    }
}

fn cancelled(action: ApplyAction, record: &Record) -> ApplyOutcome {
    skipped(action, record, OutcomeStatus::Cancelled)
}
