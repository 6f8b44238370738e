//! # Reconciliation Logic
//!
//! One pass over a single ManagedCertificate:
//!
//! 1. Read the resource from the cache
//! 2. Reserve an SslCertificate name in the mapping store (before creating it)
//! 3. Create the SslCertificate if the backend does not have it
//! 4. Translate the backend status and write it to the resource
//!
//! Steps run in order and the first failure ends the pass. Side effects of
//! earlier steps are kept, so a failed pass leaves the previous status in
//! place and the retry picks up where it stopped.

use crate::controller::key::ResourceKey;
use crate::controller::reconciler::translate::{
    translate_domain_status, translate_overall_status, TranslateError,
};
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::crd::{DomainStatus, ManagedCertificate, ManagedCertificateStatus};
use crate::observability::metrics;
use crate::provider::{ProviderError, SslCertificate};
use std::time::Instant;
use tracing::{debug, info, Instrument};

/// Reconcile the ManagedCertificate identified by `key`
///
/// # Errors
/// Returns the first failure of any step unmodified.
pub async fn reconcile(ctx: &Reconciler, key: &ResourceKey) -> Result<(), ReconcilerError> {
    let span = tracing::info_span!(
        "reconcile",
        resource.namespace = %key.namespace,
        resource.name = %key.name,
        resource.kind = "ManagedCertificate"
    );

    async {
        let start = Instant::now();
        metrics::increment_reconciliations();

        let result = reconcile_internal(ctx, key).await;

        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
        if result.is_ok() {
            debug!("Reconciliation complete");
        }
        result
    }
    .instrument(span)
    .await
}

async fn reconcile_internal(ctx: &Reconciler, key: &ResourceKey) -> Result<(), ReconcilerError> {
    let certificate = ctx
        .reader
        .get(key)
        .await?
        .ok_or_else(|| ReconcilerError::ResourceNotFound(key.clone()))?;

    ensure_name_reserved(ctx, key).await?;
    ensure_ssl_certificate(ctx, key, &certificate.spec.domains).await?;
    publish_status(ctx, key, &certificate).await
}

/// Name in the mapping store; a missing entry means step 2 did not run
async fn reserved_name(ctx: &Reconciler, key: &ResourceKey) -> Result<String, ReconcilerError> {
    ctx.store
        .get(key)
        .await?
        .ok_or_else(|| ReconcilerError::MissingReservation(key.clone()))
}

async fn ensure_name_reserved(ctx: &Reconciler, key: &ResourceKey) -> Result<(), ReconcilerError> {
    match ctx.store.get(key).await? {
        Some(name) if !name.is_empty() => {
            debug!(certificate = %name, "SslCertificate name already reserved");
            Ok(())
        }
        _ => {
            let name = ctx.allocator.allocate().await?;
            ctx.store.put(key, &name).await?;
            info!(certificate = %name, "Reserved SslCertificate name");
            Ok(())
        }
    }
}

async fn ensure_ssl_certificate(
    ctx: &Reconciler,
    key: &ResourceKey,
    domains: &[String],
) -> Result<(), ReconcilerError> {
    let name = reserved_name(ctx, key).await?;

    match ctx.provider.get(&name).await {
        Ok(_) => {
            debug!(certificate = %name, "SslCertificate exists");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            info!(certificate = %name, ?domains, "Creating SslCertificate");
            match ctx.provider.insert(&name, domains).await {
                Ok(()) => {
                    metrics::increment_ssl_certificates_created();
                    Ok(())
                }
                // Created by an earlier pass whose response was lost
                Err(ProviderError::AlreadyExists(_)) => {
                    debug!(certificate = %name, "SslCertificate already created");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

async fn publish_status(
    ctx: &Reconciler,
    key: &ResourceKey,
    certificate: &ManagedCertificate,
) -> Result<(), ReconcilerError> {
    let name = reserved_name(ctx, key).await?;
    if name.is_empty() {
        return Ok(());
    }

    let ssl_certificate = ctx.provider.get(&name).await?;
    let status = build_status(&name, &ssl_certificate)?;

    if certificate.status.as_ref() == Some(&status) {
        debug!("Status unchanged, skipping update");
        return Ok(());
    }

    ctx.writer.update_status(key, &status).await?;
    info!(
        certificate = %name,
        status = %status.certificate_status,
        "Updated ManagedCertificate status"
    );
    Ok(())
}

/// Status to publish for an SslCertificate
///
/// Fails as a whole if any raw value is outside the vocabulary, so a
/// half-translated status is never written. Domains are ordered by name.
///
/// # Errors
/// Returns `UnknownStatus` for the first untranslatable value.
pub fn build_status(
    name: &str,
    ssl_certificate: &SslCertificate,
) -> Result<ManagedCertificateStatus, TranslateError> {
    let certificate_status = translate_overall_status(&ssl_certificate.status)?;

    let domain_status = ssl_certificate
        .domain_status
        .iter()
        .map(|(domain, raw)| {
            translate_domain_status(raw).map(|status| DomainStatus {
                domain: domain.clone(),
                status: status.as_str().to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ManagedCertificateStatus {
        certificate_status: certificate_status.as_str().to_string(),
        certificate_name: name.to_string(),
        domain_status,
    })
}
