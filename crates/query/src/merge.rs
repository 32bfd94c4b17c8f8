//! Field-by-field options merge.
//!
//! An explicit per-call [`QueryOptions`] bundle wins field-by-field over the
//! request-built base bundle; fields absent on the override keep the base
//! value, so neither side's settings are silently dropped. Two special
//! rules:
//!
//! - a consistency vector on either bundle forces `at_plus` consistency,
//!   and a plain `scan_consistency` field in the same merge must not
//!   overwrite it;
//! - positional parameters already on the base combined with named-shaped
//!   (`$`-prefixed) raw keys or named parameters on the override are a
//!   caller error.

use tracing::debug;

use fathom_core::{Error, QueryOptions, Result, ScanConsistency};

/// Merge `overlay` (the explicit per-call bundle) onto `base` (the
/// request-built bundle).
pub fn merge_query_options(base: QueryOptions, overlay: &QueryOptions) -> Result<QueryOptions> {
    debug!(?base, "options before");
    debug!(options = ?overlay, "options merge");

    let mut merged = base;

    if let Some(timeout) = overlay.timeout {
        merged.timeout = Some(timeout);
    }
    if let Some(serializer) = &overlay.serializer {
        merged.serializer = Some(serializer.clone());
    }
    if let Some(adhoc) = overlay.adhoc {
        merged.adhoc = Some(adhoc);
    }
    if let Some(id) = &overlay.client_context_id {
        merged.client_context_id = Some(id.clone());
    }
    if let Some(n) = overlay.max_parallelism {
        merged.max_parallelism = Some(n);
    }
    if let Some(metrics) = overlay.metrics {
        merged.metrics = Some(metrics);
    }
    if let Some(batch) = overlay.pipeline_batch {
        merged.pipeline_batch = Some(batch);
    }
    if let Some(profile) = overlay.profile {
        merged.profile = Some(profile);
    }
    if let Some(readonly) = overlay.readonly {
        merged.readonly = Some(readonly);
    }
    if let Some(wait) = overlay.scan_wait {
        merged.scan_wait = Some(wait);
    }
    if let Some(cap) = overlay.scan_cap {
        merged.scan_cap = Some(cap);
    }
    if let Some(flex) = overlay.flex_index {
        merged.flex_index = Some(flex);
    }
    if let Some(args) = &overlay.positional_parameters {
        merged.positional_parameters = Some(args.clone());
    }

    // A consistency vector on either side pins the merge result to
    // at_plus; a plain scan_consistency field must not undo it.
    if let Some(vector) = &overlay.consistent_with {
        merged.consistent_with = Some(vector.clone());
        merged.scan_consistency = Some(ScanConsistency::AtPlus);
    }
    if let Some(consistency) = overlay.scan_consistency {
        if merged.consistent_with.is_none() {
            merged.scan_consistency = Some(consistency);
        }
    }

    if let Some(named) = &overlay.named_parameters {
        if merged.positional_parameters.is_some() {
            return Err(Error::ParameterKindConflict {
                detail: format!(
                    "cannot have both positional and named parameters; named keys: {:?}",
                    named.keys().collect::<Vec<_>>()
                ),
            });
        }
        merged.named_parameters = Some(named.clone());
    }

    for (name, value) in &overlay.raw {
        if name.starts_with('$') && merged.positional_parameters.is_some() {
            return Err(Error::ParameterKindConflict {
                detail: format!(
                    "cannot have both positional parameters and named argument {name}"
                ),
            });
        }
        merged.raw.insert(name.clone(), value.clone());
    }

    debug!(options = ?merged, "options after");
    Ok(merged)
}
