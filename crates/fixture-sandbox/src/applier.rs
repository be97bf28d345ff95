//! Override applier
//!
//! Writes accepted directives onto live decorated instances. Two entry
//! points, never merged:
//! - [`OverrideApplier::apply`]: decode and write listed values, delete
//!   every live key the shape omits
//! - [`OverrideApplier::revert`]: reset every instance of a kind to its
//!   decorator's seed
//!
//! [`OverrideApplier::reset_instance`] is separate again: it re-baselines one
//! slot on every kind after its seed changed under a live decorator.

use crate::environment::RenderEnvironment;
use crate::error::ApplyError;
use crate::registry::InstanceRegistry;
use fixture_state::{DecoratorId, InstanceShape, ValueKind};

/// What an apply did to one instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyReport {
    /// Keys written
    pub written: Vec<String>,
    /// Keys deleted because the shape omitted them
    pub deleted: Vec<String>,
    /// Keys whose content failed to decode
    pub skipped: Vec<String>,
}

impl ApplyReport {
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Writes overrides through the decorator capability
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideApplier;

impl OverrideApplier {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Write one shape onto its live instance
    ///
    /// Values that fail to decode are skipped and reported; the rest of the
    /// shape is still applied. Entries without content leave the live value
    /// as it is.
    ///
    /// # Errors
    /// - `ApplyError::MissingInstance` if no slot matches the shape's identity
    /// - `ApplyError::HandleUnavailable` if the slot has no live decorator of `kind`
    pub fn apply<E: RenderEnvironment>(
        &self,
        env: &E,
        registry: &InstanceRegistry,
        kind: ValueKind,
        shape: &InstanceShape,
    ) -> Result<ApplyReport, ApplyError> {
        let instance = registry
            .resolve(shape.decorator_id, &shape.el_path)
            .ok_or_else(|| ApplyError::MissingInstance {
                decorator_id: shape.decorator_id,
                el_path: shape.el_path.clone(),
            })?;

        let report = env
            .with_decorator(&instance.el_path, kind, |decorator| {
                let mut report = ApplyReport::default();

                for entry in &shape.values {
                    if entry.stringified.is_none() {
                        continue;
                    }
                    match entry.parse() {
                        Ok(value) => {
                            decorator.write(&entry.key, value);
                            report.written.push(entry.key.clone());
                        }
                        Err(err) => {
                            tracing::warn!(key = %entry.key, error = %err, "skipping undecodable value");
                            report.skipped.push(entry.key.clone());
                        }
                    }
                }

                for key in decorator.read().keys() {
                    if !shape.has_key(key) {
                        decorator.delete(key);
                        report.deleted.push(key.clone());
                    }
                }

                report
            })
            .ok_or_else(|| ApplyError::HandleUnavailable {
                kind,
                el_path: instance.el_path.clone(),
            })?;

        tracing::debug!(
            decorator_id = %shape.decorator_id,
            el_path = %shape.el_path,
            %kind,
            written = report.written.len(),
            deleted = report.deleted.len(),
            "applied override"
        );

        Ok(report)
    }

    /// Reset every registered instance of `kind` to its seeded values
    ///
    /// Returns how many instances were reset.
    pub fn revert<E: RenderEnvironment>(
        &self,
        env: &E,
        registry: &InstanceRegistry,
        kind: ValueKind,
    ) -> usize {
        let mut reverted = 0;
        for instance in registry.instances() {
            if instance.seed.get(kind).is_none() {
                continue;
            }
            if env
                .with_decorator(&instance.el_path, kind, |decorator| decorator.reset())
                .is_some()
            {
                reverted += 1;
            }
        }
        tracing::debug!(%kind, reverted, "reverted to seeded values");
        reverted
    }

    /// Reset every kind of one instance to its current seed
    ///
    /// Returns the kinds that were reset.
    ///
    /// # Errors
    /// `ApplyError::UnknownInstance` if `decorator_id` is not registered
    pub fn reset_instance<E: RenderEnvironment>(
        &self,
        env: &E,
        registry: &InstanceRegistry,
        decorator_id: DecoratorId,
    ) -> Result<Vec<ValueKind>, ApplyError> {
        let instance = registry
            .instances()
            .find(|instance| instance.decorator_id == decorator_id)
            .ok_or(ApplyError::UnknownInstance { decorator_id })?;

        let reset: Vec<_> = instance
            .kinds()
            .filter(|kind| {
                env.with_decorator(&instance.el_path, *kind, |decorator| decorator.reset())
                    .is_some()
            })
            .collect();

        tracing::debug!(
            %decorator_id,
            el_path = %instance.el_path,
            kinds = reset.len(),
            "reset instance to new seed"
        );
        Ok(reset)
    }
}
