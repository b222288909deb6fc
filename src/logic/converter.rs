use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::ConverterConfig;
use crate::error::ConverterError;
use crate::logic::conversion::ConversionPipeline;
use crate::logic::observer::{ConversionObserver, NoopObserver};
use crate::logic::scan::scan_documents;
use crate::model::{ConversionResult, ReferenceGroup};
use crate::store::traits::DocumentStore;

/// Stateful front end for one store: configure, scan, then convert what was found.
///
/// Scanned groups are held until the next conversion or until a scan-affecting
/// setting changes.
pub struct ReferenceConverter<S: DocumentStore> {
    store: S,
    config: ConverterConfig,
    pending: Vec<ReferenceGroup>,
    observer: Arc<dyn ConversionObserver>,
}

impl<S: DocumentStore> ReferenceConverter<S> {
    pub fn new(store: S, config: ConverterConfig) -> Result<Self, ConverterError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            pending: Vec::new(),
            observer: Arc::new(NoopObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ConversionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending_groups(&self) -> &[ReferenceGroup] {
        &self.pending
    }

    /// Replace the configuration. Pending groups are dropped when the mode or a filter changes.
    pub fn configure(&mut self, config: ConverterConfig) -> Result<(), ConverterError> {
        config.validate()?;
        if self.config.scan_differs(&config) && !self.pending.is_empty() {
            log::info!(
                "Scan settings changed, discarding {} pending group(s)",
                self.pending.len()
            );
            self.pending.clear();
        }
        self.config = config;
        Ok(())
    }

    /// Scan the store and keep the resulting groups as pending work
    pub async fn scan(&mut self) -> Result<&[ReferenceGroup], ConverterError> {
        self.pending.clear();

        match scan_documents(&self.store, &self.config).await {
            Ok(groups) => {
                self.pending = groups;
                Ok(&self.pending)
            }
            Err(e) => {
                self.observer.on_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Convert every pending group. Per-document failures end up in the result, not here.
    pub async fn convert(&mut self) -> Result<ConversionResult, ConverterError> {
        if self.pending.is_empty() {
            let e = ConverterError::NothingToConvert;
            self.observer.on_error(&e.to_string());
            return Err(e);
        }

        let batch_size = NonZeroUsize::new(self.config.batch_size).ok_or_else(|| {
            ConverterError::Configuration("batch_size must be at least 1".to_string())
        })?;
        let groups = std::mem::take(&mut self.pending);

        let pipeline = ConversionPipeline::new(&self.store, self.observer.as_ref());
        let result = pipeline
            .run(&groups, self.config.mode, batch_size, self.config.dry_run)
            .await;

        Ok(result)
    }
}
