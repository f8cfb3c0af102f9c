// Source binding - one keyed remote query and the observers of its results
use crate::application::clinical_provider::SourceQuery;
use crate::domain::patient::PatientId;
use crate::domain::source::{SourceError, SourceKind, SourceResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

const RESULT_CHANNEL_CAPACITY: usize = 16;

type ResultObserver<T> = Box<dyn Fn(&SourceResult<T>) + Send + Sync>;

#[derive(Debug, Default)]
struct BindingKey {
    patient: Option<PatientId>,
    epoch: u64,
}

/// Wraps one remote query keyed by patient id.
///
/// Every completed fetch is emitted as a [`SourceResult`]: first to the
/// observers registered with [`SourceBinding::on_result`], synchronously and
/// in registration order, then to any [`SourceBinding::results`] streams.
/// Provider failures become the error variant and never escape as a panic
/// or a dropped result.
///
/// Fetches are never cancelled. A fetch started before the binding was
/// re-keyed still runs to completion, but its result is discarded instead
/// of being emitted.
pub struct SourceBinding<T> {
    kind: SourceKind,
    query: Arc<dyn SourceQuery<T>>,
    key: Mutex<BindingKey>,
    observers: RwLock<Vec<ResultObserver<T>>>,
    results: broadcast::Sender<SourceResult<T>>,
}

impl<T> SourceBinding<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(kind: SourceKind, query: Arc<dyn SourceQuery<T>>) -> Self {
        let (results, _) = broadcast::channel(RESULT_CHANNEL_CAPACITY);
        Self {
            kind,
            query,
            key: Mutex::new(BindingKey::default()),
            observers: RwLock::new(Vec::new()),
            results,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn patient(&self) -> Option<PatientId> {
        self.lock_key().patient.clone()
    }

    /// Observers run while the binding's key is locked and must not call back into it.
    pub fn on_result<F>(&self, observer: F)
    where
        F: Fn(&SourceResult<T>) + Send + Sync + 'static,
    {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    /// Stream of results emitted after this call.
    pub fn results(&self) -> impl Stream<Item = SourceResult<T>> + Send + use<T> {
        let kind = self.kind;
        BroadcastStream::new(self.results.subscribe()).filter_map(move |item| match item {
            Ok(result) => Some(result),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(source = %kind, skipped, "result subscriber lagged behind");
                None
            }
        })
    }

    /// Points the binding at a new patient without fetching.
    pub fn rekey(&self, patient: Option<PatientId>) {
        let mut key = self.lock_key();
        key.epoch += 1;
        key.patient = patient;
    }

    /// Re-keys and fetches; `Dashboard::set_patient` subscribes both sources through this.
    /// Without a patient nothing is fetched and nothing is emitted.
    pub fn bind(self: &Arc<Self>, patient: Option<PatientId>) -> Option<JoinHandle<Result<(), SourceError>>> {
        let has_patient = patient.is_some();
        self.rekey(patient);
        has_patient.then(|| self.refetch())
    }

    /// Fetches again with the last key. The handle resolves once the result
    /// has been emitted, or immediately with `Unbound` when there is no key.
    pub fn refetch(self: &Arc<Self>) -> JoinHandle<Result<(), SourceError>> {
        let (patient, epoch) = {
            let key = self.lock_key();
            (key.patient.clone(), key.epoch)
        };

        let binding = Arc::clone(self);
        tokio::spawn(async move {
            match patient {
                Some(patient) => binding.fetch(patient, epoch).await,
                None => Err(SourceError::Unbound(binding.kind)),
            }
        })
    }

    async fn fetch(&self, patient: PatientId, epoch: u64) -> Result<(), SourceError> {
        tracing::debug!(source = %self.kind, patient = %patient, "fetching");
        let result = SourceResult::from_fetch(self.kind, self.query.fetch(&patient).await);
        let status = result.status();

        if let Err(e) = &status {
            tracing::warn!(source = %self.kind, patient = %patient, "fetch failed: {}", e);
        }

        let key = self.lock_key();
        if key.epoch == epoch {
            self.emit(result);
        } else {
            tracing::debug!(
                source = %self.kind,
                patient = %patient,
                "discarding result for a superseded key"
            );
        }
        drop(key);

        status
    }

    fn emit(&self, result: SourceResult<T>) {
        for observer in self.observers.read().unwrap_or_else(PoisonError::into_inner).iter() {
            observer(&result);
        }
        // No stream subscribers is normal.
        let _ = self.results.send(result);
    }

    fn lock_key(&self) -> MutexGuard<'_, BindingKey> {
        self.key.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
