use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::location::LocationResolver;
use crate::model::WeatherSnapshot;
use crate::provider::WeatherProvider;

/// The single piece of process state the fetch pipeline owns.
///
/// Replaced wholesale on every transition, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Loading,
    Success(WeatherSnapshot),
    Error(String),
}

impl FetchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FetchState::Loading)
    }
}

/// Sequences location resolution and the weather fetch, publishing
/// `Loading -> {Success | Error}` through a single watch cell.
///
/// Re-invoking [`load_weather`](Self::load_weather) while a fetch is in
/// flight cancels the stale sequence and starts over; a stale task can
/// never overwrite a newer invocation's state.
#[derive(Debug)]
pub struct WeatherViewModel {
    resolver: Arc<LocationResolver>,
    provider: Arc<dyn WeatherProvider>,
    dispatcher: Arc<dyn Dispatcher>,
    state: Arc<watch::Sender<FetchState>>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl WeatherViewModel {
    pub fn new(
        resolver: LocationResolver,
        provider: Box<dyn WeatherProvider>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let (state, _) = watch::channel(FetchState::Loading);
        Self {
            resolver: Arc::new(resolver),
            provider: Arc::from(provider),
            dispatcher,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    /// Observe the published state. Any number of receivers may watch; only
    /// the view-model writes.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Start a fetch. `Loading` is published immediately; the outcome
    /// arrives through the state cell.
    pub fn load_weather(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(stale) = self.in_flight.lock().expect("in_flight lock poisoned").take() {
            debug!("cancelling stale in-flight fetch");
            stale.abort();
        }

        publish(&self.state, &self.generation, generation, FetchState::Loading);

        let resolver = Arc::clone(&self.resolver);
        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        let handle = self.dispatcher.io().spawn(async move {
            let outcome = match resolver.resolve().await {
                Err(err) => FetchState::Error(err.user_message()),
                Ok(coordinate) => match provider.fetch_current(coordinate).await {
                    Ok(snapshot) => FetchState::Success(snapshot),
                    Err(err) => FetchState::Error(err.user_message()),
                },
            };
            publish(&state, &current, generation, outcome);
        });

        *self.in_flight.lock().expect("in_flight lock poisoned") = Some(handle);
    }
}

impl Drop for WeatherViewModel {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.lock().expect("in_flight lock poisoned").take() {
            task.abort();
        }
    }
}

/// Write to the state cell unless a newer invocation has taken it over.
/// The generation check runs under the sender's lock, so check-and-write is
/// atomic with respect to every other publish.
fn publish(
    state: &watch::Sender<FetchState>,
    current: &AtomicU64,
    generation: u64,
    value: FetchState,
) {
    state.send_if_modified(|slot| {
        if current.load(Ordering::SeqCst) != generation {
            debug!(generation, "dropping stale state publish");
            return false;
        }
        *slot = value;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::dispatcher::RuntimeDispatcher;
    use crate::error::{AppError, Result};
    use crate::location::{AccuracyHint, LocationService, Permissions};
    use crate::model::Coordinate;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Madrid".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
            temperature: 20.5,
            temp_min: 18.2,
            temp_max: 23.1,
            feels_like: 19.8,
            pressure: 1014,
            humidity: 46,
            clouds: 0,
            wind_speed: 3.6,
            wind_deg: 210,
            wind_gust: None,
            sunrise: 1_699_987_000,
            sunset: 1_700_023_000,
            last_updated: 1_700_000_000,
            rain_one_hour: None,
        }
    }

    /// Location service whose fresh fix waits for the test's go-ahead, so
    /// state transitions can be observed in order.
    #[derive(Debug)]
    struct GatedService {
        permissions: Permissions,
        gate: Arc<Notify>,
        calls: AtomicUsize,
        hang_first_call: bool,
        /// Signalled once the first (hanging) call is inside the request.
        started: Arc<Notify>,
    }

    impl GatedService {
        fn granted(gate: Arc<Notify>) -> Self {
            Self {
                permissions: Permissions::granted(),
                gate,
                calls: AtomicUsize::new(0),
                hang_first_call: false,
                started: Arc::new(Notify::new()),
            }
        }

        fn denied() -> Self {
            Self {
                permissions: Permissions::denied(),
                gate: Arc::new(Notify::new()),
                calls: AtomicUsize::new(0),
                hang_first_call: false,
                started: Arc::new(Notify::new()),
            }
        }
    }

    #[async_trait]
    impl LocationService for GatedService {
        fn permissions(&self) -> Permissions {
            self.permissions
        }

        async fn current_fix(&self, _hint: AccuracyHint) -> Result<Option<Coordinate>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_first_call && call == 0 {
                self.started.notify_one();
                std::future::pending::<()>().await;
            }
            self.gate.notified().await;
            Ok(Some(Coordinate::new(40.0, -3.7)))
        }

        async fn last_known_fix(&self) -> Result<Option<Coordinate>> {
            Ok(None)
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum StubOutcome {
        Ok,
        Http500,
        Malformed,
    }

    #[derive(Debug)]
    struct StubProvider {
        outcome: StubOutcome,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch_current(&self, coordinate: Coordinate) -> Result<WeatherSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(coordinate, Coordinate::new(40.0, -3.7));
            match self.outcome {
                StubOutcome::Ok => Ok(snapshot()),
                StubOutcome::Http500 => Err(AppError::Api {
                    code: 500,
                    message: "Internal Server Error".into(),
                }),
                StubOutcome::Malformed => Err(AppError::Parsing),
            }
        }
    }

    fn view_model(
        service: GatedService,
        outcome: StubOutcome,
    ) -> (WeatherViewModel, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = StubProvider { outcome, calls: Arc::clone(&calls) };
        let vm = WeatherViewModel::new(
            LocationResolver::new(Box::new(service)),
            Box::new(provider),
            Arc::new(RuntimeDispatcher::current()),
        );
        (vm, calls)
    }

    #[tokio::test]
    async fn publishes_loading_then_success() {
        let gate = Arc::new(Notify::new());
        let (vm, _) = view_model(GatedService::granted(Arc::clone(&gate)), StubOutcome::Ok);

        let mut rx = vm.subscribe();
        rx.borrow_and_update();

        vm.load_weather();

        rx.changed().await.expect("loading");
        assert_eq!(*rx.borrow_and_update(), FetchState::Loading);

        gate.notify_one();
        rx.changed().await.expect("terminal");
        assert_eq!(*rx.borrow_and_update(), FetchState::Success(snapshot()));
    }

    #[tokio::test]
    async fn permission_error_never_reaches_the_provider() {
        let (vm, provider_calls) = view_model(GatedService::denied(), StubOutcome::Ok);

        let mut rx = vm.subscribe();
        rx.borrow_and_update();

        vm.load_weather();

        rx.changed().await.expect("loading");
        assert_eq!(*rx.borrow_and_update(), FetchState::Loading);

        rx.changed().await.expect("terminal");
        assert_eq!(
            *rx.borrow_and_update(),
            FetchState::Error("Location permission required".to_string())
        );
        assert_eq!(provider_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn http_500_surfaces_the_status_code() {
        let gate = Arc::new(Notify::new());
        let (vm, _) = view_model(GatedService::granted(Arc::clone(&gate)), StubOutcome::Http500);

        let mut rx = vm.subscribe();
        vm.load_weather();
        gate.notify_one();

        let state = rx
            .wait_for(FetchState::is_terminal)
            .await
            .expect("terminal")
            .clone();
        match state {
            FetchState::Error(message) => assert!(message.contains("500")),
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_maps_to_the_parsing_message() {
        let gate = Arc::new(Notify::new());
        let (vm, _) = view_model(GatedService::granted(Arc::clone(&gate)), StubOutcome::Malformed);

        let mut rx = vm.subscribe();
        vm.load_weather();
        gate.notify_one();

        let state = rx
            .wait_for(FetchState::is_terminal)
            .await
            .expect("terminal")
            .clone();
        assert_eq!(state, FetchState::Error("Parsing error".to_string()));
    }

    #[tokio::test]
    async fn reinvoking_cancels_the_stale_fetch_and_restarts() {
        let gate = Arc::new(Notify::new());
        let mut service = GatedService::granted(Arc::clone(&gate));
        service.hang_first_call = true;
        let started = Arc::clone(&service.started);
        let (vm, provider_calls) = view_model(service, StubOutcome::Ok);

        let mut rx = vm.subscribe();
        rx.borrow_and_update();

        // First invocation hangs inside the platform request.
        vm.load_weather();
        started.notified().await;
        rx.changed().await.expect("loading");
        assert_eq!(*rx.borrow_and_update(), FetchState::Loading);

        // Second invocation takes over the state slot.
        vm.load_weather();
        gate.notify_one();

        let state = rx
            .wait_for(FetchState::is_terminal)
            .await
            .expect("terminal")
            .clone();
        assert_eq!(state, FetchState::Success(snapshot()));
        assert_eq!(provider_calls.load(Ordering::SeqCst), 1);
    }
}
