//! One interactive ledger session: point selection, route pricing, saving and
//! recalling trips.
//!
//! Directions requests run as background tasks and report back through a
//! channel as [`RouteEvent`]s tagged with the request generation. The owner of
//! the session feeds those events to [`Session::apply`] from its own loop, so
//! all state mutation happens in one place. Snapshot rendering is awaited
//! inside [`Session::save`] so the record is always written after it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cost::{compute_cost, format_cost, format_distance_km, Rate};
use crate::db::TripStore;
use crate::directions::DirectionsProvider;
use crate::error::{LedgerError, RouteError};
use crate::location::LocationCache;
use crate::models::{Coordinate, NewTrip, ResolvedRoute, TripRecord};
use crate::navigation::NavigationLauncher;
use crate::snapshot::{PixelSize, SnapshotRenderer};

pub mod state;

pub use state::AppState;

pub const DEFAULT_TRIP_NAME: &str = "Calculated route";

#[derive(Debug)]
pub struct RouteEvent {
    pub generation: u64,
    pub result: Result<ResolvedRoute, RouteError>,
}

/// What [`Session::apply`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved,
    Unavailable,
    /// The event belonged to a superseded request and was dropped.
    Stale,
}

pub struct Session<D, R> {
    state: AppState,
    store: TripStore,
    directions: Arc<D>,
    renderer: R,
    launcher: Box<dyn NavigationLauncher>,
    location: LocationCache,
    snapshot_size: PixelSize,
    events_tx: mpsc::UnboundedSender<RouteEvent>,
    events_rx: mpsc::UnboundedReceiver<RouteEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl<D, R> Session<D, R>
where
    D: DirectionsProvider,
    R: SnapshotRenderer,
{
    pub fn new(
        store: TripStore,
        directions: D,
        renderer: R,
        launcher: Box<dyn NavigationLauncher>,
        location: LocationCache,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(Rate::default()),
            store,
            directions: Arc::new(directions),
            renderer,
            launcher,
            location,
            snapshot_size: PixelSize::default(),
            events_tx,
            events_rx,
            in_flight: None,
        }
    }

    pub fn with_rate(mut self, rate: Rate) -> Self {
        *self.state.rate_mut() = rate;
        self
    }

    pub fn with_snapshot_size(mut self, size: PixelSize) -> Self {
        self.snapshot_size = size;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[cfg(test)]
    pub fn store(&self) -> &TripStore {
        &self.store
    }

    pub fn tap(&mut self, coord: Coordinate) {
        let outcome = self.state.add_point(coord);
        if outcome.restarted {
            self.cancel_in_flight();
        }
        debug!("Selected point {} ({} of 2)", coord, self.state.selection().len());

        if let Some((origin, destination)) = outcome.pair {
            self.request_route(origin, destination);
        }
    }

    pub fn use_current_location(&mut self) -> Result<Coordinate, LedgerError> {
        let coord = self.location.latest().ok_or(LedgerError::NoLocation)?;
        self.tap(coord);
        Ok(coord)
    }

    pub fn reset(&mut self) {
        self.cancel_in_flight();
        self.state.clear();
    }

    pub fn set_traffic(&mut self, on: bool) {
        self.state.set_traffic(on);
    }

    pub fn increment_rate(&mut self) -> Rate {
        self.state.rate_mut().increment();
        self.state.rate()
    }

    /// Leaves the rate unchanged when already at the minimum.
    pub fn decrement_rate(&mut self) -> Rate {
        if !self.state.rate_mut().decrement() {
            debug!("Rate already at minimum");
        }
        self.state.rate()
    }

    pub fn set_rate(&mut self, per_km: f64) -> Result<Rate, LedgerError> {
        if !self.state.rate_mut().set(per_km) {
            return Err(LedgerError::InvalidRate(per_km));
        }
        Ok(self.state.rate())
    }

    pub fn current_cost(&self) -> Option<f64> {
        self.state.current_cost()
    }

    pub async fn next_event(&mut self) -> Option<RouteEvent> {
        self.events_rx.recv().await
    }

    /// Waits for the next resolution event and applies it.
    #[cfg(test)]
    pub async fn settle(&mut self) -> Resolution {
        match self.next_event().await {
            Some(event) => self.apply(event),
            None => Resolution::Stale,
        }
    }

    pub fn apply(&mut self, event: RouteEvent) -> Resolution {
        if !self.state.is_current(event.generation) {
            debug!(
                "Discarding route for generation {} (current {})",
                event.generation,
                self.state.generation()
            );
            return Resolution::Stale;
        }
        self.in_flight = None;

        match event.result {
            Ok(route) => {
                let name = if route.name.is_empty() {
                    DEFAULT_TRIP_NAME
                } else {
                    route.name.as_str()
                };
                info!(
                    "Route resolved: {} ({}, tolls: {})",
                    name,
                    format_distance_km(route.distance_meters),
                    route.has_tolls
                );
                self.state.finish_resolution(Some(route));
                Resolution::Resolved
            }
            Err(e) => {
                warn!("Route unavailable: {}", e);
                self.state.finish_resolution(None);
                Resolution::Unavailable
            }
        }
    }

    /// Renders a snapshot of the resolved route and stores the priced trip.
    /// A failed snapshot is logged and the trip is stored without an image.
    pub async fn save(&mut self) -> Result<Uuid, LedgerError> {
        if self.state.is_loading() {
            return Err(LedgerError::Busy);
        }
        let (origin, destination) = self.state.selection().pair().ok_or(LedgerError::NoRoute)?;
        let route = self.state.route().cloned().ok_or(LedgerError::NoRoute)?;

        self.state.set_loading(true);

        let region = route.region(origin, destination);
        let snapshot = match self.renderer.render(region, self.snapshot_size).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Snapshot failed, saving trip without image: {}", e);
                None
            }
        };

        let rate_per_km = self.state.rate().per_km();
        let total_cost = compute_cost(route.distance_meters, rate_per_km);
        let name = if route.name.is_empty() {
            DEFAULT_TRIP_NAME.to_string()
        } else {
            route.name
        };

        let trip = NewTrip {
            name,
            rate_per_km,
            distance_meters: route.distance_meters,
            total_cost,
            origin,
            destination,
            snapshot,
        };

        let created = self.store.create(trip).await;
        self.state.set_loading(false);
        let trip_id = created?;

        info!("Saved trip {} for {}", trip_id, format_cost(total_cost));
        self.reset();
        Ok(trip_id)
    }

    /// Loads a saved trip's endpoints and rate and resolves its route again.
    pub async fn recall(&mut self, trip_id: Uuid) -> Result<TripRecord, LedgerError> {
        let trip = self
            .store
            .get(trip_id)
            .await?
            .ok_or(LedgerError::NotFound(trip_id))?;

        self.cancel_in_flight();
        self.state.replace_selection(trip.origin, trip.destination);
        if !self.state.rate_mut().set(trip.rate_per_km) {
            warn!("Trip {} has unusable rate {}", trip_id, trip.rate_per_km);
        }
        self.request_route(trip.origin, trip.destination);

        Ok(trip)
    }

    pub fn start_navigation(&self) -> Result<(), LedgerError> {
        let (origin, destination) = self
            .state
            .selection()
            .pair()
            .ok_or(LedgerError::IncompleteSelection)?;
        self.launcher.open(origin, destination);
        Ok(())
    }

    pub async fn history(&self) -> Result<Vec<TripRecord>, LedgerError> {
        Ok(self.store.list().await?)
    }

    pub async fn snapshot(&self, trip_id: Uuid) -> Result<Vec<u8>, LedgerError> {
        self.store
            .snapshot(trip_id)
            .await?
            .ok_or(LedgerError::NoSnapshot(trip_id))
    }

    pub async fn delete(&self, trip_ids: &[Uuid]) -> Result<u64, LedgerError> {
        match trip_ids {
            [trip_id] => Ok(u64::from(self.store.delete(*trip_id).await?)),
            _ => Ok(self.store.delete_many(trip_ids).await?),
        }
    }

    fn request_route(&mut self, origin: Coordinate, destination: Coordinate) {
        self.cancel_in_flight();
        let generation = self.state.begin_resolution();
        info!(
            "Resolving route {} -> {} (generation {})",
            origin, destination, generation
        );

        let directions = Arc::clone(&self.directions);
        let events_tx = self.events_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = directions.resolve(origin, destination).await;
            // The receiver only goes away with the session itself.
            let _ = events_tx.send(RouteEvent { generation, result });
        }));
    }

    fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl<D, R> Drop for Session<D, R> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_pool;
    use crate::error::SnapshotError;
    use crate::location::{self, LocationPublisher};
    use crate::models::BoundingBox;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedDirections {
        route: Option<ResolvedRoute>,
        calls: Arc<AtomicUsize>,
    }

    impl DirectionsProvider for FixedDirections {
        async fn resolve(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<ResolvedRoute, RouteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.route.clone().ok_or(RouteError::Unavailable)
        }
    }

    struct FakeRenderer {
        fail: bool,
    }

    impl SnapshotRenderer for FakeRenderer {
        async fn render(
            &self,
            _region: BoundingBox,
            _size: PixelSize,
        ) -> Result<Vec<u8>, SnapshotError> {
            if self.fail {
                Err(SnapshotError::Empty)
            } else {
                Ok(vec![0xff, 0xd8, 0xff, 0xe0])
            }
        }
    }

    type Opened = Arc<Mutex<Vec<(Coordinate, Coordinate)>>>;

    struct RecordingLauncher {
        opened: Opened,
    }

    impl NavigationLauncher for RecordingLauncher {
        fn open(&self, origin: Coordinate, destination: Coordinate) {
            self.opened.lock().unwrap().push((origin, destination));
        }
    }

    struct Harness {
        session: Session<FixedDirections, FakeRenderer>,
        publisher: LocationPublisher,
        calls: Arc<AtomicUsize>,
        opened: Opened,
    }

    fn madrid_route() -> ResolvedRoute {
        ResolvedRoute {
            distance_meters: 15_000.0,
            polyline: vec![Coordinate::new(40.0, -3.0), Coordinate::new(40.1, -3.1)],
            has_tolls: false,
            name: "A-6".to_string(),
        }
    }

    async fn harness(route: Option<ResolvedRoute>, snapshot_fails: bool) -> Harness {
        let pool = init_pool("sqlite::memory:", 1).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let opened: Opened = Arc::default();
        let (publisher, cache) = location::channel();

        let session = Session::new(
            TripStore::new(pool),
            FixedDirections {
                route,
                calls: calls.clone(),
            },
            FakeRenderer {
                fail: snapshot_fails,
            },
            Box::new(RecordingLauncher {
                opened: opened.clone(),
            }),
            cache,
        )
        .with_rate(Rate::new(0.28).unwrap());

        Harness {
            session,
            publisher,
            calls,
            opened,
        }
    }

    fn origin() -> Coordinate {
        Coordinate::new(40.0, -3.0)
    }

    fn destination() -> Coordinate {
        Coordinate::new(40.1, -3.1)
    }

    #[tokio::test]
    async fn test_price_and_save_route() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.tap(origin());
        assert!(!h.session.state().is_loading());
        h.session.tap(destination());
        assert!(h.session.state().is_loading());

        assert_eq!(h.session.settle().await, Resolution::Resolved);
        assert!(!h.session.state().is_loading());

        let cost = h.session.current_cost().unwrap();
        assert_eq!(format_cost(cost), "4.20€");
        assert_eq!(
            format_distance_km(h.session.state().route().unwrap().distance_meters),
            "15.0 km"
        );

        let trip_id = h.session.save().await.unwrap();
        assert!(h.session.state().selection().is_empty());
        assert!(h.session.state().route().is_none());
        assert!(!h.session.state().is_loading());

        let history = h.session.history().await.unwrap();
        assert_eq!(history.len(), 1);
        let trip = &history[0];
        assert_eq!(trip.id, trip_id);
        assert_eq!(trip.name, "A-6");
        assert_eq!(trip.distance_meters, 15_000.0);
        assert_eq!(trip.rate_per_km, 0.28);
        assert!((trip.total_cost - 4.20).abs() < 1e-9);
        assert_eq!(trip.origin, origin());
        assert_eq!(trip.destination, destination());
        assert!(trip.has_snapshot);
        assert_eq!(
            h.session.snapshot(trip_id).await.unwrap(),
            vec![0xff, 0xd8, 0xff, 0xe0]
        );
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_route_creates_nothing() {
        let mut h = harness(None, false).await;

        h.session.tap(origin());
        h.session.tap(destination());
        assert_eq!(h.session.settle().await, Resolution::Unavailable);

        assert!(!h.session.state().is_loading());
        assert!(h.session.state().route().is_none());
        assert!(matches!(h.session.save().await, Err(LedgerError::NoRoute)));
        assert!(h.session.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_third_tap_restarts_selection() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.tap(origin());
        h.session.tap(destination());
        h.session.settle().await;
        assert!(h.session.state().route().is_some());

        h.session.tap(Coordinate::new(41.0, -4.0));
        assert_eq!(h.session.state().selection().len(), 1);
        assert!(h.session.state().route().is_none());
        assert!(!h.session.state().is_loading());
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.tap(origin());
        h.session.tap(destination());
        let stale_generation = h.session.state().generation();
        h.session.reset();

        let resolution = h.session.apply(RouteEvent {
            generation: stale_generation,
            result: Ok(madrid_route()),
        });
        assert_eq!(resolution, Resolution::Stale);
        assert!(h.session.state().route().is_none());
        assert!(h.session.state().selection().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_failure_still_saves() {
        let mut h = harness(Some(madrid_route()), true).await;

        h.session.tap(origin());
        h.session.tap(destination());
        h.session.settle().await;

        let trip_id = h.session.save().await.unwrap();
        let trip = h.session.store().get(trip_id).await.unwrap().unwrap();
        assert!(!trip.has_snapshot);
        assert!(matches!(
            h.session.snapshot(trip_id).await,
            Err(LedgerError::NoSnapshot(id)) if id == trip_id
        ));
    }

    #[tokio::test]
    async fn test_save_while_resolving_is_busy() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.tap(origin());
        h.session.tap(destination());
        assert!(matches!(h.session.save().await, Err(LedgerError::Busy)));
    }

    #[tokio::test]
    async fn test_rate_change_does_not_touch_saved_trips() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.tap(origin());
        h.session.tap(destination());
        h.session.settle().await;
        let trip_id = h.session.save().await.unwrap();

        h.session.set_rate(1.0).unwrap();
        let trip = h.session.store().get(trip_id).await.unwrap().unwrap();
        assert_eq!(trip.rate_per_km, 0.28);
        assert!((trip.total_cost - 4.20).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unnamed_route_gets_default_name() {
        let mut route = madrid_route();
        route.name.clear();
        let mut h = harness(Some(route), false).await;

        h.session.tap(origin());
        h.session.tap(destination());
        h.session.settle().await;
        let trip_id = h.session.save().await.unwrap();

        let trip = h.session.store().get(trip_id).await.unwrap().unwrap();
        assert_eq!(trip.name, DEFAULT_TRIP_NAME);
    }

    #[tokio::test]
    async fn test_recall_restores_endpoints_and_rate() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.set_rate(0.35).unwrap();
        h.session.tap(origin());
        h.session.tap(destination());
        h.session.settle().await;
        let trip_id = h.session.save().await.unwrap();

        h.session.set_rate(0.10).unwrap();
        let trip = h.session.recall(trip_id).await.unwrap();
        assert_eq!(trip.id, trip_id);
        assert_eq!(h.session.state().selection().pair(), Some((origin(), destination())));
        assert_eq!(h.session.state().rate().per_km(), 0.35);
        assert!(h.session.state().is_loading());

        assert_eq!(h.session.settle().await, Resolution::Resolved);
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_recall_unknown_trip() {
        let mut h = harness(Some(madrid_route()), false).await;
        let missing = Uuid::new_v4();
        assert!(matches!(
            h.session.recall(missing).await,
            Err(LedgerError::NotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_current_location_is_tapped() {
        let mut h = harness(Some(madrid_route()), false).await;
        assert!(matches!(
            h.session.use_current_location(),
            Err(LedgerError::NoLocation)
        ));

        h.publisher.publish(Coordinate::new(40.4, -3.7));
        let coord = h.session.use_current_location().unwrap();
        assert_eq!(coord, Coordinate::new(40.4, -3.7));
        assert_eq!(h.session.state().selection().points(), &[coord]);
    }

    #[tokio::test]
    async fn test_navigation_needs_both_points() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.tap(origin());
        assert!(matches!(
            h.session.start_navigation(),
            Err(LedgerError::IncompleteSelection)
        ));

        h.session.tap(destination());
        h.session.start_navigation().unwrap();
        assert_eq!(
            h.opened.lock().unwrap().as_slice(),
            &[(origin(), destination())]
        );
    }

    #[tokio::test]
    async fn test_rate_adjustment_floor() {
        let mut h = harness(Some(madrid_route()), false).await;

        h.session.set_rate(0.02).unwrap();
        assert_eq!(h.session.decrement_rate().per_km(), 0.01);
        assert_eq!(h.session.decrement_rate().per_km(), 0.01);
        assert_eq!(h.session.increment_rate().per_km(), 0.02);
        assert!(matches!(
            h.session.set_rate(0.0),
            Err(LedgerError::InvalidRate(_))
        ));
    }

    #[tokio::test]
    async fn test_traffic_toggle_is_session_only() {
        let mut h = harness(Some(madrid_route()), false).await;
        assert!(!h.session.state().show_traffic());

        h.session.set_traffic(true);
        assert!(h.session.state().show_traffic());

        h.session.reset();
        assert!(h.session.state().show_traffic());

        h.session.set_traffic(false);
        assert!(!h.session.state().show_traffic());
    }

    #[tokio::test]
    async fn test_delete_single_unknown_trip() {
        let h = harness(Some(madrid_route()), false).await;
        assert_eq!(h.session.delete(&[Uuid::new_v4()]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_from_history() {
        let mut h = harness(Some(madrid_route()), false).await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            h.session.tap(origin());
            h.session.tap(destination());
            h.session.settle().await;
            ids.push(h.session.save().await.unwrap());
        }

        assert_eq!(h.session.delete(&[ids[1]]).await.unwrap(), 1);
        let remaining: Vec<Uuid> = h
            .session
            .history()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(remaining, vec![ids[2], ids[0]]);
    }
}
