use crate::cost::{compute_cost, Rate};
use crate::models::{Coordinate, ResolvedRoute};
use crate::selection::{RouteSelection, SelectionOutcome};

/// Everything the ledger screen shows, mutated only through these methods.
///
/// `generation` identifies the current route request; a resolution result is
/// only accepted while its generation is still current.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    selection: RouteSelection,
    route: Option<ResolvedRoute>,
    loading: bool,
    rate: Rate,
    show_traffic: bool,
    generation: u64,
}

impl AppState {
    pub fn new(rate: Rate) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &RouteSelection {
        &self.selection
    }

    pub fn route(&self) -> Option<&ResolvedRoute> {
        self.route.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn rate_mut(&mut self) -> &mut Rate {
        &mut self.rate
    }

    pub fn show_traffic(&self) -> bool {
        self.show_traffic
    }

    pub fn set_traffic(&mut self, on: bool) {
        self.show_traffic = on;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Cost of the resolved route at the current rate.
    pub fn current_cost(&self) -> Option<f64> {
        self.route
            .as_ref()
            .map(|route| compute_cost(route.distance_meters, self.rate.per_km()))
    }

    /// Adds a tapped point. A restart drops the previous route and
    /// invalidates any pending request.
    pub fn add_point(&mut self, coord: Coordinate) -> SelectionOutcome {
        let outcome = self.selection.add_point(coord);
        if outcome.restarted {
            self.invalidate();
        }
        outcome
    }

    pub fn replace_selection(&mut self, origin: Coordinate, destination: Coordinate) {
        self.invalidate();
        self.selection.replace(origin, destination);
    }

    /// Clears selection and route; any pending request becomes stale.
    pub fn clear(&mut self) {
        self.selection.reset();
        self.invalidate();
    }

    /// Marks a new route request as pending and returns its generation.
    pub fn begin_resolution(&mut self) -> u64 {
        self.invalidate();
        self.loading = true;
        self.generation
    }

    pub fn finish_resolution(&mut self, route: Option<ResolvedRoute>) {
        self.route = route;
        self.loading = false;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn invalidate(&mut self) {
        self.route = None;
        self.loading = false;
        self.generation += 1;
    }
}
