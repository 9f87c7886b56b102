use crate::models::Coordinate;

pub const MAX_POINTS: usize = 2;

/// Result of adding a point to a [`RouteSelection`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionOutcome {
    /// The selection was full and got cleared before the new point was added.
    pub restarted: bool,
    /// Set once origin and destination are both known.
    pub pair: Option<(Coordinate, Coordinate)>,
}

/// Origin/destination picked by the user, in tap order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSelection {
    points: Vec<Coordinate>,
}

impl RouteSelection {
    pub fn add_point(&mut self, coord: Coordinate) -> SelectionOutcome {
        let restarted = self.points.len() >= MAX_POINTS;
        if restarted {
            self.points.clear();
        }
        self.points.push(coord);

        SelectionOutcome {
            restarted,
            pair: self.pair(),
        }
    }

    /// Replaces the whole selection with a complete pair.
    pub fn replace(&mut self, origin: Coordinate, destination: Coordinate) {
        self.points.clear();
        self.points.push(origin);
        self.points.push(destination);
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    pub fn pair(&self) -> Option<(Coordinate, Coordinate)> {
        match self.points.as_slice() {
            [origin, destination] => Some((*origin, *destination)),
            _ => None,
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_point_completes_pair() {
        let mut selection = RouteSelection::default();
        let origin = Coordinate::new(40.0, -3.0);
        let destination = Coordinate::new(40.1, -3.1);

        let first = selection.add_point(origin);
        assert_eq!(first.pair, None);
        assert!(!first.restarted);

        let second = selection.add_point(destination);
        assert_eq!(second.pair, Some((origin, destination)));
        assert!(!second.restarted);
    }

    #[test]
    fn test_third_point_restarts_selection() {
        let mut selection = RouteSelection::default();
        selection.add_point(Coordinate::new(1.0, 1.0));
        selection.add_point(Coordinate::new(2.0, 2.0));

        let third = selection.add_point(Coordinate::new(3.0, 3.0));
        assert!(third.restarted);
        assert_eq!(third.pair, None);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.points()[0], Coordinate::new(3.0, 3.0));
    }

    #[test]
    fn test_out_of_range_points_are_accepted() {
        let mut selection = RouteSelection::default();
        selection.add_point(Coordinate::new(123.0, -500.0));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_reset_clears() {
        let mut selection = RouteSelection::default();
        selection.replace(Coordinate::new(1.0, 1.0), Coordinate::new(2.0, 2.0));
        assert!(selection.pair().is_some());

        selection.reset();
        assert!(selection.is_empty());
    }
}
