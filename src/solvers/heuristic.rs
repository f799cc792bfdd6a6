use std::str::FromStr;

use crate::maze::Coord;

/// Distance estimates for A*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// `|drow| + |dcol|`. Admissible and consistent on a 4-connected unit-cost grid.
    #[default]
    Manhattan,
    /// Straight-line distance. Admissible, but less informed than Manhattan.
    Euclidean,
    /// Manhattan plus Euclidean.
    ///
    /// Counts the distance twice, so it overestimates and A* may return a longer path. Only
    /// useful for comparing against the admissible estimates.
    Combined,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::Manhattan,
        Heuristic::Euclidean,
        Heuristic::Combined,
    ];

    pub fn is_admissible(self) -> bool {
        !matches!(self, Heuristic::Combined)
    }

    pub fn estimate(self, a: Coord, b: Coord) -> f64 {
        let drow = a.0.abs_diff(b.0) as f64;
        let dcol = a.1.abs_diff(b.1) as f64;
        let manhattan = drow + dcol;
        let euclidean = (drow * drow + dcol * dcol).sqrt();
        match self {
            Heuristic::Manhattan => manhattan,
            Heuristic::Euclidean => euclidean,
            Heuristic::Combined => manhattan + euclidean,
        }
    }
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Heuristic::Manhattan => write!(f, "manhattan"),
            Heuristic::Euclidean => write!(f, "euclidean"),
            Heuristic::Combined => write!(f, "combined"),
        }
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            "combined" | "both" => Ok(Heuristic::Combined),
            other => Err(format!("Unknown heuristic '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimates() {
        let (a, b) = ((1, 1), (4, 5));
        assert_eq!(Heuristic::Manhattan.estimate(a, b), 7.0);
        assert_eq!(Heuristic::Euclidean.estimate(a, b), 5.0);
        assert_eq!(Heuristic::Combined.estimate(a, b), 12.0);
        // Symmetric
        assert_eq!(Heuristic::Manhattan.estimate(b, a), 7.0);
        for heuristic in Heuristic::ALL {
            assert_eq!(heuristic.estimate(a, a), 0.0);
        }
    }

    #[test]
    fn test_euclidean_never_exceeds_manhattan() {
        for a in [(0, 0), (3, 7), (10, 2)] {
            for b in [(0, 0), (5, 5), (9, 1)] {
                assert!(Heuristic::Euclidean.estimate(a, b) <= Heuristic::Manhattan.estimate(a, b));
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("Manhattan".parse(), Ok(Heuristic::Manhattan));
        assert_eq!("both".parse(), Ok(Heuristic::Combined));
        assert!(!Heuristic::Combined.is_admissible());
        assert!("chebyshev".parse::<Heuristic>().is_err());
    }
}
