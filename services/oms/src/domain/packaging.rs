//! Packaging kinds and the parse-boundary discipline shared by `Packaging`
//! and `EventType` (see `domain::event`).

use pvz_common::PvzError;
use std::fmt;
use std::str::FromStr;

/// Closed set of packaging kinds a parcel may be wrapped in.
///
/// `Unknown` is a parse-boundary sentinel only: business logic never
/// constructs it, it exists purely so [`Packaging::from_str`] has somewhere
/// to land before raising [`PvzError::InvalidArgument`], mirroring the
/// original `domain.PackagingType` parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Packaging {
    /// Rigid box, up to 30 000 g.
    Box,
    /// Flexible bag, up to 10 000 g.
    Bag,
    /// Plastic film wrap, unbounded weight.
    Film,
    /// Parse-boundary sentinel; never valid on a persisted order.
    #[doc(hidden)]
    Unknown,
}

impl Packaging {
    /// Surcharge this packaging kind adds to an order's cost, in minor units.
    #[must_use]
    pub const fn surcharge(self) -> i64 {
        match self {
            Self::Box => pvz_common::constants::surcharge::BOX,
            Self::Bag => pvz_common::constants::surcharge::BAG,
            Self::Film => pvz_common::constants::surcharge::FILM,
            Self::Unknown => 0,
        }
    }

    /// Maximum weight, in grams, this packaging kind may hold. `None` means
    /// unbounded (Film).
    #[must_use]
    pub const fn weight_limit(self) -> Option<i64> {
        match self {
            Self::Box => Some(pvz_common::constants::weight_limit::BOX),
            Self::Bag => Some(pvz_common::constants::weight_limit::BAG),
            Self::Film | Self::Unknown => None,
        }
    }
}

impl fmt::Display for Packaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Box => "box",
            Self::Bag => "bag",
            Self::Film => "film",
            Self::Unknown => "unknown",
        };
        write!(f, "{token}")
    }
}

impl FromStr for Packaging {
    type Err = PvzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(Self::Box),
            "bag" => Ok(Self::Bag),
            "film" => Ok(Self::Film),
            other => Err(PvzError::invalid_argument(format!(
                "unknown packaging kind: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        for kind in [Packaging::Box, Packaging::Bag, Packaging::Film] {
            assert_eq!(kind.to_string().parse::<Packaging>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_token_is_invalid_argument() {
        let err = "crate".parse::<Packaging>().unwrap_err();
        assert_eq!(err.kind(), pvz_common::error::PvzErrorKind::InvalidArgument);
    }

    #[test]
    fn surcharges_match_spec_constants() {
        assert_eq!(Packaging::Box.surcharge(), 2000);
        assert_eq!(Packaging::Bag.surcharge(), 500);
        assert_eq!(Packaging::Film.surcharge(), 100);
    }
}
