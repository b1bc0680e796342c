use crate::label::{Factor, MathLabel};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

static REALS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^R(\d+)$").unwrap());

/// Dimension of the Euclidean factor carried by the `*RN` product spaces.
pub const PRODUCT_REALS_DIM: u32 = 6;

/// Configuration spaces and fibers that can appear in a hierarchy diagram.
///
/// The first group (`Real`, `Se2`, `Se3`, `Se2Rn`, `Se3Rn`, `So2`, `So3`) are
/// valid robot `type` tokens. `Rn`, `So2Rn` and `So3Rn` only ever show up as
/// the fiber between two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceType {
    Real(u32),
    Se2,
    Se3,
    Se2Rn,
    Se3Rn,
    So2,
    So3,
    Rn,
    So2Rn,
    So3Rn,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpaceError {
    #[error("unknown configuration space type `{0}`")]
    Unknown(String),
    #[error("`{0}` is a fiber type and cannot be used as a robot type")]
    FiberOnly(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FiberError {
    #[error("could not determine fiber type of bundle {bundle} over base {base}")]
    Unsupported { base: SpaceType, bundle: SpaceType },
    #[error("base {base} has more dimensions than bundle {bundle}")]
    NegativeDimension { base: SpaceType, bundle: SpaceType },
}

impl SpaceType {
    /// Parses a robot `type` attribute.
    pub fn from_token(token: &str) -> Result<Self, SpaceError> {
        let token = token.trim();
        if let Some(caps) = REALS_RE.captures(token) {
            return match caps[1].parse::<u32>() {
                Ok(n) if n > 0 => Ok(Self::Real(n)),
                _ => Err(SpaceError::Unknown(token.to_string())),
            };
        }
        match token {
            "SE2" => Ok(Self::Se2),
            "SE3" => Ok(Self::Se3),
            "SE2RN" => Ok(Self::Se2Rn),
            "SE3RN" => Ok(Self::Se3Rn),
            "SO2" => Ok(Self::So2),
            "SO3" => Ok(Self::So3),
            "RN" | "SO2RN" | "SO3RN" => Err(SpaceError::FiberOnly(token.to_string())),
            _ => Err(SpaceError::Unknown(token.to_string())),
        }
    }

    pub fn token(&self) -> String {
        match self {
            Self::Real(n) => format!("R{n}"),
            Self::Se2 => "SE2".to_string(),
            Self::Se3 => "SE3".to_string(),
            Self::Se2Rn => "SE2RN".to_string(),
            Self::Se3Rn => "SE3RN".to_string(),
            Self::So2 => "SO2".to_string(),
            Self::So3 => "SO3".to_string(),
            Self::Rn => "RN".to_string(),
            Self::So2Rn => "SO2RN".to_string(),
            Self::So3Rn => "SO3RN".to_string(),
        }
    }

    /// Number of dimension units the space occupies in the diagram.
    pub fn dimension(&self) -> u32 {
        match self {
            Self::Real(n) => *n,
            Self::Se2 => 3,
            Self::Se3 => 6,
            Self::Se2Rn => 3 + PRODUCT_REALS_DIM,
            Self::Se3Rn => 6 + PRODUCT_REALS_DIM,
            Self::So2 => 1,
            Self::So3 => 3,
            Self::Rn => PRODUCT_REALS_DIM,
            Self::So2Rn => 1 + PRODUCT_REALS_DIM,
            Self::So3Rn => 3 + PRODUCT_REALS_DIM,
        }
    }

    pub fn label(&self) -> MathLabel {
        let group = |name: &'static str, n: u32| Factor::Group { name, n };
        let reals = Factor::Reals(PRODUCT_REALS_DIM);
        let factors = match self {
            Self::Real(n) => vec![Factor::Reals(*n)],
            Self::Se2 => vec![group("SE", 2)],
            Self::Se3 => vec![group("SE", 3)],
            Self::Se2Rn => vec![group("SE", 2), reals],
            Self::Se3Rn => vec![group("SE", 3), reals],
            Self::So2 => vec![group("SO", 2)],
            Self::So3 => vec![group("SO", 3)],
            Self::Rn => vec![reals],
            Self::So2Rn => vec![group("SO", 2), reals],
            Self::So3Rn => vec![group("SO", 3), reals],
        };
        MathLabel::new(factors)
    }

    /// Whether the space leads with a matrix group (SO/SE); such fiber labels
    /// sit further left inside their box.
    pub fn is_group_led(&self) -> bool {
        self.token().starts_with('S')
    }
}

impl fmt::Display for SpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Infers the fiber `F` such that `bundle` decomposes over `base` with fiber `F`.
pub fn infer_fiber(base: SpaceType, bundle: SpaceType) -> Result<SpaceType, FiberError> {
    use SpaceType::*;

    let fiber = match (bundle, base) {
        (Real(n), Real(m)) => {
            if m > n {
                return Err(FiberError::NegativeDimension { base, bundle });
            }
            Real(n - m)
        }
        (Se3, Real(3)) => So3,
        (Se2, Real(2)) => So2,
        (Se2Rn, Real(2)) => So2Rn,
        (Se2Rn, Se2) => Rn,
        (Se3Rn, Real(3)) => So3Rn,
        (Se3Rn, Se3) => Rn,
        _ => return Err(FiberError::Unsupported { base, bundle }),
    };
    tracing::info!(%base, %bundle, %fiber, "classified fiber");
    Ok(fiber)
}
