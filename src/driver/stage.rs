use crate::base::Hypothesis;
use std::fmt;

/// Defines the stages of the integration driver
///
/// ```text
/// NotStarted → Dispatched(h) → Converted → Called → Interpreted → Committed
///                    │              │          │          │
///                    └──────────────┴──────────┴──────────┴─────→ RolledBack
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriverStage {
    NotStarted,

    /// The hypothesis was accepted and the host convention was selected
    Dispatched(Hypothesis),

    /// The inputs were copied into the call block
    Converted,

    /// The behaviour returned (normally or via a caught panic)
    Called,

    /// The outcome was classified and the outputs were converted back
    Interpreted,

    /// The results were written into the end-of-step values
    Committed,

    /// The call failed and the state was left untouched
    RolledBack,
}

impl DriverStage {
    /// Indicates whether the stage ends a call of the driver
    pub fn is_final(&self) -> bool {
        matches!(self, DriverStage::Committed | DriverStage::RolledBack)
    }

    /// Indicates whether the transition `self → next` is allowed
    ///
    /// The generic plane stress algorithm loops over `Converted → Called → Interpreted`.
    pub fn allows(&self, next: DriverStage) -> bool {
        match (self, next) {
            (_, DriverStage::RolledBack) => !self.is_final(),
            (DriverStage::NotStarted, DriverStage::Dispatched(..)) => true,
            (DriverStage::Dispatched(..), DriverStage::Converted) => true,
            (DriverStage::Dispatched(..), DriverStage::Interpreted) => true, // elastic prediction from properties
            (DriverStage::Converted, DriverStage::Called) => true,
            (DriverStage::Called, DriverStage::Interpreted) => true,
            (DriverStage::Interpreted, DriverStage::Converted) => true,
            (DriverStage::Interpreted, DriverStage::Committed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DriverStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverStage::Dispatched(h) => write!(f, "Dispatched({})", h),
            _ => write!(f, "{:?}", self),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
