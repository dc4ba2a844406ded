//! This module defines the unit types used for quantities in the model.
//!
//! Every time step is one hour long, so a power sustained over a step has the same numeric value as
//! the energy it delivers. The types are kept separate anyway so that inputs can't be mixed up.
use serde::{Deserialize, Serialize};

macro_rules! unit_struct {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::Display,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is neither infinite nor NaN
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl From<$name> for f64 {
            fn from(val: $name) -> Self {
                val.0
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }
    };
}

unit_struct!(Dimensionless, "A dimensionless quantity, e.g. an efficiency.");
unit_struct!(Power, "Electrical power in kW, averaged over one time step.");
unit_struct!(Energy, "Stored energy in kWh.");
unit_struct!(Money, "An amount of money.");
unit_struct!(MoneyPerEnergy, "A price per kWh.");

impl std::ops::Mul<MoneyPerEnergy> for Energy {
    type Output = Money;
    fn mul(self, rhs: MoneyPerEnergy) -> Money {
        Money(self.0 * rhs.0)
    }
}

impl Power {
    /// The energy delivered by this power over a single one-hour time step
    pub fn over_step(self) -> Energy {
        Energy(self.0)
    }
}
