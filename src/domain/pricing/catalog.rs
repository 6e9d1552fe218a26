//! Enumerations used as lookup keys
//!
//! Every enumeration carries an `Unknown` arm. Values this build does not
//! recognise parse to `Unknown` instead of failing, and each lookup table
//! decides what `Unknown` resolves to.

/// Common surface of every catalog enumeration, for code that handles
/// table keys generically.
pub trait CatalogKey: Copy + Ord + std::fmt::Display {
    fn from_wire(value: &str) -> Self;
    fn wire_name(&self) -> &'static str;

    fn is_recognised(&self) -> bool {
        self.wire_name() != "UNKNOWN"
    }
}

macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Not recognised by this build
            Unknown,
        }

        impl $name {
            /// All recognised values, in declaration order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Unknown => "UNKNOWN",
                }
            }

            /// Parse a wire name. Unrecognised names become `Unknown`.
            pub fn parse(value: &str) -> Self {
                match value.trim() {
                    $( $wire => $name::$variant, )+
                    _ => $name::Unknown,
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown)
            }
        }

        impl CatalogKey for $name {
            fn from_wire(value: &str) -> Self {
                Self::parse(value)
            }

            fn wire_name(&self) -> &'static str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

catalog_enum! {
    /// Ambulance vehicle category
    pub enum VehicleType {
        BasicLifeSupport => "BASIC_LIFE_SUPPORT",
        AdvancedLifeSupport => "ADVANCED_LIFE_SUPPORT",
        CriticalCare => "CRITICAL_CARE",
        PatientTransport => "PATIENT_TRANSPORT",
        Neonatal => "NEONATAL",
    }
}

catalog_enum! {
    /// Dispatch urgency tier
    pub enum ServiceLevel {
        Standard => "STANDARD",
        Urgent => "URGENT",
        Emergency => "EMERGENCY",
    }
}

catalog_enum! {
    /// Service zone. Encoded in the per-km distance rate, never a multiplier.
    pub enum Zone {
        Urban => "URBAN",
        Suburban => "SUBURBAN",
        Rural => "RURAL",
        Remote => "REMOTE",
    }
}

catalog_enum! {
    /// Time-of-day class driving the base-rate multiplier
    pub enum TimeOfDay {
        Normal => "NORMAL",
        Night => "NIGHT",
        Weekend => "WEEKEND",
        Holiday => "HOLIDAY",
    }
}

catalog_enum! {
    /// On-board equipment billed per dispatch
    pub enum Equipment {
        Oxygen => "OXYGEN",
        Defibrillator => "DEFIBRILLATOR",
        Ventilator => "VENTILATOR",
        CardiacMonitor => "CARDIAC_MONITOR",
        SuctionUnit => "SUCTION_UNIT",
        Incubator => "INCUBATOR",
    }
}

catalog_enum! {
    /// Accompanying medical staff billed per head
    pub enum StaffType {
        Emt => "EMT",
        Paramedic => "PARAMEDIC",
        Nurse => "NURSE",
        Doctor => "DOCTOR",
        RespiratoryTherapist => "RESPIRATORY_THERAPIST",
    }
}

catalog_enum! {
    /// GST slab
    pub enum TaxClass {
        Zero => "ZERO",
        Five => "FIVE",
        Twelve => "TWELVE",
        Eighteen => "EIGHTEEN",
        TwentyEight => "TWENTY_EIGHT",
    }
}

catalog_enum! {
    /// Insurance plan tier
    pub enum CoverageClass {
        Basic => "BASIC",
        Standard => "STANDARD",
        Premium => "PREMIUM",
        Comprehensive => "COMPREHENSIVE",
    }
}
