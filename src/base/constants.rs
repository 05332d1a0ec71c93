/// Square root of two
pub const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Inverse of the square root of two
pub const INV_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Capacity of the message buffer of the status record
pub const STATUS_MESSAGE_CAPACITY: usize = 512;

/// Capacity of the message buffer of the Europlexus interface
pub const EPX_MESSAGE_CAPACITY: usize = 256;

/// Name of the extra internal variable added by the generic plane stress algorithm
pub const AXIAL_STRAIN: &str = "AxialStrain";
