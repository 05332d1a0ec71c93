use super::OutOfBoundsPolicy;
use crate::StrError;
use std::fmt;

/// Holds the settings of the integration driver
#[derive(Clone, Debug)]
pub struct DriverSettings {
    /// Uses the default stiffness of the behaviour when the requested kind cannot be supplied
    ///
    /// Otherwise, requesting an unsupported stiffness is a configuration error.
    pub stiffness_fallback: bool,

    /// Checks that the stress and the tangent operator returned by the behaviour are finite
    pub check_finite_outputs: bool,

    /// Policy forwarded to behaviours checking the bounds of their arguments
    pub out_of_bounds_policy: OutOfBoundsPolicy,

    /// Restores the ambient errno after each native call
    pub restore_errno: bool,

    /// Smallest non-zero time increment accepted by the driver
    pub dt_min: f64,

    /// Absolute tolerance on the out-of-plane stress of the generic plane stress algorithm
    pub plane_stress_tolerance: f64,

    /// Maximum number of iterations of the generic plane stress algorithm
    pub plane_stress_max_iterations: usize,
}

impl DriverSettings {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        DriverSettings {
            stiffness_fallback: false,
            check_finite_outputs: true,
            out_of_bounds_policy: OutOfBoundsPolicy::None,
            restore_errno: true,
            dt_min: 0.0,
            plane_stress_tolerance: 1e-8,
            plane_stress_max_iterations: 20,
        }
    }

    /// Sets the stiffness fallback option
    pub fn set_stiffness_fallback(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.stiffness_fallback = flag;
        Ok(self)
    }

    /// Sets the check for non-finite outputs
    pub fn set_check_finite_outputs(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.check_finite_outputs = flag;
        Ok(self)
    }

    /// Sets the out-of-bounds policy
    pub fn set_out_of_bounds_policy(&mut self, policy: OutOfBoundsPolicy) -> Result<&mut Self, StrError> {
        self.out_of_bounds_policy = policy;
        Ok(self)
    }

    /// Sets the option to restore errno after each native call
    pub fn set_restore_errno(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.restore_errno = flag;
        Ok(self)
    }

    /// Sets the smallest non-zero time increment
    pub fn set_dt_min(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value < 0.0 || !value.is_finite() {
            return Err("dt_min must be finite and ≥ 0.0");
        }
        self.dt_min = value;
        Ok(self)
    }

    /// Sets the parameters of the generic plane stress algorithm
    pub fn set_plane_stress_iterations(&mut self, tolerance: f64, max_iterations: usize) -> Result<&mut Self, StrError> {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err("plane_stress_tolerance must be finite and > 0.0");
        }
        if max_iterations < 1 {
            return Err("plane_stress_max_iterations must be ≥ 1");
        }
        self.plane_stress_tolerance = tolerance;
        self.plane_stress_max_iterations = max_iterations;
        Ok(self)
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        DriverSettings::new()
    }
}

impl fmt::Display for DriverSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Driver settings\n").unwrap();
        write!(f, "===============\n").unwrap();
        write!(f, "stiffness_fallback = {:?}\n", self.stiffness_fallback).unwrap();
        write!(f, "check_finite_outputs = {:?}\n", self.check_finite_outputs).unwrap();
        write!(f, "out_of_bounds_policy = {:?}\n", self.out_of_bounds_policy).unwrap();
        write!(f, "restore_errno = {:?}\n", self.restore_errno).unwrap();
        write!(f, "dt_min = {:?}\n", self.dt_min).unwrap();
        write!(f, "plane_stress_tolerance = {:?}\n", self.plane_stress_tolerance).unwrap();
        write!(f, "plane_stress_max_iterations = {:?}\n", self.plane_stress_max_iterations).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
