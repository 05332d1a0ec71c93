use super::{CallBlock, CallOutcome, EntryPoint, HostLong, OutOfBoundsPolicyFn, UmatFn};
use super::output_status::buffer_to_string;
use super::{STATUS_NATIVE_EXCEPTION, STATUS_SUCCESS};
use crate::base::{BehaviourDescriptor, HostFamily, OutOfBoundsPolicy, StiffnessRequest, EPX_MESSAGE_CAPACITY};
use crate::material::BehaviourContract;
use crate::StrError;
use std::ffi::{c_char, c_int};
use tracing::{debug, warn};

/// Implements a behaviour compiled as a shared library for one of the host families
///
/// The entry point is loaded by the caller (e.g., with a dynamic loader).
pub struct NativeBehaviour {
    descriptor: BehaviourDescriptor,
    entry_point: EntryPoint,
    out_of_bounds_policy: Option<OutOfBoundsPolicyFn>,
}

/// Returns the integer encoding of an out-of-bounds policy
fn policy_code(policy: OutOfBoundsPolicy) -> c_int {
    match policy {
        OutOfBoundsPolicy::None => 0,
        OutOfBoundsPolicy::Warning => 1,
        OutOfBoundsPolicy::Strict => 2,
    }
}

/// Interprets the PNEWDT scalar of hosts where a value below one requests a sub-step
fn fraction_or_failure(pnewdt: f64, message: &str) -> CallOutcome {
    if pnewdt >= 0.0 && pnewdt < 1.0 {
        CallOutcome::success(pnewdt)
    } else {
        CallOutcome::failure(STATUS_NATIVE_EXCEPTION, message)
    }
}

impl NativeBehaviour {
    /// Allocates a new instance
    ///
    /// # Safety
    ///
    /// The entry point must follow the calling convention of its host family and
    /// must have been generated for the behaviour described by `descriptor`.
    pub unsafe fn new(descriptor: BehaviourDescriptor, entry_point: EntryPoint) -> Result<Self, StrError> {
        descriptor.validate()?;
        Ok(NativeBehaviour {
            descriptor,
            entry_point,
            out_of_bounds_policy: None,
        })
    }

    /// Sets the function forwarding the out-of-bounds policy to the library
    ///
    /// # Safety
    ///
    /// The function must belong to the same library as the entry point.
    pub unsafe fn set_out_of_bounds_policy_function(&mut self, function: OutOfBoundsPolicyFn) -> &mut Self {
        self.out_of_bounds_policy = Some(function);
        self
    }

    /// Calls the entry point
    fn call(&self, block: &mut CallBlock) -> CallOutcome {
        if let Err(message) = block.validate() {
            return CallOutcome::failure(STATUS_NATIVE_EXCEPTION, message);
        }
        debug!(
            behaviour = %self.descriptor.name,
            family = ?self.entry_point.family(),
            hypothesis = %block.convention.hypothesis,
            prediction = block.prediction,
            "calling native entry point"
        );
        unsafe {
            match self.entry_point {
                EntryPoint::Castem(f) => self.call_castem(f, block),
                EntryPoint::Abaqus(f) => self.call_abaqus(f, block),
                EntryPoint::Aster(f) => call_aster(f, block),
                EntryPoint::Cyrano(f) => call_cyrano(f, block),
                EntryPoint::Europlexus(f) => call_europlexus(f, block),
                EntryPoint::CalculiX(f) => self.call_calculix(f, block),
            }
        }
    }

    unsafe fn call_castem(&self, f: UmatFn<HostLong>, block: &mut CallBlock) -> CallOutcome {
        let ndi = block.convention.hypothesis_flag().unwrap_or(2) as HostLong;
        let nshr = 0 as HostLong;
        block.ndt = 1.0;
        let kinc = self.call_umat(f, block, ndi, nshr);
        if kinc == 1 {
            return CallOutcome::success(1.0);
        }
        fraction_or_failure(block.ndt, &format!("the behaviour reported a failure (KINC = {})", kinc))
    }

    unsafe fn call_abaqus(&self, f: UmatFn<c_int>, block: &mut CallBlock) -> CallOutcome {
        let ntens = block.n_force();
        let ndi: c_int = if ntens == 3 { 2 } else { 3 };
        let nshr = ntens as c_int - ndi;
        block.ndt = f64::MAX;
        self.call_umat(f, block, ndi, nshr);
        if block.ndt < 1.0 {
            return CallOutcome::success(f64::max(block.ndt, 0.0));
        }
        CallOutcome::success(1.0)
    }

    /// Calls a UMAT-like entry point and returns KINC
    ///
    /// The estimated time step fraction is read from and written to `block.ndt`.
    unsafe fn call_umat<I>(&self, f: UmatFn<I>, block: &mut CallBlock, ndi: I, nshr: I) -> I
    where
        I: Copy + From<i32>,
    {
        let ntens = I::from(block.n_force() as i32);
        let nstatv = I::from(block.internal_values.len() as i32);
        let nprops = I::from(block.n_material_properties as i32);
        let zero = I::from(0);
        let kstep = [zero; 4];
        let mut kinc = I::from(1);
        let n = block.n_force();
        let mut sse = 0.0;
        let mut spd = 0.0;
        let mut scd = 0.0;
        let mut rpl = 0.0;
        let mut ddsddt = vec![0.0; n];
        let mut drplde = vec![0.0; n];
        let mut drpldt = 0.0;
        let time = [0.0; 2];
        let coords = [0.0; 3];
        let celent = 0.0;
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let name = self.descriptor.name.as_bytes();
        f(
            block.stress.as_mut_ptr(),
            block.internal_values.as_mut_ptr(),
            block.tangent.as_mut_ptr(),
            &mut sse,
            &mut spd,
            &mut scd,
            &mut rpl,
            ddsddt.as_mut_ptr(),
            drplde.as_mut_ptr(),
            &mut drpldt,
            block.driving_begin.as_ptr(),
            block.driving_increment.as_ptr(),
            time.as_ptr(),
            &block.dt,
            &block.temperature,
            &block.temperature_increment,
            block.external_variables.as_ptr(),
            block.external_variables_increments.as_ptr(),
            name.as_ptr() as *const c_char,
            &ndi,
            &nshr,
            &ntens,
            &nstatv,
            block.material_properties.as_ptr(),
            &nprops,
            coords.as_ptr(),
            block.rotation.as_ptr(),
            &mut block.ndt,
            &celent,
            identity.as_ptr(),
            identity.as_ptr(),
            &zero,
            &zero,
            &zero,
            &zero,
            kstep.as_ptr(),
            &mut kinc,
            name.len() as c_int,
        );
        kinc
    }

    unsafe fn call_calculix(&self, f: super::CalculiXFn, block: &mut CallBlock) -> CallOutcome {
        let name = self.descriptor.name.as_bytes();
        let zero: c_int = 0;
        let one: c_int = 1;
        let nprops = block.n_material_properties as c_int;
        let nstatv = block.internal_values.len() as c_int;
        let ielas: c_int = if block.request == StiffnessRequest::Elastic { 1 } else { 0 };
        let mi: [c_int; 3] = [1, 3, 1];
        let elas = [0.0; 6];
        let beta = [0.0; 6];
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let jacobian = 1.0;
        let t1 = block.temperature + block.temperature_increment;
        let time = 0.0;
        let ttime = 0.0;
        let pgauss = [0.0; 3];
        let orab = [0.0; 7];
        let statev0 = block.internal_values.clone();
        block.ndt = -1.0;
        f(
            name.as_ptr() as *const c_char,
            &one,
            &one,
            &nprops,
            block.material_properties.as_ptr(),
            block.driving_end.as_ptr(),
            elas.as_ptr(),
            beta.as_ptr(),
            identity.as_ptr(),
            &jacobian,
            identity.as_ptr(),
            &jacobian,
            &one,
            &t1,
            &block.dt,
            &time,
            &ttime,
            &zero,
            &ielas,
            mi.as_ptr(),
            &nstatv,
            statev0.as_ptr(),
            block.internal_values.as_mut_ptr(),
            block.stress.as_mut_ptr(),
            block.tangent.as_mut_ptr(),
            &zero,
            pgauss.as_ptr(),
            orab.as_ptr(),
            &mut block.ndt,
            &zero,
            name.len() as c_int,
        );
        let pnewdt = block.ndt;
        if pnewdt == -1.0 || pnewdt >= 1.0 {
            return CallOutcome::success(1.0);
        }
        fraction_or_failure(pnewdt, "the behaviour reported a failure (PNEWDT < 0)")
    }
}

unsafe fn call_aster(f: super::AsterFn, block: &mut CallBlock) -> CallOutcome {
    let ntens = block.n_force() as HostLong;
    let nstatv = block.internal_values.len() as HostLong;
    let nprops = block.n_material_properties as HostLong;
    let nummod = block.convention.hypothesis_flag().unwrap_or(3) as HostLong;
    block.ndt = 1.0;
    f(
        block.stress.as_mut_ptr(),
        block.internal_values.as_mut_ptr(),
        block.tangent.as_mut_ptr(),
        block.driving_begin.as_ptr(),
        block.driving_increment.as_ptr(),
        &block.dt,
        &block.temperature,
        &block.temperature_increment,
        block.external_variables.as_ptr(),
        block.external_variables_increments.as_ptr(),
        &ntens,
        &nstatv,
        block.material_properties.as_ptr(),
        &nprops,
        block.rotation.as_ptr(),
        &mut block.ndt,
        &nummod,
    );
    if block.ndt >= 1.0 {
        return CallOutcome::success(1.0);
    }
    fraction_or_failure(block.ndt, "the behaviour reported a failure (PNEWDT < 0)")
}

unsafe fn call_cyrano(f: super::CyranoFn, block: &mut CallBlock) -> CallOutcome {
    let ntens = block.n_force() as HostLong;
    let nstatv = block.internal_values.len() as HostLong;
    let nprops = block.n_material_properties as HostLong;
    let ndi = block.convention.hypothesis_flag().unwrap_or(1) as HostLong;
    let mut kinc: HostLong = 1;
    block.status.reset();
    f(
        &ntens,
        &block.dt,
        block.rotation.as_ptr(),
        block.tangent.as_mut_ptr(),
        block.driving_begin.as_ptr(),
        block.driving_increment.as_ptr(),
        &block.temperature,
        &block.temperature_increment,
        block.material_properties.as_ptr(),
        &nprops,
        block.external_variables.as_ptr(),
        block.external_variables_increments.as_ptr(),
        block.internal_values.as_mut_ptr(),
        &nstatv,
        block.stress.as_mut_ptr(),
        &ndi,
        &mut kinc,
        &mut block.status,
    );
    if kinc == 1 {
        // the record may carry a warning
        return CallOutcome::from_status(&block.status, 1.0);
    }
    if block.status.status < 0 {
        return CallOutcome::from_status(&block.status, 0.0);
    }
    CallOutcome::failure(
        STATUS_NATIVE_EXCEPTION,
        &format!("the behaviour reported a failure (KINC = {})", kinc),
    )
}

unsafe fn call_europlexus(f: super::EuroplexusFn, block: &mut CallBlock) -> CallOutcome {
    let mut status: c_int = 0;
    let mut broken: c_int = 0;
    let mut msg: [c_char; EPX_MESSAGE_CAPACITY] = [0; EPX_MESSAGE_CAPACITY];
    let nstatv = block.internal_values.len() as c_int;
    let hypothesis = block.convention.hypothesis_flag().unwrap_or(3) as c_int;
    let nprops = block.n_material_properties as c_int;
    let npredef = block.n_external_variables as c_int;
    block.ndt = 1.0;
    f(
        &mut status,
        block.stress.as_mut_ptr(),
        block.internal_values.as_mut_ptr(),
        block.tangent.as_mut_ptr(),
        &mut block.ndt,
        &mut broken,
        msg.as_mut_ptr(),
        &nstatv,
        &hypothesis,
        &block.dt,
        block.driving_begin.as_ptr(),
        block.driving_end.as_ptr(),
        block.rotation.as_ptr(),
        block.material_properties.as_ptr(),
        &nprops,
        &block.temperature,
        &block.temperature_increment,
        block.external_variables.as_ptr(),
        block.external_variables_increments.as_ptr(),
        &npredef,
    );
    if broken != 0 {
        warn!(broken, "the behaviour reports a broken material point");
    }
    if status == STATUS_SUCCESS {
        if block.ndt < 1.0 {
            return CallOutcome::success(f64::max(block.ndt, 0.0));
        }
        return CallOutcome::success(1.0);
    }
    let message = buffer_to_string(&msg);
    let mut outcome = fraction_or_failure(block.ndt, &message);
    outcome.message = message;
    outcome
}

impl BehaviourContract for NativeBehaviour {
    fn descriptor(&self) -> &BehaviourDescriptor {
        &self.descriptor
    }

    fn host_family(&self) -> HostFamily {
        self.entry_point.family()
    }

    fn default_stiffness_request(&self) -> StiffnessRequest {
        StiffnessRequest::ConsistentTangent
    }

    fn supports_stiffness_request(&self, request: StiffnessRequest, prediction: bool) -> bool {
        match self.entry_point.family() {
            HostFamily::Castem | HostFamily::Aster | HostFamily::Cyrano | HostFamily::Europlexus => {
                request.host_flag(prediction).is_some()
            }
            HostFamily::Abaqus => !prediction && request == StiffnessRequest::ConsistentTangent,
            HostFamily::CalculiX => {
                !prediction && matches!(request, StiffnessRequest::ConsistentTangent | StiffnessRequest::Elastic)
            }
            HostFamily::Generic => false,
        }
    }

    fn set_out_of_bounds_policy(&self, policy: OutOfBoundsPolicy) -> bool {
        match self.out_of_bounds_policy {
            Some(f) => {
                unsafe { f(policy_code(policy)) };
                true
            }
            None => false,
        }
    }

    fn compute_prediction_operator(&self, block: &mut CallBlock) -> CallOutcome {
        if !self.supports_stiffness_request(block.request, true) {
            return CallOutcome::failure(
                STATUS_NATIVE_EXCEPTION,
                "the behaviour cannot compute the requested prediction operator",
            );
        }
        block.prediction = true;
        self.call(block)
    }

    fn integrate(&self, block: &mut CallBlock) -> CallOutcome {
        block.prediction = false;
        self.call(block)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{fraction_or_failure, NativeBehaviour};
    use crate::base::{sample_elastic_descriptor, BehaviourKind, HostFamily, Hypothesis, OutOfBoundsPolicy};
    use crate::base::{StiffnessRequest, SQRT_2};
    use crate::convention::HostConvention;
    use crate::material::BehaviourContract;
    use crate::native::{CallBlock, EntryPoint, HostLong, StatusClass};
    use russell_lab::approx_eq;
    use std::ffi::{c_char, c_int};
    use std::sync::atomic::{AtomicI32, Ordering};

    // σ = E ε on the diagonal, engineering shear strains, stress flag check
    unsafe extern "C" fn castem_stub(
        stress: *mut f64,
        _statev: *mut f64,
        ddsdde: *mut f64,
        _sse: *mut f64,
        _spd: *mut f64,
        _scd: *mut f64,
        _rpl: *mut f64,
        _ddsddt: *mut f64,
        _drplde: *mut f64,
        _drpldt: *mut f64,
        stran: *const f64,
        dstran: *const f64,
        _time: *const f64,
        _dtime: *const f64,
        _temp: *const f64,
        _dtemp: *const f64,
        _predef: *const f64,
        _dpred: *const f64,
        _cmname: *const c_char,
        ndi: *const HostLong,
        _nshr: *const HostLong,
        ntens: *const HostLong,
        _nstatv: *const HostLong,
        props: *const f64,
        _nprops: *const HostLong,
        _coords: *const f64,
        _drot: *const f64,
        pnewdt: *mut f64,
        _celent: *const f64,
        _dfgrd0: *const f64,
        _dfgrd1: *const f64,
        _noel: *const HostLong,
        _npt: *const HostLong,
        _layer: *const HostLong,
        _kspt: *const HostLong,
        _kstep: *const HostLong,
        kinc: *mut HostLong,
        _cmname_len: c_int,
    ) {
        let n = *ntens as usize;
        let young = *props;
        if *ndi != -1 || *ddsdde != 4.0 {
            *kinc = -1;
            return;
        }
        if young < 0.0 {
            *pnewdt = 0.25;
            *kinc = -1;
            return;
        }
        for i in 0..n {
            *ddsdde.add(i + i * n) = young;
            *stress.add(i) = young * (*stran.add(i) + *dstran.add(i));
        }
    }

    fn behaviour() -> NativeBehaviour {
        unsafe { NativeBehaviour::new(sample_elastic_descriptor(), EntryPoint::Castem(castem_stub)).unwrap() }
    }

    fn castem_block(behaviour: &NativeBehaviour, young: f64) -> CallBlock {
        let conv = HostConvention::new(HostFamily::Castem, BehaviourKind::SmallStrain, Hypothesis::PlaneStrain).unwrap();
        let n_mp = behaviour
            .descriptor()
            .host_material_property_names(HostFamily::Castem, Hypothesis::PlaneStrain)
            .len();
        let mut block = CallBlock::new(conv, StiffnessRequest::ConsistentTangent, false, n_mp, 0, 0);
        block.material_properties[0] = young;
        block.driving_increment = vec![1e-3, 0.0, 0.0, 2e-3 * SQRT_2];
        block.reset_outputs();
        block
    }

    #[test]
    fn helpers_work() {
        assert_eq!(fraction_or_failure(0.3, "fail").ndt, 0.3);
        assert_eq!(fraction_or_failure(-1.0, "fail").class(), StatusClass::NativeException);
        assert_eq!(fraction_or_failure(2.0, "fail").message, "fail");
    }

    #[test]
    fn castem_call_works() {
        let behaviour = behaviour();
        assert_eq!(behaviour.host_family(), HostFamily::Castem);
        let mut block = castem_block(&behaviour, 100.0);
        let outcome = behaviour.integrate(&mut block);
        assert_eq!(outcome.class(), StatusClass::Success);
        assert_eq!(outcome.ndt, 1.0);
        approx_eq(block.stress[0], 0.1, 1e-15);
        approx_eq(block.stress[3], 0.2 * SQRT_2, 1e-15);
        assert_eq!(block.tangent[0], 100.0);
        assert_eq!(block.tangent[5], 100.0);
    }

    #[test]
    fn castem_call_captures_failures() {
        let behaviour = behaviour();
        let mut block = castem_block(&behaviour, -100.0);
        let outcome = behaviour.integrate(&mut block);
        assert_eq!(outcome.class(), StatusClass::Success);
        assert_eq!(outcome.ndt, 0.25);
        let mut block = castem_block(&behaviour, 100.0);
        block.request = StiffnessRequest::Elastic;
        block.reset_outputs();
        let outcome = behaviour.integrate(&mut block);
        assert_eq!(outcome.class(), StatusClass::NativeException);
        assert_eq!(outcome.message, "the behaviour reported a failure (KINC = -1)");
        let mut block = castem_block(&behaviour, 100.0);
        block.stress.push(0.0);
        let outcome = behaviour.integrate(&mut block);
        assert_eq!(outcome.message, "the stress buffer has an incorrect size");
    }

    #[test]
    fn supports_stiffness_request_works() {
        let behaviour = behaviour();
        assert!(behaviour.supports_stiffness_request(StiffnessRequest::Secant, true));
        assert!(!behaviour.supports_stiffness_request(StiffnessRequest::ConsistentTangent, true));
        assert!(behaviour.supports_stiffness_request(StiffnessRequest::ConsistentTangent, false));
        let mut block = castem_block(&behaviour, 100.0);
        let outcome = behaviour.compute_prediction_operator(&mut block);
        assert_eq!(
            outcome.message,
            "the behaviour cannot compute the requested prediction operator"
        );
    }

    static POLICY: AtomicI32 = AtomicI32::new(-1);

    unsafe extern "C" fn policy_stub(policy: c_int) {
        POLICY.store(policy, Ordering::SeqCst);
    }

    #[test]
    fn set_out_of_bounds_policy_works() {
        let mut behaviour = behaviour();
        assert!(!behaviour.set_out_of_bounds_policy(OutOfBoundsPolicy::Strict));
        unsafe {
            behaviour.set_out_of_bounds_policy_function(policy_stub);
        }
        assert!(behaviour.set_out_of_bounds_policy(OutOfBoundsPolicy::Strict));
        assert_eq!(POLICY.load(Ordering::SeqCst), 2);
        assert!(behaviour.set_out_of_bounds_policy(OutOfBoundsPolicy::Warning));
        assert_eq!(POLICY.load(Ordering::SeqCst), 1);
    }
}
