use super::OutputStatus;
use crate::base::HostFamily;
use std::ffi::{c_char, c_int};
use std::fmt;

/// Integer type of the Cast3M, Aster and Cyrano interfaces
#[cfg(not(windows))]
pub type HostLong = std::ffi::c_long;

/// Integer type of the Cast3M, Aster and Cyrano interfaces
#[cfg(windows)]
pub type HostLong = std::ffi::c_longlong;

/// Defines the standard UMAT signature (Cast3M and Abaqus)
///
/// ```text
/// STRESS, STATEV, DDSDDE, SSE, SPD, SCD, RPL, DDSDDT, DRPLDE, DRPLDT,
/// STRAN, DSTRAN, TIME, DTIME, TEMP, DTEMP, PREDEF, DPRED, CMNAME,
/// NDI, NSHR, NTENS, NSTATV, PROPS, NPROPS, COORDS, DROT, PNEWDT,
/// CELENT, DFGRD0, DFGRD1, NOEL, NPT, LAYER, KSPT, KSTEP, KINC,
/// (hidden length of CMNAME)
/// ```
pub type UmatFn<I> = unsafe extern "C" fn(
    stress: *mut f64,
    statev: *mut f64,
    ddsdde: *mut f64,
    sse: *mut f64,
    spd: *mut f64,
    scd: *mut f64,
    rpl: *mut f64,
    ddsddt: *mut f64,
    drplde: *mut f64,
    drpldt: *mut f64,
    stran: *const f64,
    dstran: *const f64,
    time: *const f64,
    dtime: *const f64,
    temp: *const f64,
    dtemp: *const f64,
    predef: *const f64,
    dpred: *const f64,
    cmname: *const c_char,
    ndi: *const I,
    nshr: *const I,
    ntens: *const I,
    nstatv: *const I,
    props: *const f64,
    nprops: *const I,
    coords: *const f64,
    drot: *const f64,
    pnewdt: *mut f64,
    celent: *const f64,
    dfgrd0: *const f64,
    dfgrd1: *const f64,
    noel: *const I,
    npt: *const I,
    layer: *const I,
    kspt: *const I,
    kstep: *const I,
    kinc: *mut I,
    cmname_len: c_int,
);

/// Defines the entry point of Cast3M behaviours
pub type CastemFn = UmatFn<HostLong>;

/// Defines the entry point of Abaqus/Standard behaviours
pub type AbaqusFn = UmatFn<c_int>;

/// Defines the entry point of Code_Aster behaviours
///
/// ```text
/// STRESS, STATEV, DDSDDE, STRAN, DSTRAN, DTIME, TEMP, DTEMP, PREDEF, DPRED,
/// NTENS, NSTATV, PROPS, NPROPS, DROT, PNEWDT, NUMMOD
/// ```
pub type AsterFn = unsafe extern "C" fn(
    stress: *mut f64,
    statev: *mut f64,
    ddsdde: *mut f64,
    stran: *const f64,
    dstran: *const f64,
    dtime: *const f64,
    temp: *const f64,
    dtemp: *const f64,
    predef: *const f64,
    dpred: *const f64,
    ntens: *const HostLong,
    nstatv: *const HostLong,
    props: *const f64,
    nprops: *const HostLong,
    drot: *const f64,
    pnewdt: *mut f64,
    nummod: *const HostLong,
);

/// Defines the entry point of Cyrano behaviours
///
/// ```text
/// NTENS, DTIME, DROT, DDSDDE, STRAN, DSTRAN, TEMP, DTEMP, PROPS, NPROPS,
/// PREDEF, DPRED, STATEV, NSTATV, STRESS, NDI, KINC, (status record)
/// ```
///
/// The trailing status record is ignored by libraries that do not fill it.
pub type CyranoFn = unsafe extern "C" fn(
    ntens: *const HostLong,
    dtime: *const f64,
    drot: *const f64,
    ddsdde: *mut f64,
    stran: *const f64,
    dstran: *const f64,
    temp: *const f64,
    dtemp: *const f64,
    props: *const f64,
    nprops: *const HostLong,
    predef: *const f64,
    dpred: *const f64,
    statev: *mut f64,
    nstatv: *const HostLong,
    stress: *mut f64,
    ndi: *const HostLong,
    kinc: *mut HostLong,
    output_status: *mut OutputStatus,
);

/// Defines the entry point of Europlexus behaviours (finite strain)
///
/// ```text
/// STATUS, STRESS, STATEV, DDSDDE, PNEWDT, BROKEN, MSG, NSTATV, HYPOTHESIS, DTIME,
/// F0, F1, DROT, PROPS, NPROPS, TEMP, DTEMP, PREDEF, DPRED, NPREDEF
/// ```
pub type EuroplexusFn = unsafe extern "C" fn(
    status: *mut c_int,
    stress: *mut f64,
    statev: *mut f64,
    ddsdde: *mut f64,
    pnewdt: *mut f64,
    broken: *mut c_int,
    msg: *mut c_char,
    nstatv: *const c_int,
    hypothesis: *const c_int,
    dtime: *const f64,
    f0: *const f64,
    f1: *const f64,
    drot: *const f64,
    props: *const f64,
    nprops: *const c_int,
    temp: *const f64,
    dtemp: *const f64,
    predef: *const f64,
    dpred: *const f64,
    npredef: *const c_int,
);

/// Defines the entry point of CalculiX behaviours
///
/// ```text
/// AMAT, IEL, IINT, NPROPS, PROPS, ETOT, ELAS, BETA, F0, VOJ, F1, VJ, ITHERMAL,
/// T1, DTIME, TIME, TTIME, ICMD, IELAS, MI, NSTATV, STATEV0, STATEV1, STRESS,
/// DDSDDE, IORIEN, PGAUSS, ORAB, PNEWDT, IPKON, (hidden length of AMAT)
/// ```
pub type CalculiXFn = unsafe extern "C" fn(
    amat: *const c_char,
    iel: *const c_int,
    iint: *const c_int,
    nprops: *const c_int,
    props: *const f64,
    etot: *const f64,
    elas: *const f64,
    beta: *const f64,
    f0: *const f64,
    voj: *const f64,
    f1: *const f64,
    vj: *const f64,
    ithermal: *const c_int,
    t1: *const f64,
    dtime: *const f64,
    time: *const f64,
    ttime: *const f64,
    icmd: *const c_int,
    ielas: *const c_int,
    mi: *const c_int,
    nstatv: *const c_int,
    statev0: *const f64,
    statev1: *mut f64,
    stress: *mut f64,
    ddsdde: *mut f64,
    iorien: *const c_int,
    pgauss: *const f64,
    orab: *const f64,
    pnewdt: *mut f64,
    ipkon: *const c_int,
    amat_len: c_int,
);

/// Defines the optional function setting the out-of-bounds policy of a behaviour
///
/// ```text
/// 0 none, 1 warning, 2 strict
/// ```
pub type OutOfBoundsPolicyFn = unsafe extern "C" fn(policy: c_int);

/// Holds the entry point of a behaviour compiled for a host family
#[derive(Clone, Copy)]
pub enum EntryPoint {
    Castem(CastemFn),
    Aster(AsterFn),
    Abaqus(AbaqusFn),
    Cyrano(CyranoFn),
    Europlexus(EuroplexusFn),
    CalculiX(CalculiXFn),
}

impl EntryPoint {
    /// Returns the host family of the entry point
    pub fn family(&self) -> HostFamily {
        match self {
            EntryPoint::Castem(..) => HostFamily::Castem,
            EntryPoint::Aster(..) => HostFamily::Aster,
            EntryPoint::Abaqus(..) => HostFamily::Abaqus,
            EntryPoint::Cyrano(..) => HostFamily::Cyrano,
            EntryPoint::Europlexus(..) => HostFamily::Europlexus,
            EntryPoint::CalculiX(..) => HostFamily::CalculiX,
        }
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryPoint({:?})", self.family())
    }
}
