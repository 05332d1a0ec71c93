use mbdriver::base::{BehaviourDescriptor, HostFamily, Hypothesis};
use mbdriver::convention::{decode_hypothesis_flag, HostConvention};
use mbdriver::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "behaviour_info",
    about = "Prints the sizes and the host material properties of a behaviour"
)]
struct Options {
    /// JSON file with the behaviour descriptor
    descriptor: String,

    /// Decodes a Cast3M hypothesis flag (NDI) before printing
    #[structopt(long)]
    castem_ndi: Option<i32>,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // load descriptor
    let desc = BehaviourDescriptor::read_json(&options.descriptor)?;
    let thin_line = format!("{:─^1$}", "", 80);
    println!("{}", thin_line);
    println!("{}", desc);
    println!("{}", thin_line);

    // hypothesis flag
    if let Some(ndi) = options.castem_ndi {
        let h = decode_hypothesis_flag(HostFamily::Castem, ndi)?;
        println!("NDI = {} → {}", ndi, h);
        println!("{}", thin_line);
    }

    // sizes per hypothesis and host family
    for h in Hypothesis::ALL.iter().filter(|h| desc.supports(**h)) {
        let (_, n_driving, n_force) = h.sizes(desc.kind);
        if desc.uses_generic_plane_stress(*h) {
            println!("{} (generic plane stress)", h);
        } else {
            println!("{}", h);
        }
        println!("  driving variable size = {}", n_driving);
        println!("  thermodynamic force size = {}", n_force);
        println!("  internal values = {}", desc.n_internal_values(*h));
        println!("  internal variables = {:?}", desc.internal_variable_names(*h));
        println!("  external variables = {}", desc.n_external_variables());
        for family in HostFamily::ALL {
            if HostConvention::new(family, desc.kind, desc.effective_hypothesis(*h)).is_err() {
                continue;
            }
            let names = desc.host_material_property_names(family, *h);
            println!("  {:?}: {:?}", family, names);
        }
    }
    println!("{}", thin_line);
    Ok(())
}
