//! Named material presets: conductor complex IOR and dielectric IOR tables.

use glam::Vec3;

pub const VACUUM_IOR: f32 = 1.0;
pub const AIR_IOR: f32 = 1.000277;
pub const POLYPROPYLENE_IOR: f32 = 1.49;
pub const BK7_IOR: f32 = 1.5046;

/// Spectral approximation of a conductor's complex IOR as RGB triples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConductorPreset {
    pub eta: Vec3,
    pub k: Vec3,
}

const fn conductor(eta: [f32; 3], k: [f32; 3]) -> ConductorPreset {
    ConductorPreset {
        eta: Vec3::from_array(eta),
        k: Vec3::from_array(k),
    }
}

/// Look up a conductor by name or chemical symbol. `none` is a perfect mirror.
pub fn conductor_preset(name: &str) -> Option<ConductorPreset> {
    let preset = match name {
        "none" => conductor([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        "Ag" | "silver" => conductor([0.155, 0.117, 0.138], [4.827, 3.122, 2.147]),
        "Au" | "gold" => conductor([0.143, 0.374, 1.442], [3.983, 2.387, 1.603]),
        "Cu" | "copper" => conductor([0.200, 0.924, 1.102], [3.912, 2.452, 2.142]),
        "Al" | "aluminium" | "aluminum" => {
            conductor([1.657, 0.880, 0.521], [9.224, 6.269, 4.837])
        }
        "Cr" | "chromium" => conductor([3.180, 3.180, 2.010], [3.300, 3.330, 3.040]),
        "Ni" | "nickel" => conductor([1.970, 1.860, 1.670], [3.740, 3.060, 2.580]),
        "Ti" | "titanium" => conductor([2.160, 1.970, 1.810], [2.930, 2.620, 2.350]),
        "W" | "tungsten" => conductor([4.350, 3.400, 2.850], [3.400, 2.700, 2.150]),
        "Fe" | "iron" => conductor([2.950, 2.930, 2.650], [3.000, 2.950, 2.800]),
        _ => return None,
    };
    Some(preset)
}

/// Look up a dielectric's index of refraction by material name.
pub fn ior_preset(name: &str) -> Option<f32> {
    let ior = match name {
        "vacuum" => VACUUM_IOR,
        "helium" => 1.00004,
        "hydrogen" => 1.00013,
        "air" => AIR_IOR,
        "carbon dioxide" => 1.00045,
        "water" => 1.333,
        "acetone" => 1.36,
        "ethanol" => 1.361,
        "carbon tetrachloride" => 1.461,
        "glycerol" => 1.4729,
        "benzene" => 1.501,
        "silicone oil" => 1.52045,
        "bromine" => 1.661,
        "water ice" => 1.31,
        "fused quartz" => 1.458,
        "pyrex" => 1.470,
        "acrylic glass" => 1.49,
        "polypropylene" => POLYPROPYLENE_IOR,
        "bk7" => BK7_IOR,
        "sodium chloride" => 1.544,
        "amber" => 1.55,
        "pet" => 1.575,
        "diamond" => 2.419,
        _ => return None,
    };
    Some(ior)
}
