use crate::mjcf;
use crate::sdf::Material;

use super::{Converter, ns};

fn mean_rgb(color: &[f64; 4]) -> f64 {
    (color[0] + color[1] + color[2]) / 3.0
}

/// Add a material asset for a visual and return its name.
///
/// MuJoCo materials carry scalar emission and specular intensities, so the
/// SDFormat colors are reduced to their mean RGB value.
pub(crate) fn add_material(cx: &mut Converter, visual_name: &str, material: &Material) -> String {
    let name = cx.names.claim(ns::MATERIAL, &format!("material_{}", visual_name));
    let mut converted = mjcf::Material::new(name.clone());
    converted.rgba = material.diffuse;
    converted.emission = mean_rgb(&material.emissive);
    converted.specular = mean_rgb(&material.specular);
    cx.assets.materials.push(converted);
    name
}
