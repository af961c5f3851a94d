use crate::mjcf::Geom;
use crate::sdf::Material;

use super::Exporter;

/// Visual material of a geom.
///
/// The color comes from the geom `rgba`, else its material asset, else
/// MuJoCo's default gray. Scalar MJCF intensities scale the color.
pub(crate) fn geom_material(cx: &Exporter, geom: &Geom) -> Material {
    let asset = geom
        .material
        .as_deref()
        .and_then(|name| cx.mujoco.assets.material(name));
    if geom.material.is_some() && asset.is_none() {
        tracing::warn!(
            "Geom {:?} references unknown material {:?}",
            geom.name,
            geom.material
        );
    }

    let rgba = geom
        .rgba
        .or(asset.map(|m| m.rgba))
        .unwrap_or(Geom::DEFAULT_RGBA);
    let (specular, emission) = asset.map_or((0.5, 0.0), |m| (m.specular, m.emission));

    Material {
        ambient: rgba,
        diffuse: rgba,
        specular: [specular, specular, specular, 1.0],
        emissive: [rgba[0] * emission, rgba[1] * emission, rgba[2] * emission, rgba[3]],
    }
}
