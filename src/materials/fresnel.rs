// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

/// Mirror `wi` about the local normal `(0, 0, 1)`.
pub fn reflect(wi: &Vector3f) -> Vector3f {
    Vector3f::new(-wi.x, -wi.y, wi.z)
}

/// Refract `wi` about the local normal given the signed transmitted cosine
/// and the ratio `eta_ti` returned by [`fresnel_dielectric`].
pub fn refract(wi: &Vector3f, cos_theta_t: Float, eta_ti: Float) -> Vector3f {
    Vector3f::new(-eta_ti * wi.x, -eta_ti * wi.y, cos_theta_t)
}

/// Unpolarized Fresnel reflectance of a dielectric interface with relative
/// index `eta = int_ior / ext_ior`, seen from a direction with local cosine
/// `cos_theta_i` (negative when arriving from inside).
///
/// Returns `(r, cos_theta_t, eta_it, eta_ti)`, where `cos_theta_t` already
/// carries the sign of the transmitted side and `eta_it`/`eta_ti` are the
/// relative indices for crossing the interface in this direction.
pub fn fresnel_dielectric(cos_theta_i: Float, eta: Float) -> (Float, Float, Float, Float) {
    let outside = cos_theta_i >= 0.0;
    let rcp_eta = 1.0 / eta;
    let (eta_it, eta_ti) = if outside { (eta, rcp_eta) } else { (rcp_eta, eta) };

    let cos_theta_t_sqr = 1.0 - eta_ti * eta_ti * (1.0 - cos_theta_i * cos_theta_i).max(0.0);
    let cos_i = cos_theta_i.abs();
    let cos_t = cos_theta_t_sqr.max(0.0).sqrt();

    let r = if eta == 1.0 {
        0.0
    } else if cos_i == 0.0 || cos_theta_t_sqr <= 0.0 {
        1.0
    } else {
        let a_s = (eta_it * cos_t - cos_i) / (eta_it * cos_t + cos_i);
        let a_p = (eta_it * cos_i - cos_t) / (eta_it * cos_i + cos_t);
        0.5 * (a_s * a_s + a_p * a_p)
    };

    let cos_theta_t = if outside { -cos_t } else { cos_t };
    (r, cos_theta_t, eta_it, eta_ti)
}
