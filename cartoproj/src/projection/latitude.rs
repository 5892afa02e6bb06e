//! Latitudes auxiliaires de l'ellipsoïde (authalique, conforme) et arc de méridien

use std::f64::consts::FRAC_PI_2;

/// Facteur m = cos φ / √(1 - e² sin² φ)
pub(crate) fn m(e2: f64, phi: f64) -> f64 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    cos_phi / (1.0 - e2 * sin_phi * sin_phi).sqrt()
}

/// Intégrale authalique q(φ), avec la limite sphérique q = 2 sin φ
pub(crate) fn authalic_q(e: f64, sin_phi: f64) -> f64 {
    if e == 0.0 {
        return 2.0 * sin_phi;
    }
    let e2 = e * e;
    let es = e * sin_phi;
    (1.0 - e2) * (sin_phi / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

/// Fonction t(φ) de la projection conforme de Lambert
pub(crate) fn conformal_t(e: f64, phi: f64) -> f64 {
    let sin_phi = phi.sin();
    let es = e * sin_phi;
    (((1.0 - sin_phi) / (1.0 + sin_phi)) * ((1.0 + es) / (1.0 - es)).powf(e)).sqrt()
}

/// Retour de la latitude authalique β vers la latitude géodésique
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Authalic {
    e: f64,
    e2: f64,
    /// q(π/2)
    qp: f64,
    series: [f64; 3],
}

impl Authalic {
    pub(crate) fn new(e2: f64) -> Self {
        let e = e2.sqrt();
        let (e4, e6) = (e2 * e2, e2 * e2 * e2);
        Self {
            e,
            e2,
            qp: authalic_q(e, 1.0),
            series: [
                e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0,
                23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0,
                761.0 * e6 / 45360.0,
            ],
        }
    }

    pub(crate) fn qp(&self) -> f64 {
        self.qp
    }

    pub(crate) fn q(&self, phi: f64) -> f64 {
        authalic_q(self.e, phi.sin())
    }

    /// Latitude authalique β de φ
    pub(crate) fn beta(&self, phi: f64) -> f64 {
        (self.q(phi) / self.qp).clamp(-1.0, 1.0).asin()
    }

    /// Latitude géodésique depuis β : série, puis une itération de Newton sur q
    pub(crate) fn geodetic(&self, beta: f64) -> f64 {
        let [s0, s1, s2] = self.series;
        let mut phi = beta
            + s0 * (2.0 * beta).sin()
            + s1 * (4.0 * beta).sin()
            + s2 * (6.0 * beta).sin();
        if self.e == 0.0 {
            return phi;
        }
        let target = self.qp * beta.sin();
        for _ in 0..2 {
            let (sin_phi, cos_phi) = phi.sin_cos();
            if cos_phi.abs() < 1e-12 {
                break;
            }
            let w = 1.0 - self.e2 * sin_phi * sin_phi;
            phi += (target - authalic_q(self.e, sin_phi)) * w * w / (2.0 * (1.0 - self.e2) * cos_phi);
        }
        phi
    }

    /// Latitude géodésique depuis q ; NaN si |q| dépasse q(π/2)
    pub(crate) fn geodetic_from_q(&self, q: f64) -> f64 {
        let ratio = q / self.qp;
        if ratio.abs() > 1.0 + 1e-12 {
            return f64::NAN;
        }
        self.geodetic(ratio.clamp(-1.0, 1.0).asin())
    }
}

/// Retour de la latitude conforme χ vers la latitude géodésique (série à 4 termes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Conformal {
    series: [f64; 4],
}

impl Conformal {
    pub(crate) fn new(e2: f64) -> Self {
        let (e4, e6, e8) = (e2 * e2, e2 * e2 * e2, e2 * e2 * e2 * e2);
        Self {
            series: [
                e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0,
                7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0,
                7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0,
                4279.0 * e8 / 161280.0,
            ],
        }
    }

    pub(crate) fn geodetic(&self, chi: f64) -> f64 {
        chi + self
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| s * (2.0 * (i + 1) as f64 * chi).sin())
            .sum::<f64>()
    }

    /// Latitude géodésique depuis t = tan(π/4 - χ/2)
    pub(crate) fn geodetic_from_t(&self, t: f64) -> f64 {
        self.geodetic(FRAC_PI_2 - 2.0 * t.atan())
    }
}

/// Longueur d'arc de méridien M(φ) depuis l'équateur, et son inverse par la
/// latitude d'empreinte (séries à l'ordre e⁶ et e1⁴)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MeridianArc {
    a: f64,
    series: [f64; 4],
    footpoint: [f64; 4],
}

impl MeridianArc {
    pub(crate) fn new(a: f64, e2: f64) -> Self {
        let (e4, e6) = (e2 * e2, e2 * e2 * e2);
        let root = (1.0 - e2).sqrt();
        let e1 = (1.0 - root) / (1.0 + root);
        Self {
            a,
            series: [
                1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0,
                3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0,
                15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0,
                35.0 * e6 / 3072.0,
            ],
            footpoint: [
                3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0,
                21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0,
                151.0 * e1.powi(3) / 96.0,
                1097.0 * e1.powi(4) / 512.0,
            ],
        }
    }

    /// M(φ) / a
    pub(crate) fn ratio(&self, phi: f64) -> f64 {
        let [m0, m1, m2, m3] = self.series;
        m0 * phi - m1 * (2.0 * phi).sin() + m2 * (4.0 * phi).sin() - m3 * (6.0 * phi).sin()
    }

    /// Dérivée de M(φ) / a
    pub(crate) fn ratio_derivative(&self, phi: f64) -> f64 {
        let [m0, m1, m2, m3] = self.series;
        m0 - 2.0 * m1 * (2.0 * phi).cos() + 4.0 * m2 * (4.0 * phi).cos()
            - 6.0 * m3 * (6.0 * phi).cos()
    }

    /// M(φ) en mètres
    pub(crate) fn distance(&self, phi: f64) -> f64 {
        self.a * self.ratio(phi)
    }

    /// Latitude d'empreinte φ1 telle que M(φ1) = `distance`
    pub(crate) fn footpoint(&self, distance: f64) -> f64 {
        let mu = distance / (self.a * self.series[0]);
        let [f0, f1, f2, f3] = self.footpoint;
        mu + f0 * (2.0 * mu).sin()
            + f1 * (4.0 * mu).sin()
            + f2 * (6.0 * mu).sin()
            + f3 * (8.0 * mu).sin()
    }
}
