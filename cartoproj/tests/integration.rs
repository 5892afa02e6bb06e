//! Tests d'intégration sur des fichiers `.prj` réels

use std::path::{Path, PathBuf};

use cartoproj::{
    format_projection, parse_projection, read_prj, AngularUnit, Direction, Family, LinearUnit,
    PrjError, Projection, ProjectionError,
};
use geo::{Coord, Geometry, LineString, MultiLineString, Polygon};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn deg(lon: f64, lat: f64) -> Coord {
    Coord {
        x: lon.to_radians(),
        y: lat.to_radians(),
    }
}

fn assert_same_projection(a: &Projection, b: &Projection) {
    assert_eq!(a.name(), b.name());
    for sample in [deg(2.0, 46.0), deg(-100.0, 40.0), deg(10.0, 80.0), deg(0.5, 0.5)] {
        match (a.forward(sample), b.forward(sample)) {
            (Some(p), Some(q)) => {
                assert!(
                    (p.x - q.x).abs() < 1e-6 && (p.y - q.y).abs() < 1e-6,
                    "{}: {:?} != {:?}",
                    a.name(),
                    p,
                    q
                );
            }
            (None, None) => {}
            other => panic!("{}: domain mismatch {:?}", a.name(), other),
        }
    }
}

#[test]
fn test_all_fixtures_round_trip() {
    let pattern = format!("{}/tests/fixtures/*.prj", env!("CARGO_MANIFEST_DIR"));
    let mut count = 0;
    for entry in glob::glob(&pattern).unwrap() {
        let path = entry.unwrap();
        let projection = read_prj(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        let text = format_projection(&projection).unwrap();
        let back = parse_projection(&text).unwrap_or_else(|e| panic!("{}: {}", text, e));
        assert_same_projection(&projection, &back);
        count += 1;
    }
    assert!(count >= 10, "only {} fixtures found", count);
}

#[test]
fn test_lambert_93_reference_points() {
    let projection = read_prj(&fixture("lambert93.prj")).unwrap();
    assert_eq!(projection.family(), Family::Conic);
    // Origine de la projection -> origine fictive
    let origin = projection.forward(deg(3.0, 46.5)).unwrap();
    assert!((origin.x - 700000.0).abs() < 1e-6, "{:?}", origin);
    assert!((origin.y - 6600000.0).abs() < 1e-6, "{:?}", origin);
    // Aller-retour à Brest
    let brest = deg(-4.486, 48.390);
    let projected = projection.forward(brest).unwrap();
    let back = projection.inverse(projected).unwrap();
    assert!((back.x - brest.x).abs() < 1e-10 && (back.y - brest.y).abs() < 1e-10);
}

#[test]
fn test_albers_origin_and_parallels() {
    let projection = read_prj(&fixture("usa_contiguous_albers.prj")).unwrap();
    assert_eq!(projection.name(), "Albers_Conic_Equal_Area");
    let origin = projection.forward(deg(-96.0, 37.5)).unwrap();
    assert!(origin.x.abs() < 1e-6 && origin.y.abs() < 1e-6, "{:?}", origin);
    let params = projection.parameters();
    assert!((params.parameter("standard_parallel_1").unwrap() - 29.5).abs() < 1e-9);
    assert!((params.parameter("standard_parallel_2").unwrap() - 45.5).abs() < 1e-9);
}

#[test]
fn test_polar_stereographic_pole_and_ring() {
    let projection = read_prj(&fixture("north_pole_stereographic.prj")).unwrap();
    let pole = projection.forward(deg(45.0, 90.0)).unwrap();
    assert!(pole.x.abs() < 1e-6 && pole.y.abs() < 1e-6);
    // Le cercle de latitude 60° devient un cercle centré sur le pôle
    let ring: Vec<Coord> = (0..=36).map(|i| deg(-180.0 + 10.0 * i as f64, 60.0)).collect();
    let polygon = Geometry::Polygon(Polygon::new(LineString::new(ring), vec![]));
    let projected = projection.transform(&polygon, Direction::Forward);
    let radii: Vec<f64> = match &projected {
        Geometry::Polygon(p) => p.exterior().coords().map(|c| c.x.hypot(c.y)).collect(),
        other => panic!("expected a polygon, got {:?}", other),
    };
    let first = radii[0];
    assert!(radii.iter().all(|r| (r - first).abs() < 1e-3 * first));
}

#[test]
fn test_feet_and_metres_agree() {
    let feet = read_prj(&fixture("north_pole_laea_ft.prj")).unwrap();
    assert_eq!(feet.linear_unit(), Some(&LinearUnit::US_SURVEY_FOOT));
    let metres = feet.with_units(LinearUnit::METRE).unwrap();
    let p = deg(30.0, 70.0);
    let (f, m) = (feet.forward(p).unwrap(), metres.forward(p).unwrap());
    assert!((LinearUnit::US_SURVEY_FOOT.to_metres(f.x) - m.x).abs() < 1e-6);
    assert!((LinearUnit::US_SURVEY_FOOT.to_metres(f.y) - m.y).abs() < 1e-6);
    // Hémisphère sud hors du domaine
    assert!(feet.forward(deg(0.0, -60.0)).is_none());
}

#[test]
fn test_latin1_grads_prime_meridian() {
    let projection = read_prj(&fixture("ntf_paris_latin1.prj")).unwrap();
    assert!(matches!(projection, Projection::Geographic(_)));
    assert_eq!(projection.angular_unit(), Some(&AngularUnit::GRAD));
    assert_eq!(projection.ellipsoid().name(), "Clarke_1880_IGN");
    // Le méridien de Paris devient le méridien zéro, en grades
    let paris = projection.forward(deg(2.33722917, 54.0)).unwrap();
    assert!(paris.x.abs() < 1e-5, "{:?}", paris);
    assert!((paris.y - 60.0).abs() < 1e-9, "{:?}", paris);
}

#[test]
fn test_mercator_splits_antimeridian_line() {
    let projection = read_prj(&fixture("world_mercator.prj")).unwrap();
    let line = Geometry::LineString(LineString::new(vec![deg(170.0, 10.0), deg(-170.0, 20.0)]));
    match projection.transform(&line, Direction::Forward) {
        Geometry::MultiLineString(MultiLineString(parts)) => {
            assert_eq!(parts.len(), 2);
            let half_world = std::f64::consts::PI * 6378137.0;
            let end = parts[0].0.last().unwrap();
            let start = parts[1].0.first().unwrap();
            // Sommets de coupure à quelques millimètres du bord
            assert!((end.x - half_world).abs() < 0.1, "{:?}", end);
            assert!((start.x + half_world).abs() < 0.1, "{:?}", start);
            assert!((end.y - start.y).abs() < 1e-3);
        }
        other => panic!("expected a split line, got {:?}", other),
    }
}

#[test]
fn test_utm_31n_clips_to_domain() {
    let projection = read_prj(&fixture("utm31n.prj")).unwrap();
    assert_eq!(projection.wrap_meridian(), None);
    let paris = deg(2.345, 48.846);
    let projected = projection.forward(paris).unwrap();
    let back = projection.inverse(projected).unwrap();
    assert!((back.x - paris.x).abs() < 1e-9 && (back.y - paris.y).abs() < 1e-9);
    assert!(projection.forward(deg(120.0, 0.0)).is_none());

    let line = Geometry::LineString(LineString::new(vec![deg(2.0, 45.0), deg(120.0, 45.0)]));
    let coords: Vec<Coord> = match projection.transform(&line, Direction::Forward) {
        Geometry::LineString(l) => l.0,
        Geometry::MultiLineString(MultiLineString(parts)) if parts.len() == 1 => parts[0].0.clone(),
        other => panic!("expected a single clipped line, got {:?}", other),
    };
    assert_eq!(coords.len(), 2);
    let start = projection.forward(deg(2.0, 45.0)).unwrap();
    assert!((coords[0].x - start.x).abs() < 1e-6 && (coords[0].y - start.y).abs() < 1e-6);
    assert!(coords[1].x.is_finite() && coords[1].x > coords[0].x);
}

#[test]
fn test_robinson_splits_antimeridian_line() {
    let projection = read_prj(&fixture("world_robinson.prj")).unwrap();
    assert_eq!(projection.center().y, 0.0);
    let line = Geometry::LineString(LineString::new(vec![deg(170.0, 10.0), deg(-170.0, 20.0)]));
    match projection.transform(&line, Direction::Forward) {
        Geometry::MultiLineString(MultiLineString(parts)) => {
            assert_eq!(parts.len(), 2);
            let end = parts[0].0.last().unwrap();
            let start = parts[1].0.first().unwrap();
            assert!(end.x > 0.0 && start.x < 0.0);
            assert!((end.x + start.x).abs() < 0.1, "{:?} {:?}", end, start);
            assert!((end.y - start.y).abs() < 1e-3);
        }
        other => panic!("expected a split line, got {:?}", other),
    }
}

#[test]
fn test_missing_file_and_bad_content() {
    assert!(matches!(
        read_prj(&fixture("does_not_exist.prj")),
        Err(PrjError::Io(_))
    ));
    let truncated = r#"PROJCS["x",GEOGCS["y",DATUM["z",SPHEROID["WGS_1984",6378137.0"#;
    assert!(matches!(
        parse_projection(truncated),
        Err(ProjectionError::Parse { .. })
    ));
    let no_scale = r#"PROJCS["x",GEOGCS["y",DATUM["z",SPHEROID["WGS_1984",6378137.0,298.257223563]]],PROJECTION["Mercator"],PARAMETER["Central_Meridian",0.0],PARAMETER["Standard_Parallel_1",0.0]]"#;
    assert_eq!(
        parse_projection(no_scale).unwrap_err(),
        ProjectionError::missing(["scale_factor"])
    );
}
