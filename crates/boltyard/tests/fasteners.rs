//! Checks across every catalog class and type for a few common sizes.

use approx::assert_relative_eq;
use boltyard::{
    Axis, ClearanceHole, Compound, Fastener, FastenerError, Fit, HoleFeature, InsertHole,
    Location, Nut, NutKind, Part, Screw, ScrewKind, TapHole, TapMaterial, Washer, WasherKind,
};

const SCREW_SIZES: [&str; 2] = ["M5-0.8", "1/4-20"];
const WASHER_SIZES: [&str; 2] = ["M5", "1/4"];

fn screw_cases() -> Vec<(ScrewKind, String, &'static str)> {
    let mut cases = Vec::new();
    for size in SCREW_SIZES {
        for (kind, types) in Screw::select_by_size(size).unwrap() {
            for fastener_type in types {
                cases.push((kind, fastener_type, size));
            }
        }
    }
    cases
}

fn nut_cases(sizes: &[&'static str]) -> Vec<(NutKind, String, &'static str)> {
    let mut cases = Vec::new();
    for &size in sizes {
        for (kind, types) in Nut::select_by_size(size).unwrap() {
            for fastener_type in types {
                cases.push((kind, fastener_type, size));
            }
        }
    }
    cases
}

fn top_face(part: &Part) -> Location {
    part.faces().sort_by(Axis::Z).last().unwrap().location()
}

fn bottom_face(part: &Part) -> Location {
    part.faces().sort_by(Axis::Z).first().unwrap().location()
}

#[test]
fn test_every_size_is_covered() {
    assert!(screw_cases().len() > 25);
    assert_eq!(nut_cases(&["M5-0.8-Standard"]).len(), 1);
}

#[test]
fn test_screws() {
    for (kind, fastener_type, size) in screw_cases() {
        let label = format!("{kind}({fastener_type}) {size}");
        let (min_length, _) = kind.nominal_length_range(&fastener_type).unwrap();
        let mut screw = Screw::new(kind, size, min_length, &fastener_type, false).unwrap();

        assert!(!screw.tap_drill_sizes().is_empty(), "{label}");
        assert!(!screw.tap_hole_diameters().is_empty(), "{label}");
        assert!(!screw.clearance_drill_sizes().is_empty(), "{label}");
        assert!(!screw.clearance_hole_diameters().is_empty(), "{label}");
        assert!(screw.info().len() > 2, "{label}");
        assert!(screw.length_offset() >= 0.0, "{label}");
        for counter_sunk in [true, false] {
            let depth = screw.min_hole_depth(counter_sunk);
            if kind == ScrewKind::SetScrew {
                assert_eq!(depth, 0.0, "{label}");
            } else {
                assert!(depth > 0.0, "{label}");
            }
        }
        assert!(!screw.nominal_lengths().unwrap().is_empty(), "{label}");

        let block = Part::cuboid("block", 100.0, 100.0, min_length);
        let mut host = block.clone();
        let top = top_face(&host);
        ClearanceHole::new()
            .cut(&mut host, &mut screw, &(top * Location::translation(25.0, 0.0, 0.0)))
            .unwrap();
        TapHole::new()
            .cut(&mut host, &mut screw, &(top * Location::translation(-25.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(screw.hole_locations().len(), 2, "{label}");
        assert!(host.volume() < block.volume(), "{label}");
    }
}

#[test]
fn test_countersunk_screws_seat_clear_of_host() {
    for (kind, fastener_type, size) in screw_cases() {
        if !kind.is_countersunk() {
            continue;
        }
        let label = format!("{kind}({fastener_type}) {size}");
        let mut screw = Screw::new(kind, size, 16.0, &fastener_type, true).unwrap();
        let mut host = Part::cuboid("plate", 40.0, 40.0, 10.0);
        let top = top_face(&host);
        for fit in Fit::ALL {
            let seat = ClearanceHole::new()
                .fit(fit)
                .cut(&mut host, &mut screw, &top)
                .unwrap();
            assert_relative_eq!(seat.position().z, 10.0, epsilon = 1e-9);
            screw.set_location(seat);
            assert!(
                !screw.located_shape().intersects(&host),
                "{label} {fit}: head cuts into the host"
            );
        }
    }
}

fn assert_drills_bracket_thread(fastener: &dyn Fastener, tapped: bool) {
    let label = fastener.info();
    let d = fastener.thread_diameter();
    let clearance = fastener.clearance_hole_diameters();
    assert!(clearance[&Fit::Close] > d, "{label}: close clearance {}", clearance[&Fit::Close]);
    if tapped {
        let tap = fastener.tap_hole_diameters();
        for material in TapMaterial::ALL {
            assert!(tap[&material] < d, "{label}: {material} tap {}", tap[&material]);
        }
    }
}

#[test]
fn test_drill_diameters_bracket_thread_for_every_row() {
    for kind in ScrewKind::ALL {
        for fastener_type in kind.types().unwrap() {
            let (min_length, _) = kind.nominal_length_range(&fastener_type).unwrap();
            for size in kind.sizes(&fastener_type).unwrap() {
                let screw = Screw::new(kind, &size, min_length, &fastener_type, true).unwrap();
                assert_drills_bracket_thread(&screw, true);
            }
        }
    }
    for kind in NutKind::ALL {
        for fastener_type in kind.types().unwrap() {
            for size in kind.sizes(&fastener_type).unwrap() {
                let nut = Nut::new(kind, &size, &fastener_type, true).unwrap();
                assert_drills_bracket_thread(&nut, true);
            }
        }
    }
    for kind in WasherKind::ALL {
        for fastener_type in kind.types().unwrap() {
            for size in kind.sizes(&fastener_type).unwrap() {
                let washer = Washer::new(kind, &size, &fastener_type).unwrap();
                assert_drills_bracket_thread(&washer, false);
            }
        }
    }
}

#[test]
fn test_nuts() {
    for (kind, fastener_type, size) in nut_cases(&["M5-0.8", "M5-0.8-Standard", "1/4-20"]) {
        let label = format!("{kind}({fastener_type}) {size}");
        let mut nut = Nut::new(kind, size, &fastener_type, false).unwrap();

        assert!(!nut.tap_drill_sizes().is_empty(), "{label}");
        assert!(!nut.tap_hole_diameters().is_empty(), "{label}");
        assert!(!nut.clearance_drill_sizes().is_empty(), "{label}");
        assert!(!nut.clearance_hole_diameters().is_empty(), "{label}");
        assert!(nut.info().len() > 2, "{label}");
        assert!(nut.nut_diameter() > nut.thread_diameter(), "{label}");
        assert_eq!(nut.length_offset(), 0.0, "{label}");

        let captive = matches!(
            kind,
            NutKind::DomedCap | NutKind::Hex | NutKind::UnchamferedHex | NutKind::Square
        );
        let block = Part::cuboid("block", 100.0, 100.0, 20.0);
        let mut host = block.clone();
        let bottom = bottom_face(&host);
        if kind == NutKind::HeatSet {
            InsertHole::new().cut(&mut host, &mut nut, &bottom).unwrap();
            assert!(nut.fill_factor().unwrap() > 1.0, "{label}");
        } else {
            ClearanceHole::new()
                .captive_nut(captive)
                .cut(&mut host, &mut nut, &bottom)
                .unwrap();
        }
        assert!(host.volume() < block.volume(), "{label}");
    }
}

#[test]
fn test_rotated_captive_nuts() {
    for (kind, fastener_type, size) in nut_cases(&["M5-0.8", "1/4-20"]) {
        if matches!(kind, NutKind::HeatSet | NutKind::HexWithFlange) {
            continue;
        }
        let label = format!("{kind}({fastener_type}) {size}");
        let mut nut =
            Nut::with_rotation(kind, size, &fastener_type, true, [0.0, 0.0, 45.0]).unwrap();
        let block = Part::cuboid("block", 100.0, 100.0, 20.0);
        let mut host = block.clone();
        let top = top_face(&host);
        ClearanceHole::new()
            .captive_nut(true)
            .rotation([0.0, 0.0, 45.0])
            .cut(&mut host, &mut nut, &top)
            .unwrap();
        assert!(host.volume() < block.volume(), "{label}");

        let seated = nut.moved(&nut.hole_locations()[0]);
        let assembly = Compound::new("captive")
            .with_part("host", host)
            .with_part("nut", seated);
        assert!(!assembly.do_children_intersect().0, "{label}");
    }
}

#[test]
fn test_screws_and_nuts() {
    const SCREW_LENGTH: f64 = 20.0;
    for (i, (kind, fastener_type, size)) in screw_cases().into_iter().enumerate() {
        let nut_sizes: &[&'static str] = if size.starts_with('M') {
            &["M5-0.8", "M5-0.8-Standard"]
        } else {
            &["1/4-20", "1/4-20-Standard"]
        };
        let nuts = nut_cases(nut_sizes);
        let (nut_kind, nut_type, nut_size) = &nuts[i % nuts.len()];

        for nut_indent in [0.0, -5.0] {
            let label = format!("{kind}({fastener_type}) + {nut_kind}({nut_type}) at {nut_indent}");
            let screw = Screw::new(kind, size, SCREW_LENGTH, &fastener_type, true).unwrap();
            let mut nut = Nut::new(*nut_kind, nut_size, nut_type, true).unwrap();
            nut.set_label(&format!("{nut_kind}:{nut_size}:{nut_type}"));
            screw.connect_to("b", &mut nut, "b", nut_indent).unwrap();

            assert_relative_eq!(nut.orientation()[0], -180.0, epsilon = 1e-6);
            let assembly = Compound::new("pair")
                .with_fastener(&screw)
                .with_fastener(&nut);
            let screw_height = screw.bounding_box().size().z;
            let assembly_height = assembly.bounding_box().size().z;
            assert!((screw_height - assembly_height).abs() < 0.1, "{label}");
            if *nut_kind != NutKind::DomedCap {
                assert!(!assembly.do_children_intersect().0, "{label}");
            }
        }
    }
}

#[test]
fn test_washers() {
    for size in WASHER_SIZES {
        for (kind, types) in Washer::select_by_size(size).unwrap() {
            for fastener_type in types {
                let label = format!("{kind}({fastener_type}) {size}");
                let mut washer = Washer::new(kind, size, &fastener_type).unwrap();

                assert!(!washer.clearance_hole_diameters().is_empty(), "{label}");
                assert!(washer.info().len() > 2, "{label}");
                assert!(washer.washer_diameter() > washer.thread_diameter(), "{label}");
                assert!(washer.washer_thickness() > 0.0, "{label}");

                let block = Part::cuboid("block", 100.0, 100.0, 20.0);
                let mut host = block.clone();
                let bottom = bottom_face(&host);
                ClearanceHole::new()
                    .cut(&mut host, &mut washer, &bottom)
                    .unwrap();
                assert!(host.volume() < block.volume(), "{label}");
            }
        }
    }
}

#[test]
fn test_washer_kinds_are_all_listed() {
    let found = Washer::select_by_size("M5").unwrap();
    assert_eq!(found.len(), WasherKind::ALL.len());
}

#[test]
fn test_unknown_size_is_an_error() {
    assert!(matches!(
        Nut::new(NutKind::Hex, "M7-1", "iso4032", true),
        Err(FastenerError::UnknownSize { .. })
    ));
    assert!(matches!(
        Screw::new(ScrewKind::SocketHeadCap, "Q5", 10.0, "iso4762", true),
        Err(FastenerError::InvalidSize(_))
    ));
}
