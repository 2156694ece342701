//! Subcommand implementations.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use boltyard::{
    catalog, Family, Fastener, Fit, Nut, NutKind, Screw, ScrewKind, Settings, TapMaterial, Washer,
    WasherKind,
};
use clap::Args;
use tracing::{info, warn};

use crate::FamilyArg;

/// Arguments selecting one catalog fastener.
#[derive(Args, Debug)]
pub struct FastenerArgs {
    /// Family
    #[arg(value_enum)]
    pub family: FamilyArg,
    /// Class, e.g. SocketHeadCap or HexNut
    pub kind: String,
    /// Type (standard), e.g. iso4762
    pub fastener_type: String,
    /// Size, e.g. M5-0.8
    pub size: String,
    /// Screw length in mm (default: low end of the nominal range)
    #[arg(short, long)]
    pub length: Option<f64>,
    /// Model threads even if the settings ask for simple shapes
    #[arg(long)]
    pub threaded: bool,
}

enum Built {
    Screw(Screw),
    Nut(Nut),
    Washer(Washer),
}

impl Built {
    fn fastener(&self) -> &dyn Fastener {
        match self {
            Built::Screw(s) => s,
            Built::Nut(n) => n,
            Built::Washer(w) => w,
        }
    }
}

fn build(args: &FastenerArgs, settings: &Settings) -> Result<Built> {
    let simple = settings.simple && !args.threaded;
    let built = match args.family {
        FamilyArg::Screw => {
            let kind: ScrewKind = args.kind.parse().map_err(|e: String| anyhow!(e))?;
            let length = match args.length {
                Some(length) => length,
                None => shortest_length(kind, &args.fastener_type)?,
            };
            Built::Screw(Screw::new(
                kind,
                &args.size,
                length,
                &args.fastener_type,
                simple,
            )?)
        }
        FamilyArg::Nut => {
            let kind: NutKind = args.kind.parse().map_err(|e: String| anyhow!(e))?;
            Built::Nut(Nut::new(kind, &args.size, &args.fastener_type, simple)?)
        }
        FamilyArg::Washer => {
            let kind: WasherKind = args.kind.parse().map_err(|e: String| anyhow!(e))?;
            Built::Washer(Washer::new(kind, &args.size, &args.fastener_type)?)
        }
    };
    Ok(built)
}

/// Lower end of the type's nominal length range.
fn shortest_length(kind: ScrewKind, fastener_type: &str) -> Result<f64> {
    let (min, _) = kind.nominal_length_range(fastener_type)?;
    Ok(min)
}

pub fn list(family: Option<FamilyArg>, size: Option<&str>) -> Result<()> {
    let cat = catalog()?;
    let families: Vec<Family> = match family {
        Some(f) => vec![f.into()],
        None => Family::ALL.to_vec(),
    };
    for family in families {
        println!("{family}s:");
        match size {
            Some(size) => {
                for (class, types) in cat.select_by_size(family, size) {
                    println!("  {class}: {}", types.join(", "));
                }
            }
            None => {
                for class in cat.classes(family) {
                    let types = cat.types(family, class);
                    println!("  {class}: {}", types.join(", "));
                }
            }
        }
    }
    Ok(())
}

pub fn info(args: &FastenerArgs, settings: &Settings) -> Result<()> {
    let built = build(args, settings)?;
    let fastener = built.fastener();

    println!("{}", fastener.info());
    println!("  Standard: {}", fastener.standard());
    println!("  Thread diameter: {:.3} mm", fastener.thread_diameter());
    println!("  Dimensions:");
    for (name, value) in fastener.dimensions().iter() {
        println!("    {name}: {value:.3} mm");
    }

    match &built {
        Built::Screw(screw) => {
            println!("  Head height: {:.3} mm", screw.head_height());
            println!("  Length offset: {:.3} mm", screw.length_offset());
            println!(
                "  Min hole depth: {:.3} mm (counter sunk {:.3} mm)",
                screw.min_hole_depth(false),
                screw.min_hole_depth(true)
            );
            let lengths: Vec<String> = screw
                .nominal_lengths()?
                .iter()
                .map(|l| format!("{l:.4}"))
                .collect();
            println!("  Nominal lengths: {}", lengths.join(", "));
        }
        Built::Nut(nut) => {
            println!("  Nut diameter: {:.3} mm", nut.nut_diameter());
            println!("  Nut thickness: {:.3} mm", nut.nut_thickness());
            if let Some(fill) = nut.fill_factor() {
                println!("  Fill factor: {fill:.3}");
            }
        }
        Built::Washer(washer) => {
            println!("  Washer diameter: {:.3} mm", washer.washer_diameter());
            println!("  Washer thickness: {:.3} mm", washer.washer_thickness());
        }
    }

    let tap = fastener.tap_hole_diameters();
    let tap_names = fastener.tap_drill_sizes();
    if !tap.is_empty() {
        println!("  Tap drills:");
        for material in TapMaterial::ALL {
            if let (Some(d), Some(name)) = (tap.get(&material), tap_names.get(&material)) {
                let marker = if material == settings.tap_material { " *" } else { "" };
                println!("    {material}: {name} ({d:.3} mm){marker}");
            }
        }
    }
    let clearance = fastener.clearance_hole_diameters();
    let clearance_names = fastener.clearance_drill_sizes();
    if !clearance.is_empty() {
        println!("  Clearance drills:");
        for fit in Fit::ALL {
            if let (Some(d), Some(name)) = (clearance.get(&fit), clearance_names.get(&fit)) {
                let marker = if fit == settings.fit { " *" } else { "" };
                println!("    {fit}: {name} ({d:.3} mm){marker}");
            }
        }
    }

    println!("  Joints:");
    for (name, joint) in fastener.joints() {
        let p = joint.location().position();
        println!(
            "    {name}: {:?} at ({:.3}, {:.3}, {:.3})",
            joint.kind(),
            p.x,
            p.y,
            p.z
        );
    }

    let volume = match settings.resolution {
        Some(resolution) => fastener.shape().volume_with_resolution(resolution)?,
        None => fastener.shape().volume(),
    };
    println!("  Volume: {volume:.3} mm³");
    Ok(())
}

pub fn export(args: &FastenerArgs, settings: &Settings, output: &Path) -> Result<()> {
    let built = build(args, settings)?;
    let fastener = built.fastener();
    let doc: boltyard_ir::Document = fastener.shape().to_document();
    let json = doc.to_json()?;
    fs::write(output, json).with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Exported {} ({} nodes) to {}",
        fastener.info(),
        doc.nodes.len(),
        output.display()
    );
    Ok(())
}

/// Problems found in one catalog row.
fn check_row(fastener: &dyn Fastener, family: Family) -> Vec<String> {
    let mut problems = Vec::new();
    let d = fastener.thread_diameter();

    let clearance = fastener.clearance_hole_diameters();
    if clearance.is_empty() {
        problems.push("no clearance drills".to_string());
    }
    for (fit, diameter) in &clearance {
        if *diameter <= d {
            problems.push(format!("{fit} clearance {diameter} mm not above thread {d} mm"));
        }
    }

    if family != Family::Washer {
        let tap = fastener.tap_hole_diameters();
        if tap.is_empty() {
            problems.push("no tap drills".to_string());
        }
        for (material, diameter) in &tap {
            if *diameter >= d {
                problems.push(format!("{material} tap {diameter} mm not below thread {d} mm"));
            }
        }
    }
    problems
}

pub fn check(settings: &Settings) -> Result<()> {
    let cat = catalog()?;
    let mut rows = 0usize;
    let mut failures = 0usize;

    for family in Family::ALL {
        for class in cat.classes(family) {
            for fastener_type in cat.types(family, class) {
                for size in cat.sizes(family, class, fastener_type)? {
                    rows += 1;
                    let args = FastenerArgs {
                        family: match family {
                            Family::Screw => FamilyArg::Screw,
                            Family::Nut => FamilyArg::Nut,
                            Family::Washer => FamilyArg::Washer,
                        },
                        kind: class.to_string(),
                        fastener_type: fastener_type.to_string(),
                        size: size.clone(),
                        length: None,
                        threaded: false,
                    };
                    let mut problems = match build(&args, settings) {
                        Ok(built) => {
                            let mut problems = check_row(built.fastener(), family);
                            match &built {
                                Built::Nut(nut) if nut.nut_diameter() <= nut.thread_diameter() => {
                                    problems.push("nut diameter not above thread".to_string())
                                }
                                Built::Washer(w) if w.washer_diameter() <= w.thread_diameter() => {
                                    problems.push("washer diameter not above thread".to_string())
                                }
                                _ => {}
                            }
                            problems
                        }
                        Err(e) => vec![e.to_string()],
                    };
                    for problem in problems.drain(..) {
                        failures += 1;
                        warn!(%family, class, fastener_type, size = %size, "{problem}");
                    }
                }
            }
        }
    }

    info!(rows, failures, "catalog check finished");
    println!("Checked {rows} rows: {failures} problem(s)");
    if failures > 0 {
        bail!("catalog check found {failures} problem(s)");
    }
    Ok(())
}
