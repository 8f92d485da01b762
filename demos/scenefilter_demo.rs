//! Scene filter demonstration.
//!
//! This demo shows:
//! - Building a region tree with a scene per region
//! - The lazily created default filter
//! - Combining filters with AND/OR operators and inversion
//! - Switching operands off without removing them
//! - Batching filter edits and reacting to filter change messages
//!
//! Run with: `RUST_LOG=info cargo run --example scenefilter_demo`

use zinc::*;

fn print_scene(label: &str, scene: &Scene) {
    let shown: Vec<&str> = scene
        .visible_graphics()
        .into_iter()
        .map(|graphics| graphics.name())
        .collect();
    println!("{label} ({}): {shown:?}", scene.region().path());
}

fn main() -> Result<()> {
    init_logging();

    let context = Context::new();
    let module = &context.scenefilter_module;
    let heart = context.root_region.create_child("heart")?;
    let lungs = context.root_region.create_child("lungs")?;

    let mut heart_scene = context.create_scene(&heart)?;
    heart_scene.create_graphics("surfaces", GraphicsType::Surfaces, DomainType::Mesh2d)?;
    heart_scene.create_graphics("fibres", GraphicsType::Streamlines, DomainType::Mesh3d)?;
    heart_scene.create_graphics("node points", GraphicsType::Points, DomainType::Nodes)?;
    heart_scene.create_graphics("lines", GraphicsType::Lines, DomainType::Mesh1d)?;

    let mut lung_scene = context.create_scene(&lungs)?;
    lung_scene.create_graphics("surfaces", GraphicsType::Surfaces, DomainType::Mesh2d)?;
    lung_scene.create_graphics("airways", GraphicsType::Lines, DomainType::Mesh1d)?;
    if let Some(airways) = lung_scene.find_graphics_mut("airways") {
        airways.set_visibility_flag(false);
    }

    println!("-- default filter '{}'", module.default_filter()?.name());
    print_scene("heart", &heart_scene);
    print_scene("lungs", &lung_scene);

    // hide points and fibres everywhere, but only inside the heart
    let points = module.create_filter_graphics_type(GraphicsType::Points)?;
    let fibres = module.create_filter_graphics_name("fibres")?;
    let detail = module.create_filter_operator_or()?;
    detail.append_operand(&points)?;
    detail.append_operand(&fibres)?;
    detail.set_inverse(true);

    let in_heart = module.create_filter_region(&heart)?;
    let clean = module.create_filter_operator_and()?;
    clean.set_name("clean")?;
    clean.set_managed(true);
    clean.append_operand(&module.default_filter()?)?;
    clean.append_operand(&detail)?;

    let heart_only = module.create_filter_operator_and()?;
    heart_only.append_operand(&clean)?;
    heart_only.append_operand(&in_heart)?;

    // an operator can never become its own operand
    if let Err(err) = detail.append_operand(&heart_only) {
        println!("-- rejected: {err}");
    }

    heart_scene.set_filter(&clean);
    lung_scene.set_filter(&heart_only);
    heart_scene.take_filter_changed();
    lung_scene.take_filter_changed();
    println!("-- clean heart, lungs restricted to the heart region");
    print_scene("heart", &heart_scene);
    print_scene("lungs", &lung_scene);

    module.begin_change();
    detail.set_operand_active(&fibres, false)?;
    heart_only.set_operand_active(&in_heart, false)?;
    module.end_change()?;
    println!(
        "-- fibres back, region test off; changed: heart {}, lungs {}",
        heart_scene.take_filter_changed(),
        lung_scene.take_filter_changed()
    );
    print_scene("heart", &heart_scene);
    print_scene("lungs", &lung_scene);

    println!("-- filters");
    for line in module.list_filters() {
        println!("   {line}");
    }

    Ok(())
}
