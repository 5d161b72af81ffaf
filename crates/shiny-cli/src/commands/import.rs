use shiny_core::World;
use shiny_port::{AreaPort, PortConfig, Selection};

pub fn run(config: PortConfig, areas: Vec<String>) -> Result<(), String> {
    let mut world = World::in_memory();
    let mut port = AreaPort::new(&mut world, config);

    let report = port.import_list(&Selection::from_args(areas));
    println!("{report}");
    super::check_report(&report, "import")?;

    println!();
    println!("  {} area(s) loaded", world.registry().len());
    Ok(())
}
