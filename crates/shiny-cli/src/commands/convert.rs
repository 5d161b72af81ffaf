use shiny_core::World;
use shiny_port::{AreaPort, EntryStatus, PortConfig, Selection};

/// Import the selected areas, then export every one that imported cleanly.
pub fn run(config: PortConfig, areas: Vec<String>) -> Result<(), String> {
    let mut world = World::in_memory();
    let mut port = AreaPort::new(&mut world, config);

    let imported = port.import_list(&Selection::from_args(areas));
    println!("{imported}");

    let done: Vec<String> = imported
        .entries()
        .iter()
        .filter(|e| e.status == EntryStatus::Done)
        .map(|e| e.name.clone())
        .collect();
    if done.is_empty() {
        super::check_report(&imported, "import")?;
        return Err("nothing to convert".into());
    }

    let exported = port.export_list(&Selection::Names(done));
    println!("{exported}");

    super::check_report(&imported, "import")?;
    super::check_report(&exported, "export")
}
