use shiny_port::{PortConfig, list_importable};

pub fn run(config: &PortConfig) -> Result<(), String> {
    println!("{}", list_importable(&config.import_dir));
    Ok(())
}
