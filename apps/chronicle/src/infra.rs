use chronicle_application::config::Config;
use chronicle_infrastructure::tick_files::TickDirectory;
use std::path::Path;

pub fn build_tick_directory(config: &Config) -> Result<TickDirectory, String> {
    let root = Path::new(&config.sources.tick_dir);
    if !root.is_dir() {
        return Err(format!(
            "sources.tick_dir is not a directory: {}",
            root.display()
        ));
    }
    Ok(TickDirectory::new(root))
}
