use std::path::PathBuf;

pub(super) fn run_validate(config_path: PathBuf, out: Option<PathBuf>) -> Result<(), String> {
    let config = chronicle_application::config::load_config(&config_path)?;
    let collection = crate::infra::build_tick_directory(&config)?;
    let report = chronicle_application::validation::validate(&config, &collection)?;

    let pretty = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("failed to serialize report: {err}"))?;
    println!("{pretty}");

    if let Some(out_path) = out {
        std::fs::write(&out_path, report.to_string())
            .map_err(|err| format!("failed to write report {}: {}", out_path.display(), err))?;
    }

    Ok(())
}
