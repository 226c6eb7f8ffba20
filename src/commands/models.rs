use crate::core::config::Settings;
use console::style;

/// List the models offered for selection.
pub fn run(settings: &Settings) -> Result<(), String> {
    println!("{} {}", style("Backend:").green().bold(), settings.backend);
    for model in &settings.models {
        if model == settings.default_model() {
            println!("  {} {}", style(model).yellow(), style("(default)").dim());
        } else {
            println!("  {}", model);
        }
    }
    Ok(())
}
