//! Human-friendly terminal output for cards, errors and progress.

use skycast_core::{Outcome, RenderModel};

/// One-line progress note, printed for the duration of a fetch.
pub fn loading(message: &str) {
    println!("{message}");
}

pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Rendered(model) => print_card(model),
        Outcome::Failed(message) => print_error(message),
        // Superseded lookups produce no output; the newer one already did.
        Outcome::Stale => {}
    }
}

pub fn print_card(model: &RenderModel) {
    let header = if model.description.is_empty() {
        model.city_label.clone()
    } else {
        format!("{} ({})", model.city_label, model.description)
    };

    println!();
    println!("  {header}");
    println!("  {}, {}", model.temperature, model.feels_like);
    println!(
        "  Humidity {} | Wind {} | Clouds {} | Pressure {}",
        model.humidity, model.wind, model.cloud_cover, model.pressure
    );
    if let Some(url) = &model.icon_url {
        println!("  Icon: {url}");
    }
    println!("  Observed {}", model.observed_at.format("%Y-%m-%d %H:%M UTC"));
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("error: {message}");
}
