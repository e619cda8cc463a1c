use gauge::{Color, Gauge, GaugeCommand, GaugeConfig};

use std::env;
use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Demo page roster: value, segments, stroke color.
const DEMO_GAUGES: [(f64, usize, Color); 4] = [
    (45.0, 5, Color::BLUE),
    (10.0, 3, Color::YELLOW),
    (100.0, 7, Color::ORANGE),
    (70.0, 7, Color::GREEN),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--window") {
        return run_window_demo();
    }

    let page = demo_page();
    match args.get(1) {
        Some(path) => {
            fs::write(path, page)?;
            println!("wrote {path}");
        }
        None => print!("{page}"),
    }
    Ok(())
}

/// A self-contained HTML page with the four demo gauges inlined as SVG.
fn demo_page() -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>gauge demo</title></head>\n\
         <body style=\"display:flex;flex-direction:column;align-items:center;\
         justify-content:space-between;min-height:100vh;padding:96px\">\n",
    );

    for (value, segments, color) in DEMO_GAUGES {
        let gauge = Gauge::new(
            GaugeConfig::builder()
                .value(value)
                .segments(segments)
                .color(color)
                .build(),
        );
        page.push_str(&gauge.to_svg());
    }

    page.push_str("</body>\n</html>\n");
    page
}

/// Interactive preview: one gauge in a window, fed random values over a
/// channel so the fill draw-in replays.
fn run_window_demo() -> Result<(), Box<dyn std::error::Error>> {
    use rand::Rng;

    let config = GaugeConfig::builder()
        .value(45.0)
        .segments(5)
        .color(Color::BLUE)
        .build();
    let mut gauge = Gauge::new(config);

    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let mut rng = rand::rng();
        loop {
            let value = rng.random_range(0.0..100.0);
            if sender.send(GaugeCommand::SetValue(value)).is_err() {
                break;
            }
            thread::sleep(Duration::from_secs(4));
        }
    });

    println!("Displaying gauge with a randomly moving value:");
    println!("- the fill redraws over 3 seconds after each update");
    println!("- hover a segment to highlight it");
    println!("Press Ctrl+C to exit");

    gauge.show_with_commands(receiver)
}
