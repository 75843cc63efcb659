//! Terminal Example - a live form in the terminal
//!
//! Tab/Shift+Tab move focus, type into fields, Space toggles, Enter clicks,
//! Esc quits.
//!
//! Run with: cargo run --example terminal

use std::error::Error;

use spark_stdio::host::{mount, run};
use spark_stdio::{Button, Canvas, Choice, Element, Interval, Output, Stdio, TextInput, Value};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let app = Stdio::new();
    app.title("spark-stdio")?;
    app.add([
        Element::from(TextInput::new("name").label("Name").placeholder("type here")),
        Element::radio(
            Choice::new("mood")
                .label("Mood")
                .option("Calm", "calm")
                .option("Loud", "loud"),
        ),
        Output::links(["name", "mood"])
            .transform(|v| Value::Text(format!("> {}", v.to_display())))
            .into(),
        Button::new("Reset", |scope| scope.set("name", "")).into(),
        Canvas::new(20, 1, |ctx, _, _| {
            let filled = ctx.row(0).map_or(0, |row| row.chars().filter(|c| *c == '=').count() as u16);
            if filled >= ctx.width() {
                ctx.clear();
            } else {
                ctx.put(filled, 0, '=');
            }
        })
        .interval(Interval::millis(200))
        .into(),
    ])?;
    app.ready()?;

    let handle = mount(&app)?;
    run(&handle)?;
    handle.unmount();
    Ok(())
}
