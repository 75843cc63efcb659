//! Reactive Example - update policies, canvases and timers
//!
//! Shows how scope writes propagate: outputs re-render per write, on-update
//! canvases redraw on any write, and interval canvases follow the clock.
//!
//! Run with: RUST_LOG=trace cargo run --example reactive

use std::time::Duration;

use spark_signals::effect;
use spark_stdio::{Canvas, EngineConfig, Interval, Output, Stdio, Value};

fn main() -> Result<(), spark_stdio::EngineError> {
    env_logger::init();

    println!("=== spark-stdio Reactive Example ===\n");

    let app = Stdio::with_config(EngineConfig::queued());
    app.add::<[spark_stdio::Element; 4]>([
        Output::link("count").into(),
        Output::link("count")
            .transform(|v| Value::Text("#".repeat(v.as_number().unwrap_or(0.0) as usize)))
            .into(),
        Canvas::new(12, 1, |ctx, scope, _| {
            ctx.clear();
            ctx.text(0, 0, &format!("writes: {}", scope.revision()));
        })
        .into(),
        Canvas::new(12, 1, |ctx, _, _| {
            let x = ctx.row(0).map_or(0, |row| row.chars().filter(|c| *c == '*').count() as u16);
            ctx.put(x, 0, '*');
        })
        .interval(Interval::millis(100))
        .into(),
    ])?;
    app.ready()?;

    // Watch frames the way the terminal host does
    let frame = app.engine().frame();
    let _stop = effect(move || {
        println!("  frame #{}", frame.get());
    });

    for n in 1..=3 {
        println!("scope.count = {n}");
        app.scope().set("count", n);
    }

    println!("\nadvance 350ms");
    let fired = app.engine().advance(Duration::from_millis(350));
    println!("  {fired} timer redraw(s)\n");

    for node in app.root().descendants() {
        if let Some(surface) = node.context_2d() {
            println!("canvas: {:?}", surface.rows());
        } else if node.has_class("output") {
            println!("output: {:?}", node.text());
        }
    }

    println!("\nremoving the interval canvas");
    app.remove(3)?;
    println!("  active timers: {}", app.engine().active_timer_count());

    Ok(())
}
