//! Basic Example - descriptors, scope and outputs
//!
//! Builds a small form without a terminal, simulates user input on the live
//! nodes and prints what the outputs render.
//!
//! Run with: RUST_LOG=debug cargo run --example basic

use spark_stdio::{host::compose_frame, Choice, Element, Output, Stdio, TextInput, Value};

fn main() -> Result<(), spark_stdio::EngineError> {
    env_logger::init();

    println!("=== spark-stdio Basic Example ===\n");

    let app = Stdio::new();
    app.title("Greeter")?;
    app.add([
        Element::from(
            TextInput::new("name")
                .label("Your name")
                .transform(|v| Value::Text(v.to_display().to_uppercase())),
        ),
        Element::checkbox(
            Choice::new("langs")
                .label("Languages")
                .option("Rust", "rust")
                .option("Zig", "zig")
                .option("Go", "go"),
        ),
        Output::link("name")
            .transform(|v| Value::Text(format!("Hello, {}!", v.to_display())))
            .into(),
        Output::link("langs").into(),
    ])?;
    app.ready()?;

    // Simulate the user
    let root = app.root();
    if let Ok(Some(field)) = root.query_selector(".text-input") {
        field.input_text("ada");
    }
    if let Ok(boxes) = root.query_selector_all(".choice") {
        boxes[2].set_checked(true);
        boxes[0].set_checked(true);
    }

    println!("scope.name  = {:?}", app.scope().value("name"));
    println!("scope.langs = {:?}\n", app.scope().value("langs"));

    for row in compose_frame(&root, 40, 16) {
        println!("{row}");
    }

    Ok(())
}
